mod config;
mod error;
mod extract;
mod rate_limit;
mod routes;

use axum::http::{header, HeaderValue, Method};
use clap::Parser;
use config::Args;
use lending_core::auth::Authenticator;
use lending_core::seed::SeedError;
use lending_core::store::{Store, StoreError};
use rate_limit::LoginLimiter;
use routes::AppState;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(600);

#[derive(Debug, thiserror::Error)]
enum ServerError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to seed demo data: {0}")]
    Seed(#[from] SeedError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(std::io::Error),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = run(args).await {
        tracing::error!(%err, "lending-server stopped");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), ServerError> {
    let store = Store::open(&args.database)?;
    if !args.no_seed {
        lending_core::seed::seed_demo_data(&store)?;
    }

    let state = AppState {
        auth: Authenticator::new(
            store.clone(),
            chrono::Duration::minutes(args.session_ttl_minutes),
        ),
        store: store.clone(),
        limiter: Arc::new(LoginLimiter::per_minute(args.login_attempts_per_minute)),
    };
    spawn_session_sweeper(store);

    let app = routes::router(state).layer(cors_layer(&args.allowed_origins));

    let addr = args.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

    tracing::info!(%addr, database = %args.database.display(), "lending-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

fn spawn_session_sweeper(store: Store) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let store = store.clone();
            let swept = tokio::task::spawn_blocking(move || {
                store.purge_expired_sessions(chrono::Utc::now())
            })
            .await;
            match swept {
                Ok(Ok(0)) => {}
                Ok(Ok(count)) => tracing::debug!(count, "purged expired sessions"),
                Ok(Err(err)) => tracing::warn!(%err, "session sweep failed"),
                Err(err) => tracing::warn!(%err, "session sweep task panicked"),
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(%err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
