use clap::Parser;
use std::path::PathBuf;

/// Community lending platform API.
#[derive(Parser, Debug, Clone)]
#[command(name = "lending-server", version)]
pub struct Args {
    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0", env = "LENDING_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8000, env = "LENDING_PORT")]
    pub port: u16,

    /// SQLite database file
    #[arg(long, default_value = "lending.db", env = "LENDING_DATABASE")]
    pub database: PathBuf,

    /// Minutes a login session stays valid
    #[arg(long, default_value_t = 30, env = "LENDING_SESSION_TTL_MINUTES")]
    pub session_ttl_minutes: i64,

    /// Browser origins allowed to call the API (comma separated)
    #[arg(
        long,
        env = "LENDING_ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_values = ["http://localhost:3000", "http://localhost:8080"]
    )]
    pub allowed_origins: Vec<String>,

    /// Login attempts allowed per email per minute
    #[arg(long, default_value_t = 10, env = "LENDING_LOGIN_ATTEMPTS_PER_MINUTE")]
    pub login_attempts_per_minute: usize,

    /// Skip creating demo accounts and products on an empty database
    #[arg(long)]
    pub no_seed: bool,
}

impl Args {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_local_development() {
        let args = Args::try_parse_from(["lending-server"]).expect("args");
        assert_eq!(args.port, 8000);
        assert_eq!(args.session_ttl_minutes, 30);
        assert_eq!(args.allowed_origins.len(), 2);
        assert!(!args.no_seed);
    }

    #[test]
    fn origins_split_on_commas() {
        let args = Args::try_parse_from([
            "lending-server",
            "--allowed-origins",
            "https://a.example,https://b.example",
            "--port",
            "9000",
        ])
        .expect("args");
        assert_eq!(args.allowed_origins, vec!["https://a.example", "https://b.example"]);
        assert_eq!(args.bind_addr(), "0.0.0.0:9000");
    }
}
