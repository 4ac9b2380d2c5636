use crate::error::ApiFailure;
use crate::extract::{ApiJson, ApiQuery};
use crate::rate_limit::LoginLimiter;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use lending_contracts::{
    validate_application, validate_login, validate_product_draft, validate_register,
    validate_status_update, ApplicationQuery, ApplicationStatusUpdate, BorrowerProfile,
    LoanApplication, LoanMetrics, LoanProduct, LoanProductDraft, LoanSummary, LoginRequest,
    LoginResponse, NewApplicationRequest, RegisterRequest, ToggleStatusRequest, User, UserRole,
};
use lending_core::auth::{hash_password, Authenticator};
use lending_core::metrics;
use lending_core::store::{ApplicationFilter, NewApplication, NewUser, Store, StoreError};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub auth: Authenticator,
    pub limiter: Arc<LoginLimiter>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/me", get(me))
        .route("/auth/logout", post(logout))
        .route("/api/loan-products", get(list_products).post(create_product))
        .route(
            "/api/loan-products/:id",
            put(update_product).delete(delete_product),
        )
        .route("/api/loan-products/:id/status", patch(toggle_product_status))
        .route("/api/loan-metrics", get(loan_metrics))
        .route("/api/borrowers/:id", get(borrower_profile))
        .route("/api/borrowers/:id/loans", get(borrower_loans))
        .route("/api/me/profile", get(my_profile))
        .route(
            "/api/applications",
            get(list_applications).post(create_application),
        )
        .route("/api/applications/:id", get(get_application))
        .route(
            "/api/applications/:id/status",
            patch(update_application_status),
        )
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Lending API - Community Lending Platform" }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiFailure> {
    validate_login(&request)?;
    if !state.limiter.check(&request.email) {
        tracing::warn!(email = %request.email, "login rate limit hit");
        return Err(ApiFailure::TooManyRequests);
    }

    let auth = state.auth.clone();
    let response = blocking(move || Ok(auth.login(&request.email, &request.password)?)).await?;
    Ok(Json(response))
}

/// Anyone may sign up as a borrower. Staff accounts need an admin token.
async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), ApiFailure> {
    validate_register(&request)?;
    if request.role != UserRole::Borrower {
        require_role(&state, &headers, &[UserRole::Admin]).await?;
    }

    let store = state.store.clone();
    let user = blocking(move || {
        let new_user = NewUser {
            email: request.email.trim().to_string(),
            password_hash: hash_password(&request.password)?,
            role: request.role,
            name: request.name.trim().to_string(),
            organization: request
                .organization
                .map(|org| org.trim().to_string())
                .filter(|org| !org.is_empty()),
            is_active: true,
        };
        store.register_user(&new_user).map_err(|err| match err {
            StoreError::DuplicateEmail(email) => ApiFailure::BadRequest(format!(
                "Registration failed: email '{email}' is already registered"
            )),
            other => ApiFailure::Store(other),
        })
    })
    .await?;
    tracing::info!(user_id = %user.id, role = user.role.as_str(), "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

async fn me(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<User>, ApiFailure> {
    Ok(Json(require_user(&state, &headers).await?))
}

async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiFailure> {
    if let Some(token) = bearer_token(&headers) {
        let auth = state.auth.clone();
        blocking(move || Ok(auth.logout(&token)?)).await?;
    }
    Ok(Json(serde_json::json!({ "message": "Successfully logged out" })))
}

async fn list_products(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<LoanProduct>>, ApiFailure> {
    require_user(&state, &headers).await?;
    let store = state.store.clone();
    Ok(Json(blocking(move || Ok(store.list_products()?)).await?))
}

async fn create_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(draft): ApiJson<LoanProductDraft>,
) -> Result<(StatusCode, Json<LoanProduct>), ApiFailure> {
    let user = require_role(&state, &headers, &[UserRole::Admin]).await?;
    validate_product_draft(&draft)?;

    let store = state.store.clone();
    let product = blocking(move || Ok(store.insert_product(&draft)?)).await?;
    tracing::info!(product_id = %product.id, user_id = %user.id, "loan product created");
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    ApiJson(draft): ApiJson<LoanProductDraft>,
) -> Result<Json<LoanProduct>, ApiFailure> {
    let user = require_role(&state, &headers, &[UserRole::Admin]).await?;
    validate_product_draft(&draft)?;

    let store = state.store.clone();
    let product = blocking(move || {
        store
            .update_product(&id, &draft)?
            .ok_or(ApiFailure::NotFound("Loan product"))
    })
    .await?;
    tracing::info!(product_id = %product.id, user_id = %user.id, "loan product updated");
    Ok(Json(product))
}

async fn delete_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiFailure> {
    let user = require_role(&state, &headers, &[UserRole::Admin]).await?;
    let store = state.store.clone();
    let product_id = id.clone();
    let removed = blocking(move || Ok(store.delete_product(&product_id)?)).await?;
    if !removed {
        return Err(ApiFailure::NotFound("Loan product"));
    }
    tracing::info!(product_id = %id, user_id = %user.id, "loan product deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_product_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<ToggleStatusRequest>,
) -> Result<Json<LoanProduct>, ApiFailure> {
    require_role(&state, &headers, &[UserRole::Admin]).await?;
    let store = state.store.clone();
    let product = blocking(move || {
        store
            .set_product_active(&id, request.is_active)?
            .ok_or(ApiFailure::NotFound("Loan product"))
    })
    .await?;
    Ok(Json(product))
}

async fn loan_metrics(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<LoanMetrics>, ApiFailure> {
    require_role(&state, &headers, &[UserRole::Admin, UserRole::Analyst]).await?;
    let store = state.store.clone();
    let loans = blocking(move || Ok(store.all_loans()?)).await?;
    let today = chrono::Utc::now().date_naive();
    Ok(Json(metrics::summarize(&loans, today)))
}

async fn borrower_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<BorrowerProfile>, ApiFailure> {
    let user = require_user(&state, &headers).await?;
    let store = state.store.clone();
    let profile = blocking(move || {
        authorize_borrower(&store, &user, &id)?;
        store
            .borrower_profile(&id)?
            .ok_or(ApiFailure::NotFound("Borrower"))
    })
    .await?;
    Ok(Json(profile))
}

async fn borrower_loans(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Vec<LoanSummary>>, ApiFailure> {
    let user = require_user(&state, &headers).await?;
    let store = state.store.clone();
    let loans = blocking(move || {
        authorize_borrower(&store, &user, &id)?;
        Ok(store.loans_for_borrower(&id)?)
    })
    .await?;
    Ok(Json(loans))
}

async fn my_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<BorrowerProfile>, ApiFailure> {
    let user = require_role(&state, &headers, &[UserRole::Borrower]).await?;
    let store = state.store.clone();
    let profile = blocking(move || {
        let borrower_id = store
            .borrower_id_for_user(&user.id)?
            .ok_or(ApiFailure::NotFound("Borrower profile"))?;
        store
            .borrower_profile(&borrower_id)?
            .ok_or(ApiFailure::NotFound("Borrower profile"))
    })
    .await?;
    Ok(Json(profile))
}

/// Staff see the whole queue; a borrower sees only their own applications.
async fn list_applications(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiQuery(query): ApiQuery<ApplicationQuery>,
) -> Result<Json<Vec<LoanApplication>>, ApiFailure> {
    let user = require_user(&state, &headers).await?;
    let store = state.store.clone();
    let applications = blocking(move || {
        let mut filter = ApplicationFilter {
            status: query.status,
            priority: query.priority,
            borrower_id: None,
        };
        if user.role == UserRole::Borrower {
            let Some(borrower_id) = store.borrower_id_for_user(&user.id)? else {
                return Ok(Vec::new());
            };
            filter.borrower_id = Some(borrower_id);
        }
        Ok(store.list_applications(&filter)?)
    })
    .await?;
    Ok(Json(applications))
}

async fn create_application(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<NewApplicationRequest>,
) -> Result<(StatusCode, Json<LoanApplication>), ApiFailure> {
    let user = require_role(&state, &headers, &[UserRole::Borrower]).await?;
    validate_application(&request)?;

    let store = state.store.clone();
    let application = blocking(move || {
        let borrower_id = store
            .borrower_id_for_user(&user.id)?
            .ok_or(ApiFailure::NotFound("Borrower profile"))?;
        Ok(store.insert_application(&NewApplication::submitted(borrower_id, request))?)
    })
    .await?;
    tracing::info!(
        application_id = %application.id,
        borrower_id = %application.borrower_id,
        amount = application.loan_amount,
        "loan application submitted"
    );
    Ok((StatusCode::CREATED, Json(application)))
}

async fn get_application(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<LoanApplication>, ApiFailure> {
    let user = require_user(&state, &headers).await?;
    let store = state.store.clone();
    let application = blocking(move || {
        let application = store
            .application(&id)?
            .ok_or(ApiFailure::NotFound("Loan application"))?;
        authorize_borrower(&store, &user, &application.borrower_id)?;
        Ok(application)
    })
    .await?;
    Ok(Json(application))
}

async fn update_application_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<ApplicationStatusUpdate>,
) -> Result<Json<LoanApplication>, ApiFailure> {
    let user = require_role(&state, &headers, &[UserRole::Admin, UserRole::Analyst]).await?;
    validate_status_update(&update)?;

    let store = state.store.clone();
    let application = blocking(move || {
        store
            .update_application_status(&id, &update)?
            .ok_or(ApiFailure::NotFound("Loan application"))
    })
    .await?;
    tracing::info!(
        application_id = %application.id,
        status = application.status.as_str(),
        user_id = %user.id,
        "loan application status changed"
    );
    Ok(Json(application))
}

/// Staff see every borrower; a borrower only sees the record linked to them.
fn authorize_borrower(store: &Store, user: &User, borrower_id: &str) -> Result<(), ApiFailure> {
    let owner = store
        .borrower_owner(borrower_id)?
        .ok_or(ApiFailure::NotFound("Borrower"))?;
    match user.role {
        UserRole::Admin | UserRole::Analyst => Ok(()),
        UserRole::Borrower if owner.as_deref() == Some(user.id.as_str()) => Ok(()),
        UserRole::Borrower => Err(ApiFailure::Forbidden),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
        return None;
    }
    Some(token.trim().to_string())
}

async fn require_user(state: &AppState, headers: &HeaderMap) -> Result<User, ApiFailure> {
    let token = bearer_token(headers).ok_or(ApiFailure::Unauthorized("Not authenticated"))?;
    let auth = state.auth.clone();
    blocking(move || Ok(auth.authenticate(&token)?)).await
}

async fn require_role(
    state: &AppState,
    headers: &HeaderMap,
    allowed: &[UserRole],
) -> Result<User, ApiFailure> {
    let user = require_user(state, headers).await?;
    if !allowed.contains(&user.role) {
        tracing::warn!(user_id = %user.id, role = user.role.as_str(), "role not permitted");
        return Err(ApiFailure::Forbidden);
    }
    Ok(user)
}

async fn blocking<T, F>(work: F) -> Result<T, ApiFailure>
where
    F: FnOnce() -> Result<T, ApiFailure> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| ApiFailure::Internal(format!("worker task failed: {err}")))?
}
