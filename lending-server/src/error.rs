use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use lending_contracts::{ApiError, ContractError};
use lending_core::auth::AuthError;
use lending_core::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiFailure {
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("Not enough permissions")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Validation(#[from] ContractError),
    /// The request body or query string could not be read into the expected shape.
    #[error("{detail}")]
    Unreadable { status: StatusCode, detail: String },
    #[error("Too many login attempts, try again in a minute")]
    TooManyRequests,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Internal(String),
}

impl From<AuthError> for ApiFailure {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized("Incorrect email or password"),
            AuthError::InvalidToken => Self::Unauthorized("Could not validate credentials"),
            AuthError::Inactive => Self::BadRequest("Inactive user".into()),
            AuthError::Hash(detail) => {
                Self::Internal(format!("password hashing failed: {detail}"))
            }
            AuthError::Store(err) => Self::Store(err),
        }
    }
}

// Syntax errors stay 400 and type or missing-field errors stay 422, as axum
// classifies them, but the body is an `ApiError` like every other failure.
impl From<JsonRejection> for ApiFailure {
    fn from(rejection: JsonRejection) -> Self {
        Self::Unreadable {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiFailure {
    fn from(rejection: QueryRejection) -> Self {
        Self::Unreadable {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl ApiFailure {
    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unreadable { status, .. } => *status,
            Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::Validation(_) => "validation_failed",
            Self::Unreadable { status, .. } => match *status {
                StatusCode::UNPROCESSABLE_ENTITY => "validation_failed",
                StatusCode::UNSUPPORTED_MEDIA_TYPE => "unsupported_media_type",
                _ => "bad_request",
            },
            Self::TooManyRequests => "rate_limited",
            Self::Store(_) | Self::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let mut response = (status, Json(ApiError::with_code(detail, self.code()))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
