use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Error codes for structured error responses
pub mod error_codes {
    pub const MISSING_AUTH_HEADER: &str = "missing_auth_header";
    pub const INVALID_AUTH_HEADER: &str = "invalid_auth_header";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const CONFIG_ERROR: &str = "config_error";
}

/// Authentication error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Neither an Authorization header nor a `token` query parameter was sent
    #[error("Missing Authorization header")]
    MissingAuthHeader,

    /// Authorization header format is invalid (not "Bearer {token}")
    #[error("Invalid Authorization header format")]
    InvalidAuthHeader,

    /// Token did not match any configured API secret
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Auth is required but nothing is configured to check against
    #[error("Auth configuration error: {0}")]
    ConfigError(String),
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Get the error code for structured error responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => error_codes::MISSING_AUTH_HEADER,
            AuthError::InvalidAuthHeader => error_codes::INVALID_AUTH_HEADER,
            AuthError::Unauthorized(_) => error_codes::UNAUTHORIZED,
            AuthError::ConfigError(_) => error_codes::CONFIG_ERROR,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AuthError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log the error at the appropriate level
    pub fn log(&self) {
        match self {
            AuthError::MissingAuthHeader | AuthError::InvalidAuthHeader => {
                tracing::debug!("{}", self);
            }
            AuthError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized: {}", msg);
            }
            AuthError::ConfigError(msg) => {
                tracing::error!("Auth configuration error: {}", msg);
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status_code();

        // {"error": "error_code", "message": "human readable message"}
        let body = Json(json!({
            "error": self.error_code(),
            "message": self.to_string()
        }));

        (status, body).into_response()
    }
}
