use axum::http::StatusCode;

/// Error codes for structured error responses
pub mod error_codes {
    pub const INVALID_REQUEST: &str = "invalid_request";
    pub const INVALID_AUDIO: &str = "invalid_audio";
    pub const UNSUPPORTED_AUDIO_FORMAT: &str = "unsupported_audio_format";
    pub const CONFIGURATION_ERROR: &str = "configuration_error";
    pub const PROVIDER_ERROR: &str = "provider_error";
    pub const NETWORK_ERROR: &str = "network_error";
    pub const INVALID_PROVIDER_RESPONSE: &str = "invalid_provider_response";
}

/// Voice cloning errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CloneError {
    #[error("Invalid clone request: {0}")]
    InvalidRequest(String),

    #[error("Invalid audio sample: {0}")]
    InvalidAudio(String),

    #[error("Unsupported audio format; expected mp3, wav, m4a, ogg or flac")]
    UnsupportedFormat,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Result type for voice cloning
pub type CloneResult<T> = Result<T, CloneError>;

impl CloneError {
    /// Get the error code for structured error responses
    pub fn error_code(&self) -> &'static str {
        match self {
            CloneError::InvalidRequest(_) => error_codes::INVALID_REQUEST,
            CloneError::InvalidAudio(_) => error_codes::INVALID_AUDIO,
            CloneError::UnsupportedFormat => error_codes::UNSUPPORTED_AUDIO_FORMAT,
            CloneError::Configuration(_) => error_codes::CONFIGURATION_ERROR,
            CloneError::Provider { .. } => error_codes::PROVIDER_ERROR,
            CloneError::Network(_) => error_codes::NETWORK_ERROR,
            CloneError::InvalidResponse(_) => error_codes::INVALID_PROVIDER_RESPONSE,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            CloneError::InvalidRequest(_)
            | CloneError::InvalidAudio(_)
            | CloneError::UnsupportedFormat => StatusCode::BAD_REQUEST,
            CloneError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CloneError::Provider { status, .. } => match *status {
                401 | 403 => StatusCode::INTERNAL_SERVER_ERROR,
                400..=499 => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::BAD_GATEWAY,
            },
            CloneError::Network(_) | CloneError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
        }
    }
}
