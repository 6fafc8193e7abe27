use axum::http::StatusCode;

/// Error codes for structured error responses
pub mod error_codes {
    pub const VALIDATION_ERROR: &str = "validation_error";
    pub const CONFIGURATION_ERROR: &str = "configuration_error";
    pub const PROVIDER_AUTH_FAILED: &str = "provider_auth_failed";
    pub const PROVIDER_REJECTED_REQUEST: &str = "provider_rejected_request";
    pub const PROVIDER_UNAVAILABLE: &str = "provider_unavailable";
    pub const PROVIDER_TIMEOUT: &str = "provider_timeout";
    pub const NETWORK_ERROR: &str = "network_error";
    pub const EMPTY_AUDIO: &str = "empty_audio";
    pub const ATTEMPTS_EXHAUSTED: &str = "attempts_exhausted";
    pub const TOO_MANY_CHUNKS: &str = "too_many_chunks";
}

/// Errors produced while turning text into audio.
///
/// Variants split into two families: fatal ones (`Validation`, `Configuration`,
/// `Auth`, `BadRequest`, `TooManyChunks`) abort the request immediately, while
/// retryable ones (`Unavailable`, `Timeout`, `Network`, `EmptyAudio`) are
/// absorbed by the chunk requester until its attempt budget runs out.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Provider rejected credential ({status}): {message}")]
    Auth { status: u16, message: String },

    #[error("Provider rejected request ({status}): {message}")]
    BadRequest { status: u16, message: String },

    #[error("Provider unavailable ({status}): {message}")]
    Unavailable { status: u16, message: String },

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider returned {len} bytes, expected at least {min} bytes of audio")]
    EmptyAudio { len: usize, min: usize },

    #[error("Gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        last: Box<GenerationError>,
    },

    #[error("Text produced {count} chunks, limit is {max}")]
    TooManyChunks { count: usize, max: usize },

    #[error("Chunk {} failed: {source}", .index + 1)]
    Chunk {
        index: usize,
        source: Box<GenerationError>,
    },
}

/// Result type for generation operations
pub type GenerationResult<T> = Result<T, GenerationError>;

impl GenerationError {
    /// Whether another attempt with a different credential may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenerationError::Unavailable { .. }
                | GenerationError::Timeout(_)
                | GenerationError::Network(_)
                | GenerationError::EmptyAudio { .. }
        )
    }

    /// Index of the chunk that failed, if the error was raised during dispatch.
    pub fn chunk_index(&self) -> Option<usize> {
        match self {
            GenerationError::Chunk { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// The innermost cause, unwrapping chunk and exhaustion wrappers.
    pub fn root_cause(&self) -> &GenerationError {
        match self {
            GenerationError::Chunk { source, .. } => source.root_cause(),
            GenerationError::Exhausted { last, .. } => last.root_cause(),
            other => other,
        }
    }

    /// Get the error code for structured error responses
    pub fn error_code(&self) -> &'static str {
        match self {
            GenerationError::Validation(_) => error_codes::VALIDATION_ERROR,
            GenerationError::Configuration(_) => error_codes::CONFIGURATION_ERROR,
            GenerationError::Auth { .. } => error_codes::PROVIDER_AUTH_FAILED,
            GenerationError::BadRequest { .. } => error_codes::PROVIDER_REJECTED_REQUEST,
            GenerationError::Unavailable { .. } => error_codes::PROVIDER_UNAVAILABLE,
            GenerationError::Timeout(_) => error_codes::PROVIDER_TIMEOUT,
            GenerationError::Network(_) => error_codes::NETWORK_ERROR,
            GenerationError::EmptyAudio { .. } => error_codes::EMPTY_AUDIO,
            GenerationError::Exhausted { .. } => error_codes::ATTEMPTS_EXHAUSTED,
            GenerationError::TooManyChunks { .. } => error_codes::TOO_MANY_CHUNKS,
            GenerationError::Chunk { source, .. } => source.error_code(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// Credential rejections surface as 500: the caller cannot fix them, the
    /// operator has to rotate the key pool.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GenerationError::Validation(_) | GenerationError::TooManyChunks { .. } => {
                StatusCode::BAD_REQUEST
            }
            GenerationError::Configuration(_) | GenerationError::Auth { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            GenerationError::BadRequest { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            GenerationError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            GenerationError::Unavailable { .. }
            | GenerationError::Network(_)
            | GenerationError::EmptyAudio { .. }
            | GenerationError::Exhausted { .. } => StatusCode::BAD_GATEWAY,
            GenerationError::Chunk { source, .. } => source.status_code(),
        }
    }
}
