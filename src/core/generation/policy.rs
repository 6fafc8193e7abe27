//! Retry limits and response status classification for chunk requests.

use std::time::Duration;

/// Default number of attempts per chunk
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default per-call timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
/// Default pause between attempts
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(100);
/// Smallest response body accepted as real audio
pub const DEFAULT_MIN_AUDIO_BYTES: usize = 1000;

/// How a single provider response status should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 2xx
    Success,
    /// 401/403: credential rejected, abort
    AuthRejected,
    /// 4xx other than 429: parameters rejected, abort
    Rejected,
    /// 429 and 5xx: try again with the next credential
    Retryable,
}

/// Retry and failover policy shared by every chunk request.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Attempts per chunk, including the first one
    pub max_attempts: u32,
    /// Timeout applied to each individual provider call
    pub request_timeout: Duration,
    /// Fixed pause between attempts
    pub retry_delay: Duration,
    /// Bodies smaller than this are treated as an empty-audio anomaly
    pub min_audio_bytes: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retry_delay: DEFAULT_RETRY_DELAY,
            min_audio_bytes: DEFAULT_MIN_AUDIO_BYTES,
        }
    }
}

impl RetryPolicy {
    /// Classify a provider status code.
    ///
    /// Anything outside 2xx/4xx/5xx (1xx, 3xx left after redirects) is treated
    /// as retryable.
    pub fn classify_status(&self, status: u16) -> StatusClass {
        match status {
            200..=299 => StatusClass::Success,
            401 | 403 => StatusClass::AuthRejected,
            429 => StatusClass::Retryable,
            400..=499 => StatusClass::Rejected,
            _ => StatusClass::Retryable,
        }
    }

    /// Whether a successful body is large enough to be real audio.
    pub fn is_plausible_audio(&self, len: usize) -> bool {
        len >= self.min_audio_bytes
    }

    /// Attempts actually made; at least one even when misconfigured with zero.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}
