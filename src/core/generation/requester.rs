//! Single-chunk synthesis with retries, key rotation and endpoint failover.
//!
//! # Attempt state machine
//!
//! For attempt `n` (zero based) of a chunk seeded at `start_offset`:
//!
//! 1. pick `key_pool.next(start_offset + n)`
//! 2. call the primary endpoint
//! 3. if the primary answered with a non-2xx status or a body too small to
//!    be audio and a backup endpoint exists, repeat the call against the
//!    backup with the same key and keep its outcome; a transport failure
//!    (connect error, timeout) on the primary skips the backup
//! 4. success returns immediately, fatal failures (credential or parameter
//!    rejection) abort immediately, transient failures move on to attempt
//!    `n + 1` after the configured delay
//!
//! When every attempt fails transiently the last cause is wrapped in
//! [`GenerationError::Exhausted`].

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::error::{GenerationError, GenerationResult};
use super::key_pool::{Credential, KeyPool};
use super::payload::ProviderPayload;
use super::policy::{RetryPolicy, StatusClass};
use super::segmenter::Chunk;

/// Primary synthesis endpoint
pub const DEFAULT_PRIMARY_URL: &str = "https://api.sws.speechify.com/v1/audio/stream";
/// Backup synthesis endpoint
pub const DEFAULT_BACKUP_URL: &str = "https://api.speechify.com/v1/audio/stream";

/// Audio container requested from the provider
pub const SPEECH_AUDIO_FORMAT: &str = "mp3";
/// Sample rate requested from the provider
pub const SPEECH_SAMPLE_RATE: u32 = 44_100;

/// TCP connect timeout for provider calls
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Where synthesis requests are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub primary: String,
    pub backup: Option<String>,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            primary: DEFAULT_PRIMARY_URL.to_string(),
            backup: Some(DEFAULT_BACKUP_URL.to_string()),
        }
    }
}

/// JSON body of a synthesis call
#[derive(Debug, Serialize)]
struct SynthesisBody<'a> {
    voice_id: &'a str,
    input: &'a str,
    audio_format: &'static str,
    sample_rate: u32,
    speed: f32,
}

/// Result of one attempt against one endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Success(Bytes),
    TransientFailure(GenerationError),
    FatalFailure(GenerationError),
}

/// Produces the audio for one chunk.
///
/// `start_offset` seeds credential rotation: attempt `n` uses
/// `key_pool.next(start_offset + n)`.
#[async_trait]
pub trait ChunkSynthesizer: Send + Sync {
    async fn synthesize_chunk(
        &self,
        chunk: &Chunk,
        voice_id: &str,
        speed: f32,
        key_pool: &KeyPool,
        start_offset: u64,
    ) -> GenerationResult<Bytes>;
}

/// HTTP implementation of [`ChunkSynthesizer`] against the TTS provider.
#[derive(Debug, Clone)]
pub struct ChunkRequester {
    client: reqwest::Client,
    endpoints: ProviderEndpoints,
    policy: RetryPolicy,
}

impl ChunkRequester {
    /// Create a requester with its own pooled HTTP client.
    pub fn new(endpoints: ProviderEndpoints, policy: RetryPolicy) -> GenerationResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| {
                GenerationError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self::with_client(client, endpoints, policy))
    }

    /// Create a requester that shares an existing HTTP client.
    pub fn with_client(
        client: reqwest::Client,
        endpoints: ProviderEndpoints,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            client,
            endpoints,
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn endpoints(&self) -> &ProviderEndpoints {
        &self.endpoints
    }

    /// Synthesize one chunk, retrying transient failures with rotated keys.
    pub async fn request(
        &self,
        chunk: &Chunk,
        voice_id: &str,
        speed: f32,
        key_pool: &KeyPool,
        start_offset: u64,
    ) -> GenerationResult<Bytes> {
        let body = SynthesisBody {
            voice_id,
            input: &chunk.content,
            audio_format: SPEECH_AUDIO_FORMAT,
            sample_rate: SPEECH_SAMPLE_RATE,
            speed,
        };

        let attempts = self.policy.attempts();
        let mut last_error = None;

        for attempt in 0..attempts {
            let credential = key_pool.next(start_offset.wrapping_add(attempt as u64));

            debug!(
                chunk = chunk.index,
                attempt = attempt + 1,
                key = %credential.masked(),
                chars = chunk.content.chars().count(),
                "Requesting chunk audio"
            );

            match self.attempt(&body, credential, chunk.index, attempt + 1).await {
                AttemptOutcome::Success(audio) => {
                    info!(
                        chunk = chunk.index,
                        attempt = attempt + 1,
                        bytes = audio.len(),
                        "Chunk synthesized"
                    );
                    return Ok(audio);
                }
                AttemptOutcome::FatalFailure(err) => {
                    error!(
                        chunk = chunk.index,
                        attempt = attempt + 1,
                        key = %credential.masked(),
                        error = %err,
                        "Chunk failed with non-retryable error"
                    );
                    return Err(err);
                }
                AttemptOutcome::TransientFailure(err) => {
                    warn!(
                        chunk = chunk.index,
                        attempt = attempt + 1,
                        key = %credential.masked(),
                        error = %err,
                        "Chunk attempt failed"
                    );
                    last_error = Some(err);
                }
            }

            if attempt + 1 < attempts {
                tokio::time::sleep(self.policy.retry_delay).await;
            }
        }

        let last = last_error.unwrap_or_else(|| {
            GenerationError::Network("no attempt was made".to_string())
        });

        Err(GenerationError::Exhausted {
            attempts,
            last: Box::new(last),
        })
    }

    /// One attempt: primary endpoint, then backup if the primary answered
    /// without usable audio.
    async fn attempt(
        &self,
        body: &SynthesisBody<'_>,
        credential: &Credential,
        chunk: usize,
        attempt: u32,
    ) -> AttemptOutcome {
        let primary = self.call(&self.endpoints.primary, body, credential).await;

        let reason = match &primary {
            AttemptOutcome::Success(_) => None,
            // Transport failure: no response to fail over from
            AttemptOutcome::TransientFailure(
                e @ (GenerationError::Network(_) | GenerationError::Timeout(_)),
            ) => {
                debug!(chunk, attempt, error = %e, "Primary endpoint unreachable");
                None
            }
            AttemptOutcome::TransientFailure(e) | AttemptOutcome::FatalFailure(e) => {
                Some(e.to_string())
            }
        };

        let (Some(reason), Some(backup)) = (reason, &self.endpoints.backup) else {
            return primary;
        };

        warn!(chunk, attempt, reason = %reason, "Primary endpoint failed, trying backup");
        self.call(backup, body, credential).await
    }

    async fn call(
        &self,
        url: &str,
        body: &SynthesisBody<'_>,
        credential: &Credential,
    ) -> AttemptOutcome {
        let response = match self
            .client
            .post(url)
            .bearer_auth(credential.expose())
            .timeout(self.policy.request_timeout)
            .json(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return AttemptOutcome::TransientFailure(transport_error(&e)),
        };

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return AttemptOutcome::TransientFailure(transport_error(&e)),
        };

        let body_len = bytes.len();
        let payload = ProviderPayload::parse(content_type.as_deref(), bytes);
        classify_response(&self.policy, status, body_len, payload)
    }
}

#[async_trait]
impl ChunkSynthesizer for ChunkRequester {
    async fn synthesize_chunk(
        &self,
        chunk: &Chunk,
        voice_id: &str,
        speed: f32,
        key_pool: &KeyPool,
        start_offset: u64,
    ) -> GenerationResult<Bytes> {
        self.request(chunk, voice_id, speed, key_pool, start_offset)
            .await
    }
}

/// Map a provider status and decoded body onto an attempt outcome.
///
/// `body_len` is the size of the raw response body.
pub fn classify_response(
    policy: &RetryPolicy,
    status: u16,
    body_len: usize,
    payload: ProviderPayload,
) -> AttemptOutcome {
    match policy.classify_status(status) {
        StatusClass::Success => {
            let description = payload.describe();
            match payload.into_audio() {
                Some(audio) if policy.is_plausible_audio(audio.len()) => {
                    AttemptOutcome::Success(audio)
                }
                Some(audio) => AttemptOutcome::TransientFailure(GenerationError::EmptyAudio {
                    len: audio.len(),
                    min: policy.min_audio_bytes,
                }),
                // 2xx JSON without audio: the body is not what was asked for
                None => {
                    debug!(status, body = %description, "Success status without audio body");
                    AttemptOutcome::TransientFailure(GenerationError::EmptyAudio {
                        len: body_len,
                        min: policy.min_audio_bytes,
                    })
                }
            }
        }
        StatusClass::AuthRejected => AttemptOutcome::FatalFailure(GenerationError::Auth {
            status,
            message: payload.describe(),
        }),
        StatusClass::Rejected => AttemptOutcome::FatalFailure(GenerationError::BadRequest {
            status,
            message: payload.describe(),
        }),
        StatusClass::Retryable => AttemptOutcome::TransientFailure(GenerationError::Unavailable {
            status,
            message: payload.describe(),
        }),
    }
}

fn transport_error(err: &reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        GenerationError::Timeout(err.to_string())
    } else {
        GenerationError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const STREAM_PATH: &str = "/v1/audio/stream";

    fn audio_body(len: usize) -> Vec<u8> {
        let mut body = vec![0xFF, 0xFB, 0x90, 0x64];
        body.resize(len, 0x55);
        body
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            request_timeout: Duration::from_secs(2),
            retry_delay: Duration::from_millis(5),
            min_audio_bytes: 1000,
        }
    }

    fn requester(primary: &MockServer, backup: Option<&MockServer>) -> ChunkRequester {
        ChunkRequester::new(
            ProviderEndpoints {
                primary: format!("{}{STREAM_PATH}", primary.uri()),
                backup: backup.map(|b| format!("{}{STREAM_PATH}", b.uri())),
            },
            fast_policy(),
        )
        .unwrap()
    }

    fn chunk(text: &str) -> Chunk {
        Chunk {
            index: 0,
            content: text.to_string(),
        }
    }

    fn pool() -> KeyPool {
        KeyPool::new(["key-a", "key-b", "key-c"]).unwrap()
    }

    fn auth_headers(requests: &[wiremock::Request]) -> Vec<String> {
        requests
            .iter()
            .map(|r| {
                r.headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_retries_server_errors_until_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(STREAM_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(STREAM_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "audio/mpeg")
                    .set_body_bytes(audio_body(2048)),
            )
            .mount(&server)
            .await;

        let audio = requester(&server, None)
            .request(&chunk("Hello there."), "henry", 1.0, &pool(), 0)
            .await
            .unwrap();

        assert_eq!(audio.as_ref(), audio_body(2048).as_slice());

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 3);
        assert_eq!(
            auth_headers(&requests),
            vec!["Bearer key-a", "Bearer key-b", "Bearer key-c"]
        );
    }

    #[tokio::test]
    async fn test_auth_rejection_is_fatal_after_one_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"message":"bad key"}"#))
            .mount(&server)
            .await;

        let err = requester(&server, None)
            .request(&chunk("Hello."), "henry", 1.0, &pool(), 0)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            GenerationError::Auth {
                status: 401,
                message: "bad key".into()
            }
        );
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_bad_request_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("voice not found"))
            .mount(&server)
            .await;

        let err = requester(&server, None)
            .request(&chunk("Hello."), "nobody", 1.0, &pool(), 0)
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::BadRequest { status: 404, .. }));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_rotates_to_next_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer key-b"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(audio_body(1500)))
            .mount(&server)
            .await;

        // Seeded at offset 1, so the first attempt uses key-b
        let audio = requester(&server, None)
            .request(&chunk("Rate limited."), "henry", 1.0, &pool(), 1)
            .await
            .unwrap();
        assert_eq!(audio.len(), 1500);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(auth_headers(&requests), vec!["Bearer key-b", "Bearer key-c"]);
    }

    #[tokio::test]
    async fn test_backup_endpoint_used_when_primary_fails() {
        let primary = MockServer::start().await;
        let backup = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&primary)
            .await;
        Mock::given(method("POST"))
            .and(path(STREAM_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(audio_body(4000)))
            .mount(&backup)
            .await;

        let audio = requester(&primary, Some(&backup))
            .request(&chunk("Failover."), "henry", 1.0, &pool(), 0)
            .await
            .unwrap();

        assert_eq!(audio.len(), 4000);
        assert_eq!(primary.received_requests().await.unwrap().len(), 1);

        // Same attempt, same credential on the backup
        let backup_requests = backup.received_requests().await.unwrap();
        assert_eq!(auth_headers(&backup_requests), vec!["Bearer key-a"]);
    }

    #[tokio::test]
    async fn test_backup_not_called_when_primary_succeeds() {
        let primary = MockServer::start().await;
        let backup = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(audio_body(1200)))
            .mount(&primary)
            .await;

        requester(&primary, Some(&backup))
            .request(&chunk("Primary works."), "henry", 1.0, &pool(), 0)
            .await
            .unwrap();

        assert!(backup.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_small_bodies_exhaust_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(audio_body(64)))
            .mount(&server)
            .await;

        let err = requester(&server, None)
            .request(&chunk("Tiny."), "henry", 1.0, &pool(), 0)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            GenerationError::Exhausted {
                attempts: 3,
                last: Box::new(GenerationError::EmptyAudio { len: 64, min: 1000 }),
            }
        );
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_timeout_is_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(audio_body(2000))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let requester = ChunkRequester::new(
            ProviderEndpoints {
                primary: format!("{}{STREAM_PATH}", server.uri()),
                backup: None,
            },
            RetryPolicy {
                max_attempts: 2,
                request_timeout: Duration::from_millis(50),
                ..fast_policy()
            },
        )
        .unwrap();

        let err = requester
            .request(&chunk("Slow."), "henry", 1.0, &pool(), 0)
            .await
            .unwrap_err();

        match err {
            GenerationError::Exhausted { attempts, last } => {
                assert_eq!(attempts, 2);
                assert!(matches!(*last, GenerationError::Timeout(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let requester = ChunkRequester::new(
            ProviderEndpoints {
                primary: "http://127.0.0.1:1/v1/audio/stream".to_string(),
                backup: None,
            },
            RetryPolicy {
                max_attempts: 2,
                ..fast_policy()
            },
        )
        .unwrap();

        let err = requester
            .request(&chunk("Nobody home."), "henry", 1.0, &pool(), 0)
            .await
            .unwrap_err();

        assert!(matches!(
            err.root_cause(),
            GenerationError::Network(_) | GenerationError::Timeout(_)
        ));
    }

    #[tokio::test]
    async fn test_transport_failure_skips_backup() {
        let backup = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(audio_body(2000)))
            .mount(&backup)
            .await;

        let requester = ChunkRequester::new(
            ProviderEndpoints {
                primary: "http://127.0.0.1:1/v1/audio/stream".to_string(),
                backup: Some(format!("{}{STREAM_PATH}", backup.uri())),
            },
            RetryPolicy {
                max_attempts: 2,
                ..fast_policy()
            },
        )
        .unwrap();

        let err = requester
            .request(&chunk("Primary down."), "henry", 1.0, &pool(), 0)
            .await
            .unwrap_err();

        assert!(matches!(
            err.root_cause(),
            GenerationError::Network(_) | GenerationError::Timeout(_)
        ));
        assert!(backup.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_auth_rejection_with_backup_is_fatal_after_one_attempt() {
        let primary = MockServer::start().await;
        let backup = MockServer::start().await;
        for server in [&primary, &backup] {
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
                .mount(server)
                .await;
        }

        let err = requester(&primary, Some(&backup))
            .request(&chunk("Hello."), "henry", 1.0, &pool(), 0)
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::Auth { status: 401, .. }));
        // One attempt: the primary and then its backup, both with the first key
        let primary_requests = primary.received_requests().await.unwrap();
        let backup_requests = backup.received_requests().await.unwrap();
        assert_eq!(auth_headers(&primary_requests), vec!["Bearer key-a"]);
        assert_eq!(auth_headers(&backup_requests), vec!["Bearer key-a"]);
    }

    #[tokio::test]
    async fn test_backup_can_serve_after_primary_auth_rejection() {
        let primary = MockServer::start().await;
        let backup = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&primary)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(audio_body(1500)))
            .mount(&backup)
            .await;

        let audio = requester(&primary, Some(&backup))
            .request(&chunk("Backup key scope."), "henry", 1.0, &pool(), 0)
            .await
            .unwrap();
        assert_eq!(audio.len(), 1500);
    }

    #[tokio::test]
    async fn test_unrecognized_success_body_is_accepted_by_size() {
        let server = MockServer::start().await;
        let body = "x".repeat(2000);
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/plain")
                    .set_body_string(body.clone()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let audio = requester(&server, None)
            .request(&chunk("Plain body."), "henry", 1.0, &pool(), 0)
            .await
            .unwrap();
        assert_eq!(audio.as_ref(), body.as_bytes());
    }

    #[tokio::test]
    async fn test_json_success_without_audio_reports_body_size() {
        let server = MockServer::start().await;
        let body = serde_json::json!({ "status": "queued", "padding": "p".repeat(1500) });
        let body_len = body.to_string().len();
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let err = requester(&server, None)
            .request(&chunk("Queued."), "henry", 1.0, &pool(), 0)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            GenerationError::Exhausted {
                attempts: 3,
                last: Box::new(GenerationError::EmptyAudio {
                    len: body_len,
                    min: 1000
                }),
            }
        );
    }

    #[tokio::test]
    async fn test_request_body_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(STREAM_PATH))
            .and(header("authorization", "Bearer key-a"))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(serde_json::json!({
                "voice_id": "nicole",
                "input": "Exact chunk text.",
                "audio_format": "mp3",
                "sample_rate": 44100,
                "speed": 1.25
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(audio_body(1000)))
            .expect(1)
            .mount(&server)
            .await;

        requester(&server, None)
            .request(&chunk("Exact chunk text."), "nicole", 1.25, &pool(), 0)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_base64_json_audio_is_accepted() {
        use base64::Engine;

        let server = MockServer::start().await;
        let encoded = base64::engine::general_purpose::STANDARD.encode(audio_body(1800));
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "audio_data": encoded })),
            )
            .mount(&server)
            .await;

        let audio = requester(&server, None)
            .request(&chunk("Encoded."), "henry", 1.0, &pool(), 0)
            .await
            .unwrap();
        assert_eq!(audio.len(), 1800);
    }

    #[test]
    fn test_classify_response() {
        let policy = fast_policy();
        let audio = Bytes::from(audio_body(1000));

        assert_eq!(
            classify_response(&policy, 200, 1000, ProviderPayload::Audio(audio.clone())),
            AttemptOutcome::Success(audio)
        );
        assert!(matches!(
            classify_response(&policy, 200, 2, ProviderPayload::Opaque(Bytes::from("ok"))),
            AttemptOutcome::TransientFailure(GenerationError::EmptyAudio { len: 2, .. })
        ));
        assert!(matches!(
            classify_response(&policy, 200, 2048, ProviderPayload::Json("queued".into())),
            AttemptOutcome::TransientFailure(GenerationError::EmptyAudio { len: 2048, .. })
        ));
        assert!(matches!(
            classify_response(&policy, 403, 4, ProviderPayload::Opaque(Bytes::from("nope"))),
            AttemptOutcome::FatalFailure(GenerationError::Auth { status: 403, .. })
        ));
        assert!(matches!(
            classify_response(&policy, 422, 16, ProviderPayload::Json("speed".into())),
            AttemptOutcome::FatalFailure(GenerationError::BadRequest { status: 422, .. })
        ));
        assert!(matches!(
            classify_response(&policy, 429, 0, ProviderPayload::Opaque(Bytes::new())),
            AttemptOutcome::TransientFailure(GenerationError::Unavailable { status: 429, .. })
        ));
        assert!(matches!(
            classify_response(&policy, 502, 0, ProviderPayload::Opaque(Bytes::new())),
            AttemptOutcome::TransientFailure(GenerationError::Unavailable { status: 502, .. })
        ));
    }
}
