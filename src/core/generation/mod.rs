//! Chunked text-to-speech generation.
//!
//! Text is normalized and split by [`TextSegmenter`], each chunk is
//! synthesized by a [`ChunkSynthesizer`] (the HTTP [`ChunkRequester`] in
//! production) using credentials picked from a [`KeyPool`], and the per-chunk
//! MP3 streams are joined by [`GenerationOrchestrator`] after their leading
//! ID3 tags are removed.

pub mod error;
pub mod id3;
pub mod key_pool;
pub mod orchestrator;
pub mod payload;
pub mod policy;
pub mod requester;
pub mod segmenter;

pub use error::{GenerationError, GenerationResult, error_codes};
pub use id3::{leading_tag_len, strip_leading_tag, strip_leading_tag_bytes};
pub use key_pool::{Credential, KeyPool, RotationCursor};
pub use orchestrator::{
    AUDIO_CONTENT_TYPE, DispatchMode, GeneratedAudio, GenerationOrchestrator, GenerationRequest,
    GenerationSettings, normalize_text,
};
pub use payload::ProviderPayload;
pub use policy::{RetryPolicy, StatusClass};
pub use requester::{
    AttemptOutcome, ChunkRequester, ChunkSynthesizer, DEFAULT_BACKUP_URL, DEFAULT_PRIMARY_URL,
    ProviderEndpoints,
};
pub use segmenter::{Chunk, TextSegmenter, segment};
