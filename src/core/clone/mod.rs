//! Voice cloning: register a new provider voice from an audio sample.

pub mod cloner;
pub mod error;
pub mod format;

pub use cloner::{ClonedVoice, DEFAULT_CLONE_URL, VoiceCloneRequest, VoiceCloner, decode_sample};
pub use error::{CloneError, CloneResult};
pub use format::{AudioFormat, detect_audio_format};
