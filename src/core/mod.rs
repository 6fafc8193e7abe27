pub mod clone;
pub mod generation;

// Re-export commonly used types for convenience
pub use clone::{CloneError, CloneResult, ClonedVoice, VoiceCloneRequest, VoiceCloner};

pub use generation::{
    Chunk, ChunkRequester, ChunkSynthesizer, Credential, DispatchMode, GeneratedAudio,
    GenerationError, GenerationOrchestrator, GenerationRequest, GenerationResult,
    GenerationSettings, KeyPool, ProviderEndpoints, RetryPolicy, RotationCursor, TextSegmenter,
};
