//! Chunked generation: validate, segment, dispatch, reassemble.

use std::str::FromStr;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use futures::future::try_join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::{GenerationError, GenerationResult};
use super::id3::strip_leading_tag_bytes;
use super::key_pool::{KeyPool, RotationCursor};
use super::requester::ChunkSynthesizer;
use super::segmenter::{Chunk, TextSegmenter};

/// Largest chunk the provider accepts in one call
pub const DEFAULT_CHUNK_CHAR_LIMIT: usize = 2800;
/// Shortest normalized text worth synthesizing
pub const DEFAULT_MIN_TEXT_CHARS: usize = 2;
/// Longest normalized text accepted in one request
pub const DEFAULT_MAX_TEXT_CHARS: usize = 200_000;
/// Upper bound on chunks per request
pub const DEFAULT_MAX_CHUNKS: usize = 100;
/// Upper bound on the speed multiplier
pub const MAX_SPEED: f32 = 4.0;

/// Content type of the reassembled stream
pub const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

static MARKUP_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

fn default_speed() -> f32 {
    1.0
}

/// A text-to-speech request.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GenerationRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default, rename = "voice", alias = "voice_id")]
    pub voice_id: String,
    #[serde(default = "default_speed")]
    pub speed: f32,
}

impl GenerationRequest {
    pub fn new(text: impl Into<String>, voice_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice_id: voice_id.into(),
            speed: default_speed(),
        }
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }
}

/// How chunk requests are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// One chunk at a time, in order
    #[default]
    Sequential,
    /// All chunks in flight at once
    Concurrent,
}

impl FromStr for DispatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(DispatchMode::Sequential),
            "concurrent" | "parallel" => Ok(DispatchMode::Concurrent),
            other => Err(format!(
                "Invalid dispatch mode '{other}'. Expected 'sequential' or 'concurrent'"
            )),
        }
    }
}

/// Limits and scheduling for [`GenerationOrchestrator`].
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub chunk_char_limit: usize,
    pub min_cut_ratio: f32,
    pub min_text_chars: usize,
    pub max_text_chars: usize,
    pub max_chunks: usize,
    pub dispatch: DispatchMode,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            chunk_char_limit: DEFAULT_CHUNK_CHAR_LIMIT,
            min_cut_ratio: 0.0,
            min_text_chars: DEFAULT_MIN_TEXT_CHARS,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            max_chunks: DEFAULT_MAX_CHUNKS,
            dispatch: DispatchMode::Sequential,
        }
    }
}

/// The reassembled audio for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedAudio {
    pub audio: Bytes,
    pub chunk_count: usize,
    /// Characters actually sent for synthesis, after normalization
    pub characters: usize,
    pub content_type: &'static str,
}

/// Strip markup tags, collapse whitespace runs and trim.
pub fn normalize_text(text: &str) -> String {
    let without_tags = MARKUP_TAG.replace_all(text, "");
    WHITESPACE_RUN
        .replace_all(&without_tags, " ")
        .trim()
        .to_string()
}

/// Drives one generation request from raw text to a single MP3 stream.
///
/// The orchestrator owns the process-wide [`RotationCursor`]; every request
/// reserves one offset per chunk so concurrent requests and concurrent chunks
/// start on different credentials without sharing a lock.
pub struct GenerationOrchestrator {
    synthesizer: Arc<dyn ChunkSynthesizer>,
    key_pool: Arc<KeyPool>,
    cursor: RotationCursor,
    segmenter: TextSegmenter,
    settings: GenerationSettings,
}

impl GenerationOrchestrator {
    pub fn new(
        synthesizer: Arc<dyn ChunkSynthesizer>,
        key_pool: Arc<KeyPool>,
        settings: GenerationSettings,
    ) -> Self {
        let segmenter =
            TextSegmenter::new(settings.chunk_char_limit).with_min_cut_ratio(settings.min_cut_ratio);

        Self {
            synthesizer,
            key_pool,
            cursor: RotationCursor::new(),
            segmenter,
            settings,
        }
    }

    /// Replace the rotation cursor, e.g. to resume from a known offset.
    pub fn with_cursor(mut self, cursor: RotationCursor) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn key_pool(&self) -> &KeyPool {
        &self.key_pool
    }

    pub fn cursor(&self) -> &RotationCursor {
        &self.cursor
    }

    /// Validate and normalize a request, then split it into chunks.
    ///
    /// Does not touch the network or the rotation cursor.
    pub fn prepare(&self, request: &GenerationRequest) -> GenerationResult<Vec<Chunk>> {
        if request.text.trim().is_empty() {
            return Err(GenerationError::Validation("Missing text".to_string()));
        }
        if request.voice_id.trim().is_empty() {
            return Err(GenerationError::Validation("Missing voice".to_string()));
        }
        if !request.speed.is_finite() || request.speed <= 0.0 || request.speed > MAX_SPEED {
            return Err(GenerationError::Validation(format!(
                "Speed must be greater than 0 and at most {MAX_SPEED}, got {}",
                request.speed
            )));
        }

        let text = normalize_text(&request.text);
        let chars = text.chars().count();
        if chars < self.settings.min_text_chars {
            return Err(GenerationError::Validation("Text too short".to_string()));
        }
        if chars > self.settings.max_text_chars {
            return Err(GenerationError::Validation(format!(
                "Text too long: {chars} characters, limit is {}",
                self.settings.max_text_chars
            )));
        }

        let chunks = self.segmenter.segment(&text);
        if chunks.len() > self.settings.max_chunks {
            return Err(GenerationError::TooManyChunks {
                count: chunks.len(),
                max: self.settings.max_chunks,
            });
        }

        Ok(chunks)
    }

    /// Turn a request into one continuous audio stream.
    ///
    /// Any chunk failure aborts the whole request; no partial audio is
    /// returned.
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationResult<GeneratedAudio> {
        let chunks = self.prepare(request)?;
        let voice_id = request.voice_id.trim();
        let base = self.cursor.reserve(chunks.len() as u64);

        info!(
            chunks = chunks.len(),
            voice = %voice_id,
            dispatch = ?self.settings.dispatch,
            "Generating audio"
        );

        let parts = match self.settings.dispatch {
            DispatchMode::Sequential => {
                let mut parts = Vec::with_capacity(chunks.len());
                for chunk in &chunks {
                    parts.push(self.run_chunk(chunk, voice_id, request.speed, base).await?);
                }
                parts
            }
            DispatchMode::Concurrent => {
                try_join_all(
                    chunks
                        .iter()
                        .map(|chunk| self.run_chunk(chunk, voice_id, request.speed, base)),
                )
                .await?
            }
        };

        let audio = concat(parts);
        info!(chunks = chunks.len(), bytes = audio.len(), "Audio generated");

        Ok(GeneratedAudio {
            audio,
            chunk_count: chunks.len(),
            characters: chunks.iter().map(|c| c.content.chars().count()).sum(),
            content_type: AUDIO_CONTENT_TYPE,
        })
    }

    async fn run_chunk(
        &self,
        chunk: &Chunk,
        voice_id: &str,
        speed: f32,
        base: u64,
    ) -> GenerationResult<Bytes> {
        let start_offset = base.wrapping_add(chunk.index as u64);

        let audio = self
            .synthesizer
            .synthesize_chunk(chunk, voice_id, speed, &self.key_pool, start_offset)
            .await
            .map_err(|source| GenerationError::Chunk {
                index: chunk.index,
                source: Box::new(source),
            })?;

        if chunk.index == 0 {
            return Ok(audio);
        }

        let stripped = strip_leading_tag_bytes(audio);
        debug!(chunk = chunk.index, bytes = stripped.len(), "Chunk tag stripped");
        Ok(stripped)
    }
}

fn concat(parts: Vec<Bytes>) -> Bytes {
    if parts.len() == 1 {
        return parts.into_iter().next().unwrap_or_default();
    }

    let total = parts.iter().map(Bytes::len).sum();
    let mut audio = BytesMut::with_capacity(total);
    for part in &parts {
        audio.extend_from_slice(part);
    }
    audio.freeze()
}
