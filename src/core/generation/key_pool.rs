//! Provider credential pool and rotation cursor.
//!
//! Credential selection is a pure function of an offset: `next(offset)` always
//! returns `keys[offset % len]`. The only mutable rotation state lives in
//! [`RotationCursor`], which hands out disjoint offset ranges so concurrent
//! chunk requests never need a lock to pick a key.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::error::{GenerationError, GenerationResult};

/// Separators accepted between keys in a raw key source
const KEY_SEPARATORS: [char; 4] = ['\n', '\r', ',', ';'];

/// Number of leading characters shown when a credential is logged
const MASK_PREFIX_LEN: usize = 5;

/// An opaque provider API token.
///
/// The secret is zeroized on drop and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for building request headers only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// A log-safe rendering showing only the first few characters.
    pub fn masked(&self) -> String {
        let prefix: String = self.0.chars().take(MASK_PREFIX_LEN).collect();
        format!("{prefix}...")
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({})", self.masked())
    }
}

/// Fixed-order, deduplicated set of provider credentials.
#[derive(Clone)]
pub struct KeyPool {
    keys: Vec<Credential>,
}

impl KeyPool {
    /// Build a pool from explicit tokens.
    ///
    /// Tokens are trimmed; empty ones and ones with embedded whitespace are
    /// dropped; duplicates keep their first position.
    pub fn new<I, S>(tokens: I) -> GenerationResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut keys = Vec::new();
        let mut rejected = 0usize;

        for token in tokens {
            let token = token.as_ref().trim();
            if token.is_empty() {
                continue;
            }
            if token.chars().any(char::is_whitespace) {
                rejected += 1;
                continue;
            }
            if seen.insert(token.to_string()) {
                keys.push(Credential::new(token));
            }
        }

        if keys.is_empty() {
            return Err(GenerationError::Configuration(if rejected > 0 {
                format!("no usable API keys: {rejected} malformed entries")
            } else {
                "no API keys configured".to_string()
            }));
        }

        if rejected > 0 {
            tracing::warn!(rejected, "Ignored malformed API key entries");
        }

        Ok(Self { keys })
    }

    /// Build a pool from a delimited string (newline, comma or semicolon
    /// separated), as read from the environment or a config file.
    pub fn from_source(raw: &str) -> GenerationResult<Self> {
        Self::new(raw.split(KEY_SEPARATORS))
    }

    /// Credential for the given rotation offset.
    pub fn next(&self, offset: u64) -> &Credential {
        let idx = (offset % self.keys.len() as u64) as usize;
        &self.keys[idx]
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl fmt::Debug for KeyPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPool")
            .field("keys", &self.keys.len())
            .finish()
    }
}

/// Process-wide, monotonically increasing credential offset.
///
/// Each generation request reserves one offset per chunk up front; chunk `i`
/// then starts its attempts at `base + i`.
#[derive(Debug, Default)]
pub struct RotationCursor {
    next: AtomicU64,
}

impl RotationCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the cursor at a specific offset.
    pub fn starting_at(offset: u64) -> Self {
        Self {
            next: AtomicU64::new(offset),
        }
    }

    /// Reserve `count` consecutive offsets and return the first.
    pub fn reserve(&self, count: u64) -> u64 {
        self.next.fetch_add(count, Ordering::Relaxed)
    }

    /// The offset the next reservation will start at.
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}
