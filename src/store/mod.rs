//! File-backed persistence for cloned voices and generation history.

pub mod error;
pub mod history;
pub mod voices;

pub use error::{StoreError, StoreResult};
pub use history::{HISTORY_FILE, HistoryEntry, HistoryLog};
pub use voices::{VOICES_FILE, VoiceRecord, VoiceRegistry};
