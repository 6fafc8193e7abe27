//! HTTP request handlers
//!
//! - `api` - Health check endpoint
//! - `generate` - Chunked text-to-speech generation
//! - `history` - Recent generation history
//! - `voices` - Voice catalog and voice cloning

pub mod api;
pub mod generate;
pub mod history;
pub mod voices;
