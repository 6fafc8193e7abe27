use axum::{
    Extension,
    extract::{State, rejection::JsonRejection},
    http::{HeaderName, StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::Auth;
use crate::core::generation::GenerationRequest;
use crate::errors::app_error::{AppError, AppResult};
use crate::state::AppState;
use crate::store::HistoryEntry;

/// Response header carrying the number of chunks that were synthesized
pub const CHUNK_COUNT_HEADER: HeaderName = HeaderName::from_static("x-chunk-count");

/// Handler for POST /generate
///
/// Accepts `{ "text": "...", "voice": "...", "speed": 1.0 }` and answers with
/// the complete MP3 stream. Failures are JSON `{ error, code, chunk? }`.
pub async fn generate_audio(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<Auth>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let generated = state.orchestrator.generate(&request).await?;

    let entry = HistoryEntry::new(
        auth.id.clone(),
        request.voice_id.trim(),
        generated.characters,
        generated.chunk_count,
        generated.audio.len(),
    );
    // History is best effort; the audio is already paid for
    if let Err(e) = state.history.append(&entry).await {
        warn!("Failed to record generation history: {}", e);
    }

    info!(
        voice = %entry.voice_id,
        chunks = generated.chunk_count,
        bytes = generated.audio.len(),
        "Generation request completed"
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, generated.content_type.to_string()),
            (header::CONTENT_LENGTH, generated.audio.len().to_string()),
            (CHUNK_COUNT_HEADER, generated.chunk_count.to_string()),
        ],
        generated.audio,
    )
        .into_response())
}
