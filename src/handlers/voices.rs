use axum::{
    Extension,
    extract::{State, rejection::JsonRejection},
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use crate::auth::Auth;
use crate::core::clone::{CloneError, VoiceCloneRequest};
use crate::errors::app_error::{AppError, AppResult};
use crate::state::AppState;
use crate::store::VoiceRecord;

/// Language label for voices registered through cloning
const CLONED_VOICE_LANGUAGE: &str = "Custom";

/// A selectable voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    pub name: String,
    pub language: String,
}

/// Voices shipped with the service, in display order
const BUILTIN_VOICES: &[(&str, &str, &str)] = &[
    (
        "255656c1-d447-4746-a405-6bb496bbb156",
        "Majid (Cloned)",
        "Custom",
    ),
    (
        "580f907d-33c4-4d55-ac9e-fa62c383dd69",
        "YY (Cloned)",
        "Custom",
    ),
    ("default_male", "Default Male", "English"),
    ("default_female", "Default Female", "English"),
    ("henry", "Henry - British Male", "English (UK)"),
    ("simba", "Simba - Friendly Male", "English (US)"),
    ("cliff", "Cliff - Deep Male", "English (US)"),
    ("nicole", "Nicole - Clear Female", "English (US)"),
    ("sara", "Sara - Soft Female", "English (US)"),
];

pub fn builtin_voices() -> Vec<Voice> {
    BUILTIN_VOICES
        .iter()
        .map(|(id, name, language)| Voice {
            id: (*id).to_string(),
            name: (*name).to_string(),
            language: (*language).to_string(),
        })
        .collect()
}

/// Built-in voices followed by registered clones, first occurrence of an id wins.
fn merge_catalog(records: Vec<VoiceRecord>) -> Vec<Voice> {
    let mut voices = builtin_voices();
    let mut seen: HashSet<String> = voices.iter().map(|v| v.id.clone()).collect();

    for record in records {
        if seen.insert(record.id.clone()) {
            voices.push(Voice {
                id: record.id,
                name: record.name,
                language: record
                    .language
                    .unwrap_or_else(|| CLONED_VOICE_LANGUAGE.to_string()),
            });
        }
    }

    voices
}

/// Handler for GET /voices
///
/// An unreadable registry degrades to the built-in list.
pub async fn list_voices(State(state): State<Arc<AppState>>) -> Json<Vec<Voice>> {
    let records = match state.voices.list().await {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!("Failed to read voice registry: {}", e);
            Vec::new()
        }
    };

    Json(merge_catalog(records))
}

/// The created voice as returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceSummary {
    pub id: String,
    pub name: String,
}

/// Response from voice cloning endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceCloneResponse {
    pub ok: bool,
    pub message: String,
    pub voice: VoiceSummary,
    pub voice_name: String,
}

/// Handler for POST /voices/clone
///
/// # Request Body
///
/// ```json
/// {
///   "username": "alice",
///   "name": "Narrator",
///   "gender": "female",
///   "audio_sample": "data:audio/wav;base64,UklGRi..."
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "ok": true,
///   "message": "Voice cloned successfully",
///   "voice": { "id": "b7c1...", "name": "Narrator" },
///   "voice_name": "Narrator"
/// }
/// ```
pub async fn clone_voice(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<Auth>,
    payload: Result<Json<VoiceCloneRequest>, JsonRejection>,
) -> AppResult<Json<VoiceCloneResponse>> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let cloner = state.cloner.as_ref().ok_or_else(|| {
        CloneError::Configuration("No API key configured for voice cloning".to_string())
    })?;

    let voice = cloner.clone_voice(&request).await?;

    let record = VoiceRecord::new(
        voice.id.clone(),
        voice.name.clone(),
        voice
            .language
            .clone()
            .or_else(|| Some(CLONED_VOICE_LANGUAGE.to_string())),
        request.username.trim(),
    );
    // The provider already holds the voice; a failed write only hides it from listings
    if let Err(e) = state.voices.record(record).await {
        tracing::error!(voice_id = %voice.id, "Failed to record cloned voice: {}", e);
    }

    tracing::info!(
        voice_id = %voice.id,
        auth_id = ?auth.id,
        "Voice clone request completed"
    );

    Ok(Json(VoiceCloneResponse {
        ok: true,
        message: "Voice cloned successfully".to_string(),
        voice_name: voice.name.clone(),
        voice: VoiceSummary {
            id: voice.id,
            name: voice.name,
        },
    }))
}
