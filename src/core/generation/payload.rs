//! Provider response decoding.
//!
//! The synthesis endpoints answer with raw MP3 bytes, with JSON carrying the
//! audio as base64, or with a JSON/text error body. Responses are classified
//! by content type and byte signature first and only then decoded. Bodies
//! that are neither audio nor JSON are kept whole; whether they count as audio
//! depends on the response status.

use base64::Engine;
use bytes::Bytes;
use serde_json::Value;

/// Longest error body excerpt kept for logs and error messages
const MAX_ERROR_EXCERPT: usize = 512;

/// JSON fields that may carry base64 audio
const AUDIO_FIELDS: [&str; 2] = ["audio_data", "audio"];

/// JSON fields that may carry an error description
const MESSAGE_FIELDS: [&str; 4] = ["message", "error", "detail", "error_message"];

/// A classified provider response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderPayload {
    /// Binary audio body
    Audio(Bytes),
    /// Audio decoded from a base64 JSON field
    EncodedAudio(Bytes),
    /// JSON body without audio; carries the best error description found
    Json(String),
    /// Anything else, untouched
    Opaque(Bytes),
}

impl ProviderPayload {
    /// Classify and decode a response body.
    pub fn parse(content_type: Option<&str>, body: Bytes) -> Self {
        let mime = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase())
            .unwrap_or_default();

        if mime.starts_with("audio/") || mime == "application/octet-stream" {
            return ProviderPayload::Audio(body);
        }

        if looks_like_mp3(&body) {
            return ProviderPayload::Audio(body);
        }

        let declared_json = mime == "application/json" || mime.ends_with("+json");
        let sniffed_json = body.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'{');

        if declared_json || sniffed_json {
            match serde_json::from_slice::<Value>(&body) {
                Ok(value) => return Self::from_json(&value),
                Err(_) if declared_json => return ProviderPayload::Json(excerpt(&body)),
                Err(_) => {}
            }
        }

        ProviderPayload::Opaque(body)
    }

    fn from_json(value: &Value) -> Self {
        for field in AUDIO_FIELDS {
            if let Some(encoded) = value.get(field).and_then(Value::as_str) {
                return match base64::engine::general_purpose::STANDARD.decode(encoded) {
                    Ok(audio) => ProviderPayload::EncodedAudio(Bytes::from(audio)),
                    Err(e) => ProviderPayload::Json(format!("invalid base64 in `{field}`: {e}")),
                };
            }
        }

        ProviderPayload::Json(json_message(value))
    }

    /// The audio carried by this payload, if any.
    ///
    /// Opaque bodies are returned as-is; JSON without an audio field never is.
    pub fn into_audio(self) -> Option<Bytes> {
        match self {
            ProviderPayload::Audio(audio)
            | ProviderPayload::EncodedAudio(audio)
            | ProviderPayload::Opaque(audio) => Some(audio),
            ProviderPayload::Json(_) => None,
        }
    }

    /// A short description suitable for error messages.
    pub fn describe(&self) -> String {
        match self {
            ProviderPayload::Audio(audio) => format!("{} bytes of audio", audio.len()),
            ProviderPayload::EncodedAudio(audio) => {
                format!("{} bytes of base64-encoded audio", audio.len())
            }
            ProviderPayload::Json(message) => message.clone(),
            ProviderPayload::Opaque(body) => excerpt(body),
        }
    }
}

/// MP3 streams start with an ID3v2 tag or an MPEG frame sync.
fn looks_like_mp3(body: &[u8]) -> bool {
    body.starts_with(b"ID3") || (body.len() >= 2 && body[0] == 0xFF && (body[1] & 0xE0) == 0xE0)
}

fn json_message(value: &Value) -> String {
    for field in MESSAGE_FIELDS {
        match value.get(field) {
            Some(Value::String(s)) => return s.clone(),
            // {"error": {"message": "..."}}
            Some(nested @ Value::Object(_)) => return json_message(nested),
            _ => {}
        }
    }
    let raw = value.to_string();
    truncate(&raw)
}

fn excerpt(body: &[u8]) -> String {
    truncate(String::from_utf8_lossy(body).trim())
}

fn truncate(s: &str) -> String {
    if s.chars().count() <= MAX_ERROR_EXCERPT {
        s.to_string()
    } else {
        let cut: String = s.chars().take(MAX_ERROR_EXCERPT).collect();
        format!("{cut}...")
    }
}
