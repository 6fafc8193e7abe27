use std::time::Duration;

use base64::Engine;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::{CloneError, CloneResult};
use super::format::{AudioFormat, detect_audio_format};
use crate::core::generation::{Credential, ProviderPayload};

/// Provider endpoint that registers new voices
pub const DEFAULT_CLONE_URL: &str = "https://api.sws.speechify.com/v1/voices";

/// Uploads can be large, so they get a longer budget than synthesis calls
pub const DEFAULT_CLONE_TIMEOUT: Duration = Duration::from_secs(60);

const DEFAULT_GENDER: &str = "male";

/// Request body for POST /voices/clone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceCloneRequest {
    /// Account the voice is registered for; also used for the consent record
    pub username: String,
    /// Display name; a random `Voice_xxxxxxxx` name is generated when absent
    #[serde(default, alias = "voice_name")]
    pub name: Option<String>,
    /// `male`, `female` or `notSpecified`; defaults to `male`
    #[serde(default)]
    pub gender: Option<String>,
    /// Base64 audio, optionally as a `data:` URL
    pub audio_sample: String,
    #[serde(default)]
    pub file_name: Option<String>,
}

/// A voice the provider accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClonedVoice {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedVoiceResponse {
    id: Option<String>,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Consent<'a> {
    full_name: &'a str,
    email: String,
}

/// Registers new voices with the TTS provider from an audio sample.
#[derive(Debug, Clone)]
pub struct VoiceCloner {
    client: reqwest::Client,
    endpoint: String,
    credential: Credential,
    timeout: Duration,
}

impl VoiceCloner {
    pub fn new(endpoint: impl Into<String>, credential: Credential) -> CloneResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| CloneError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(client, endpoint, credential))
    }

    pub fn with_client(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        credential: Credential,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            credential,
            timeout: DEFAULT_CLONE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Upload the sample and return the created voice.
    pub async fn clone_voice(&self, request: &VoiceCloneRequest) -> CloneResult<ClonedVoice> {
        let username = request.username.trim();
        if username.is_empty() {
            return Err(CloneError::InvalidRequest("Missing username".to_string()));
        }

        let name = resolve_voice_name(request.name.as_deref());
        let gender = resolve_gender(request.gender.as_deref())?;
        let sample = decode_sample(&request.audio_sample)?;
        let format = detect_audio_format(&sample).ok_or(CloneError::UnsupportedFormat)?;
        let file_name = sample_file_name(request.file_name.as_deref(), format);

        let consent = serde_json::to_string(&Consent {
            full_name: username,
            email: format!("{username}@example.com"),
        })
        .map_err(|e| CloneError::InvalidRequest(format!("Failed to encode consent: {e}")))?;

        info!(
            voice_name = %name,
            user = %username,
            bytes = sample.len(),
            format = format.extension,
            "Uploading voice sample"
        );

        let part = Part::bytes(sample)
            .file_name(file_name)
            .mime_str(format.mime_type)
            .map_err(|e| CloneError::Configuration(format!("Failed to set MIME type: {e}")))?;

        let form = Form::new()
            .text("name", name.clone())
            .text("gender", gender)
            .text("consent", consent)
            .part("sample", part);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.credential.expose())
            .timeout(self.timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| CloneError::Network(e.to_string()))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response
            .bytes()
            .await
            .map_err(|e| CloneError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = ProviderPayload::parse(content_type.as_deref(), body).describe();
            warn!(status = status.as_u16(), error = %message, "Voice clone rejected");
            return Err(CloneError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let created: CreatedVoiceResponse = serde_json::from_slice(&body)
            .map_err(|e| CloneError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        let id = created
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| CloneError::InvalidResponse("response carries no voice id".to_string()))?;

        info!(voice_id = %id, voice_name = %name, "Voice cloned");

        Ok(ClonedVoice {
            id,
            name,
            language: created.language,
        })
    }
}

/// Decode a base64 sample, accepting a `data:<mime>;base64,` prefix.
pub fn decode_sample(encoded: &str) -> CloneResult<Vec<u8>> {
    let encoded = encoded.trim();
    let data = if encoded.starts_with("data:") {
        encoded
            .split_once(',')
            .map(|(_, data)| data)
            .ok_or_else(|| CloneError::InvalidAudio("malformed data URL".to_string()))?
    } else {
        encoded
    };

    if data.is_empty() {
        return Err(CloneError::InvalidAudio("No audio uploaded".to_string()));
    }

    base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| CloneError::InvalidAudio(format!("Failed to decode audio sample: {e}")))
}

fn resolve_voice_name(name: Option<&str>) -> String {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => name.to_string(),
        None => {
            let id = uuid::Uuid::new_v4().simple().to_string();
            format!("Voice_{}", &id[..8])
        }
    }
}

fn resolve_gender(gender: Option<&str>) -> CloneResult<String> {
    let Some(gender) = gender.map(str::trim).filter(|g| !g.is_empty()) else {
        return Ok(DEFAULT_GENDER.to_string());
    };

    match gender.to_ascii_lowercase().as_str() {
        "male" => Ok("male".to_string()),
        "female" => Ok("female".to_string()),
        "notspecified" | "not_specified" | "unspecified" => Ok("notSpecified".to_string()),
        other => Err(CloneError::InvalidRequest(format!(
            "Invalid gender '{other}'. Expected 'male', 'female' or 'notSpecified'"
        ))),
    }
}

/// Base name of the uploaded file with an extension matching the sniffed
/// format.
fn sample_file_name(file_name: Option<&str>, format: AudioFormat) -> String {
    let base = file_name
        .and_then(|n| n.rsplit(['/', '\\']).next())
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(|n| n.rsplit_once('.').map_or(n, |(stem, _)| stem))
        .filter(|stem| !stem.is_empty())
        .unwrap_or("sample");

    format!("{base}.{}", format.extension)
}
