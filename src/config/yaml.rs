use serde::Deserialize;
use std::path::PathBuf;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration; anything left out
/// falls back to environment variables and then to defaults.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 3001
///   max_request_body_bytes: 2097152
///   tls:
///     enabled: true
///     cert_path: "/etc/relay/cert.pem"
///     key_path: "/etc/relay/key.pem"
///
/// provider:
///   primary_url: "https://api.sws.speechify.com/v1/audio/stream"
///   backup_url: "https://api.speechify.com/v1/audio/stream"
///   clone_url: "https://api.sws.speechify.com/v1/voices"
///   api_keys:
///     - "first-key"
///     - "second-key"
///   clone_api_key: "clone-key"
///
/// retry:
///   max_attempts: 3
///   request_timeout_ms: 15000
///   retry_delay_ms: 100
///   min_audio_bytes: 1000
///
/// generation:
///   chunk_char_limit: 2800
///   min_cut_ratio: 0.0
///   min_text_chars: 2
///   max_text_chars: 200000
///   max_chunks: 100
///   dispatch: "sequential"
///
/// storage:
///   data_dir: "./data"
///
/// auth:
///   required: true
///   api_secrets:
///     - id: "dashboard"
///       secret: "your-api-secret"
///
/// security:
///   cors_allowed_origins: "*"
///   rate_limit_requests_per_second: 60
///   rate_limit_burst_size: 10
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub provider: Option<ProviderYaml>,
    pub retry: Option<RetryYaml>,
    pub generation: Option<GenerationYaml>,
    pub storage: Option<StorageYaml>,
    pub auth: Option<AuthYaml>,
    pub security: Option<SecurityYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub tls: Option<TlsYaml>,
    pub max_request_body_bytes: Option<usize>,
}

/// TLS configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TlsYaml {
    pub enabled: Option<bool>,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

/// API keys given either as one delimited string or as a list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiKeysYaml {
    Delimited(String),
    List(Vec<String>),
}

impl ApiKeysYaml {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            ApiKeysYaml::Delimited(raw) => vec![raw],
            ApiKeysYaml::List(keys) => keys,
        }
    }
}

/// TTS provider endpoints and credentials from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProviderYaml {
    pub primary_url: Option<String>,
    /// Empty string disables the backup endpoint
    pub backup_url: Option<String>,
    pub clone_url: Option<String>,
    pub api_keys: Option<ApiKeysYaml>,
    /// Key used for voice cloning; defaults to the first synthesis key
    pub clone_api_key: Option<String>,
}

/// Chunk retry policy from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RetryYaml {
    pub max_attempts: Option<u32>,
    pub request_timeout_ms: Option<u64>,
    pub retry_delay_ms: Option<u64>,
    pub min_audio_bytes: Option<usize>,
}

/// Segmentation and dispatch settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GenerationYaml {
    pub chunk_char_limit: Option<usize>,
    pub min_cut_ratio: Option<f32>,
    pub min_text_chars: Option<usize>,
    pub max_text_chars: Option<usize>,
    pub max_chunks: Option<usize>,
    /// "sequential" or "concurrent"
    pub dispatch: Option<String>,
}

/// Storage configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct StorageYaml {
    pub data_dir: Option<String>,
}

/// API secret entry from YAML
#[derive(Debug, Clone, Deserialize)]
pub struct AuthApiSecretYaml {
    pub id: String,
    pub secret: String,
}

/// Authentication configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AuthYaml {
    pub required: Option<bool>,
    pub api_secrets: Option<Vec<AuthApiSecretYaml>>,
    /// Single secret shorthand
    pub api_secret: Option<String>,
    pub api_secret_id: Option<String>,
}

/// Security configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SecurityYaml {
    /// CORS allowed origins (comma-separated list or "*" for all)
    pub cors_allowed_origins: Option<String>,
    /// Maximum requests per second per IP address
    pub rate_limit_requests_per_second: Option<u32>,
    /// Maximum burst size for rate limiting
    pub rate_limit_burst_size: Option<u32>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or the YAML is malformed.
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;

        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML config: {e}"))?;

        Ok(config)
    }
}
