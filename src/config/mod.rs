//! Configuration module for the speech relay server
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//! - `utils`: Utility functions for configuration parsing
//!
//! # Example
//! ```rust,no_run
//! use speech_relay::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crate::core::generation::{
    Credential, DEFAULT_BACKUP_URL, DEFAULT_PRIMARY_URL, DispatchMode, GenerationResult,
    GenerationSettings, KeyPool, ProviderEndpoints, RetryPolicy,
};

mod env;
mod merge;
mod utils;
mod validation;
mod yaml;

pub use utils::parse_bool;

/// TLS configuration for HTTPS
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: PathBuf,
    /// Path to the TLS private key file (PEM format)
    pub key_path: PathBuf,
}

/// API secret authentication entry with a client identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthApiSecret {
    pub id: String,
    pub secret: String,
}

/// Server configuration
///
/// Contains all configuration needed to run the relay:
/// - Server settings (host, port, TLS, body limit)
/// - Provider endpoints and credentials
/// - Chunk retry policy and generation limits
/// - Data directory for voice records and history
/// - Authentication and security settings (CORS, rate limiting)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // TLS configuration (optional)
    pub tls: Option<TlsConfig>,

    /// Largest accepted request body; clone uploads carry base64 audio
    pub max_request_body_bytes: usize,

    // Provider settings
    pub provider_primary_url: String,
    /// None disables failover
    pub provider_backup_url: Option<String>,
    pub provider_clone_url: String,
    /// Raw key entries; each may itself be a delimited list
    pub provider_api_keys: Vec<String>,
    /// Key for voice cloning; the first synthesis key is used when unset
    pub clone_api_key: Option<String>,

    // Retry policy
    pub max_attempts: u32,
    pub request_timeout_ms: u64,
    pub retry_delay_ms: u64,
    pub min_audio_bytes: usize,

    // Generation limits
    pub chunk_char_limit: usize,
    pub min_cut_ratio: f32,
    pub min_text_chars: usize,
    pub max_text_chars: usize,
    pub max_chunks: usize,
    pub dispatch_mode: DispatchMode,

    /// Directory holding voices.json and history.jsonl
    pub data_dir: PathBuf,

    // Authentication configuration
    pub auth_api_secrets: Vec<AuthApiSecret>,
    pub auth_required: bool,

    // Security configuration
    /// CORS allowed origins (comma-separated list or "*" for all)
    /// Default: None (CORS disabled, same-origin only)
    pub cors_allowed_origins: Option<String>,
    /// Maximum requests per second per IP address
    /// Default: 60
    pub rate_limit_requests_per_second: u32,
    /// Maximum burst size for rate limiting
    /// Default: 10
    pub rate_limit_burst_size: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        let generation = GenerationSettings::default();

        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            tls: None,
            max_request_body_bytes: 25 * 1024 * 1024,
            provider_primary_url: DEFAULT_PRIMARY_URL.to_string(),
            provider_backup_url: Some(DEFAULT_BACKUP_URL.to_string()),
            provider_clone_url: crate::core::clone::DEFAULT_CLONE_URL.to_string(),
            provider_api_keys: Vec::new(),
            clone_api_key: None,
            max_attempts: retry.max_attempts,
            request_timeout_ms: retry.request_timeout.as_millis() as u64,
            retry_delay_ms: retry.retry_delay.as_millis() as u64,
            min_audio_bytes: retry.min_audio_bytes,
            chunk_char_limit: generation.chunk_char_limit,
            min_cut_ratio: generation.min_cut_ratio,
            min_text_chars: generation.min_text_chars,
            max_text_chars: generation.max_text_chars,
            max_chunks: generation.max_chunks,
            dispatch_mode: generation.dispatch,
            data_dir: PathBuf::from("data"),
            auth_api_secrets: Vec::new(),
            auth_required: false,
            cors_allowed_origins: None,
            rate_limit_requests_per_second: 60,
            rate_limit_burst_size: 10,
        }
    }
}

/// Implement Drop to zeroize all secret fields when ServerConfig is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        for key in &mut self.provider_api_keys {
            key.zeroize();
        }
        if let Some(ref mut key) = self.clone_api_key {
            key.zeroize();
        }
        for secret in &mut self.auth_api_secrets {
            secret.secret.zeroize();
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// After loading and merging, performs validation on the final configuration.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        // .env is loaded in main.rs at startup, so it is already part of the environment here
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        validation::validate_auth_api_secrets(&self.auth_api_secrets)?;
        validation::validate_auth_required(self.auth_required, &self.auth_api_secrets)?;
        validation::validate_tls(&self.tls)?;
        validation::validate_provider(self)?;
        validation::validate_limits(self)?;
        Ok(())
    }

    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if TLS is enabled
    pub fn is_tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    /// Check if API secret authentication is configured
    pub fn has_api_secret_auth(&self) -> bool {
        !self.auth_api_secrets.is_empty()
    }

    /// Find the API secret identifier that matches a bearer token
    ///
    /// Secrets are compared in constant time.
    pub fn find_api_secret_id(&self, token: &str) -> Option<&str> {
        crate::auth::match_api_secret_id(token, &self.auth_api_secrets)
    }

    /// Build the credential pool from the configured key entries.
    pub fn key_pool(&self) -> GenerationResult<KeyPool> {
        KeyPool::from_source(&self.provider_api_keys.join("\n"))
    }

    /// Credential for voice cloning: the dedicated clone key, else the first
    /// synthesis key.
    pub fn clone_credential(&self) -> Option<Credential> {
        if let Some(key) = self.clone_api_key.as_deref().map(str::trim)
            && !key.is_empty()
        {
            return Some(Credential::new(key));
        }
        self.key_pool().ok().map(|pool| pool.next(0).clone())
    }

    pub fn provider_endpoints(&self) -> ProviderEndpoints {
        ProviderEndpoints {
            primary: self.provider_primary_url.clone(),
            backup: self.provider_backup_url.clone(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            min_audio_bytes: self.min_audio_bytes,
        }
    }

    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            chunk_char_limit: self.chunk_char_limit,
            min_cut_ratio: self.min_cut_ratio,
            min_text_chars: self.min_text_chars,
            max_text_chars: self.max_text_chars,
            max_chunks: self.max_chunks,
            dispatch: self.dispatch_mode,
        }
    }
}

pub(crate) fn parse_auth_api_secrets_json(
    json_str: &str,
) -> Result<Vec<AuthApiSecret>, Box<dyn std::error::Error>> {
    #[derive(serde::Deserialize)]
    struct AuthApiSecretJson {
        id: String,
        secret: String,
    }

    let secrets: Vec<AuthApiSecretJson> = serde_json::from_str(json_str)
        .map_err(|e| format!("Invalid AUTH_API_SECRETS_JSON format: {e}"))?;

    Ok(secrets
        .into_iter()
        .map(|entry| AuthApiSecret {
            id: entry.id,
            secret: entry.secret,
        })
        .collect())
}
