use std::collections::HashSet;

use super::{AuthApiSecret, ServerConfig, TlsConfig};

/// Validate API secret entries
///
/// Ids must be non-empty and unique; secrets must be non-empty.
pub fn validate_auth_api_secrets(
    secrets: &[AuthApiSecret],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut ids = HashSet::new();
    for entry in secrets {
        if entry.id.trim().is_empty() {
            return Err("Auth API secret entries require a non-empty id".into());
        }
        if entry.secret.trim().is_empty() {
            return Err(format!("Auth API secret '{}' has an empty secret", entry.id).into());
        }
        if !ids.insert(entry.id.as_str()) {
            return Err(format!("Duplicate auth API secret id '{}'", entry.id).into());
        }
    }
    Ok(())
}

/// Validate that when auth is required, at least one API secret is configured
pub fn validate_auth_required(
    auth_required: bool,
    secrets: &[AuthApiSecret],
) -> Result<(), Box<dyn std::error::Error>> {
    if auth_required && secrets.is_empty() {
        return Err(
            "When AUTH_REQUIRED=true, AUTH_API_SECRET or AUTH_API_SECRETS_JSON must be configured"
                .into(),
        );
    }
    Ok(())
}

/// Validate that TLS certificate and key files exist
pub fn validate_tls(tls: &Option<TlsConfig>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(tls) = tls {
        if !tls.cert_path.exists() {
            return Err(format!(
                "TLS certificate file does not exist: {}",
                tls.cert_path.display()
            )
            .into());
        }
        if !tls.key_path.exists() {
            return Err(format!("TLS key file does not exist: {}", tls.key_path.display()).into());
        }
    }
    Ok(())
}

/// Validate provider endpoints and the credential list
pub fn validate_provider(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    validate_url("TTS_PRIMARY_URL", &config.provider_primary_url)?;
    if let Some(backup) = &config.provider_backup_url {
        validate_url("TTS_BACKUP_URL", backup)?;
    }
    validate_url("TTS_CLONE_URL", &config.provider_clone_url)?;

    config
        .key_pool()
        .map_err(|e| format!("Invalid TTS_API_KEYS: {e}"))?;

    Ok(())
}

fn validate_url(name: &str, raw: &str) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = url::Url::parse(raw).map_err(|e| format!("Invalid {name} '{raw}': {e}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("{name} must use http or https, got '{other}'").into()),
    }
}

/// Validate retry and generation limits
pub fn validate_limits(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.request_timeout_ms == 0 {
        return Err("TTS_REQUEST_TIMEOUT_MS must be greater than 0".into());
    }
    if config.chunk_char_limit == 0 {
        return Err("CHUNK_CHAR_LIMIT must be greater than 0".into());
    }
    if !(0.0..=1.0).contains(&config.min_cut_ratio) {
        return Err(format!(
            "CHUNK_MIN_CUT_RATIO must be between 0 and 1, got {}",
            config.min_cut_ratio
        )
        .into());
    }
    if config.min_text_chars > config.max_text_chars {
        return Err(format!(
            "MIN_TEXT_CHARS ({}) cannot exceed MAX_TEXT_CHARS ({})",
            config.min_text_chars, config.max_text_chars
        )
        .into());
    }
    if config.max_chunks == 0 {
        return Err("MAX_CHUNKS must be greater than 0".into());
    }
    Ok(())
}
