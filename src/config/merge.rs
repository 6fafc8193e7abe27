use std::env;
use std::path::PathBuf;

use super::utils::{non_empty, parse_bool, parse_env_number};
use super::yaml::YamlConfig;
use super::{AuthApiSecret, ServerConfig, TlsConfig, parse_auth_api_secrets_json};
use crate::core::generation::DispatchMode;

/// Merge YAML configuration with environment variables
///
/// Priority order (highest to lowest):
/// 1. YAML configuration values
/// 2. Environment variables
/// 3. Default values
///
/// # Returns
/// * `Result<ServerConfig, Box<dyn std::error::Error>>` - The merged configuration or an error
pub fn merge_config(
    yaml_config: Option<YamlConfig>,
) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let yaml = yaml_config.unwrap_or_default();
    let defaults = ServerConfig::default();

    // Optional string: YAML > ENV
    macro_rules! get_optional {
        ($env_var:expr, $yaml_value:expr) => {
            $yaml_value.or_else(|| env::var($env_var).ok())
        };
    }

    // Parsed value: YAML > ENV > default
    macro_rules! get_number {
        ($env_var:expr, $yaml_value:expr, $default:expr) => {
            match $yaml_value {
                Some(value) => value,
                None => match env::var($env_var) {
                    Ok(raw) => parse_env_number($env_var, &raw)?,
                    Err(_) => $default,
                },
            }
        };
    }

    let server = yaml.server.unwrap_or_default();
    let provider = yaml.provider.unwrap_or_default();
    let retry = yaml.retry.unwrap_or_default();
    let generation = yaml.generation.unwrap_or_default();
    let storage = yaml.storage.unwrap_or_default();
    let auth = yaml.auth.unwrap_or_default();
    let security = yaml.security.unwrap_or_default();

    // Server configuration
    let host = get_optional!("HOST", server.host.clone()).unwrap_or_else(|| defaults.host.clone());
    let port: u16 = get_number!("PORT", server.port, defaults.port);
    let max_request_body_bytes: usize = get_number!(
        "MAX_REQUEST_BODY_BYTES",
        server.max_request_body_bytes,
        defaults.max_request_body_bytes
    );

    // TLS configuration
    let tls_yaml = server.tls.unwrap_or_default();
    let tls_enabled = match tls_yaml.enabled {
        Some(enabled) => enabled,
        None => env::var("TLS_ENABLED")
            .ok()
            .and_then(|v| parse_bool(&v))
            .unwrap_or(false),
    };
    let tls = if tls_enabled {
        let cert_path = get_optional!("TLS_CERT_PATH", tls_yaml.cert_path)
            .ok_or("TLS is enabled but TLS_CERT_PATH is not set")?;
        let key_path = get_optional!("TLS_KEY_PATH", tls_yaml.key_path)
            .ok_or("TLS is enabled but TLS_KEY_PATH is not set")?;
        Some(TlsConfig {
            cert_path: PathBuf::from(cert_path),
            key_path: PathBuf::from(key_path),
        })
    } else {
        None
    };

    // Provider configuration
    let provider_primary_url = non_empty(get_optional!("TTS_PRIMARY_URL", provider.primary_url))
        .unwrap_or_else(|| defaults.provider_primary_url.clone());

    // An explicitly empty backup URL disables failover
    let provider_backup_url = match get_optional!("TTS_BACKUP_URL", provider.backup_url) {
        Some(raw) => non_empty(Some(raw)),
        None => defaults.provider_backup_url.clone(),
    };

    let provider_clone_url = non_empty(get_optional!("TTS_CLONE_URL", provider.clone_url))
        .unwrap_or_else(|| defaults.provider_clone_url.clone());

    let provider_api_keys = match provider.api_keys {
        Some(keys) => keys.into_vec(),
        None => env::var("TTS_API_KEYS").ok().into_iter().collect(),
    };

    let clone_api_key = non_empty(get_optional!("TTS_CLONE_API_KEY", provider.clone_api_key));

    // Retry policy
    let max_attempts: u32 = get_number!("TTS_MAX_ATTEMPTS", retry.max_attempts, defaults.max_attempts);
    let request_timeout_ms: u64 = get_number!(
        "TTS_REQUEST_TIMEOUT_MS",
        retry.request_timeout_ms,
        defaults.request_timeout_ms
    );
    let retry_delay_ms: u64 = get_number!(
        "TTS_RETRY_DELAY_MS",
        retry.retry_delay_ms,
        defaults.retry_delay_ms
    );
    let min_audio_bytes: usize = get_number!(
        "TTS_MIN_AUDIO_BYTES",
        retry.min_audio_bytes,
        defaults.min_audio_bytes
    );

    // Generation limits
    let chunk_char_limit: usize = get_number!(
        "CHUNK_CHAR_LIMIT",
        generation.chunk_char_limit,
        defaults.chunk_char_limit
    );
    let min_cut_ratio: f32 = get_number!(
        "CHUNK_MIN_CUT_RATIO",
        generation.min_cut_ratio,
        defaults.min_cut_ratio
    );
    let min_text_chars: usize = get_number!(
        "MIN_TEXT_CHARS",
        generation.min_text_chars,
        defaults.min_text_chars
    );
    let max_text_chars: usize = get_number!(
        "MAX_TEXT_CHARS",
        generation.max_text_chars,
        defaults.max_text_chars
    );
    let max_chunks: usize = get_number!("MAX_CHUNKS", generation.max_chunks, defaults.max_chunks);
    let dispatch_mode = match get_optional!("DISPATCH_MODE", generation.dispatch) {
        Some(raw) => raw.parse::<DispatchMode>()?,
        None => defaults.dispatch_mode,
    };

    // Storage
    let data_dir = get_optional!("DATA_DIR", storage.data_dir)
        .map(PathBuf::from)
        .unwrap_or_else(|| defaults.data_dir.clone());

    // Authentication configuration
    let auth_required = match auth.required {
        Some(required) => required,
        None => env::var("AUTH_REQUIRED")
            .ok()
            .and_then(|v| parse_bool(&v))
            .unwrap_or(false),
    };

    let auth_api_secrets = if let Some(secrets) = auth.api_secrets {
        secrets
            .into_iter()
            .map(|entry| AuthApiSecret {
                id: entry.id,
                secret: entry.secret,
            })
            .collect()
    } else if let Some(secret) = auth.api_secret {
        vec![AuthApiSecret {
            id: auth.api_secret_id.unwrap_or_else(|| "default".to_string()),
            secret,
        }]
    } else if let Ok(json) = env::var("AUTH_API_SECRETS_JSON") {
        parse_auth_api_secrets_json(&json)?
    } else if let Ok(secret) = env::var("AUTH_API_SECRET") {
        vec![AuthApiSecret {
            id: env::var("AUTH_API_SECRET_ID").unwrap_or_else(|_| "default".to_string()),
            secret,
        }]
    } else {
        Vec::new()
    };

    // Security configuration
    let cors_allowed_origins = get_optional!(
        "CORS_ALLOWED_ORIGINS",
        security.cors_allowed_origins.clone()
    );
    let rate_limit_requests_per_second: u32 = get_number!(
        "RATE_LIMIT_REQUESTS_PER_SECOND",
        security.rate_limit_requests_per_second,
        defaults.rate_limit_requests_per_second
    );
    let rate_limit_burst_size: u32 = get_number!(
        "RATE_LIMIT_BURST_SIZE",
        security.rate_limit_burst_size,
        defaults.rate_limit_burst_size
    );

    Ok(ServerConfig {
        host,
        port,
        tls,
        max_request_body_bytes,
        provider_primary_url,
        provider_backup_url,
        provider_clone_url,
        provider_api_keys,
        clone_api_key,
        max_attempts,
        request_timeout_ms,
        retry_delay_ms,
        min_audio_bytes,
        chunk_char_limit,
        min_cut_ratio,
        min_text_chars,
        max_text_chars,
        max_chunks,
        dispatch_mode,
        data_dir,
        auth_api_secrets,
        auth_required,
        cors_allowed_origins,
        rate_limit_requests_per_second,
        rate_limit_burst_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn cleanup_env_vars() {
        unsafe {
            for var in [
                "HOST",
                "PORT",
                "TLS_ENABLED",
                "TLS_CERT_PATH",
                "TLS_KEY_PATH",
                "TTS_PRIMARY_URL",
                "TTS_BACKUP_URL",
                "TTS_API_KEYS",
                "TTS_CLONE_API_KEY",
                "TTS_MAX_ATTEMPTS",
                "TTS_REQUEST_TIMEOUT_MS",
                "CHUNK_MIN_CUT_RATIO",
                "DISPATCH_MODE",
                "DATA_DIR",
                "AUTH_REQUIRED",
                "AUTH_API_SECRET",
                "AUTH_API_SECRET_ID",
                "AUTH_API_SECRETS_JSON",
                "RATE_LIMIT_REQUESTS_PER_SECOND",
            ] {
                env::remove_var(var);
            }
        }
    }

    fn yaml(src: &str) -> YamlConfig {
        serde_yaml::from_str(src).unwrap()
    }

    #[test]
    #[serial]
    fn test_merge_defaults_when_no_yaml_or_env() {
        cleanup_env_vars();

        let config = merge_config(None).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3001);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.request_timeout_ms, 15_000);
        assert_eq!(config.retry_delay_ms, 100);
        assert_eq!(config.min_audio_bytes, 1000);
        assert_eq!(config.chunk_char_limit, 2800);
        assert_eq!(config.max_text_chars, 200_000);
        assert_eq!(config.dispatch_mode, DispatchMode::Sequential);
        assert!(config.provider_backup_url.is_some());
        assert!(config.provider_api_keys.is_empty());
        assert!(!config.auth_required);
        assert!(config.tls.is_none());
    }

    #[test]
    #[serial]
    fn test_merge_env_values() {
        cleanup_env_vars();
        unsafe {
            env::set_var("TTS_API_KEYS", "a,b,c");
            env::set_var("TTS_MAX_ATTEMPTS", "5");
            env::set_var("TTS_REQUEST_TIMEOUT_MS", "2000");
            env::set_var("DISPATCH_MODE", "concurrent");
            env::set_var("TTS_BACKUP_URL", "");
            env::set_var("DATA_DIR", "/tmp/relay-data");
        }

        let config = merge_config(None).unwrap();
        assert_eq!(config.key_pool().unwrap().len(), 3);
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.request_timeout_ms, 2000);
        assert_eq!(config.dispatch_mode, DispatchMode::Concurrent);
        assert_eq!(config.provider_backup_url, None);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/relay-data"));

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_merge_yaml_overrides_env() {
        cleanup_env_vars();
        unsafe {
            env::set_var("TTS_MAX_ATTEMPTS", "5");
            env::set_var("RATE_LIMIT_REQUESTS_PER_SECOND", "99");
        }

        let config = merge_config(Some(yaml("retry:\n  max_attempts: 2\n"))).unwrap();
        assert_eq!(config.max_attempts, 2);
        assert_eq!(config.rate_limit_requests_per_second, 99);

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_merge_invalid_env_number() {
        cleanup_env_vars();
        unsafe {
            env::set_var("PORT", "not-a-port");
        }

        let err = merge_config(None).unwrap_err();
        assert!(err.to_string().contains("Invalid PORT"));

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_merge_invalid_dispatch_mode() {
        cleanup_env_vars();

        let err = merge_config(Some(yaml("generation:\n  dispatch: \"sideways\"\n"))).unwrap_err();
        assert!(err.to_string().contains("Invalid dispatch mode"));
    }

    #[test]
    #[serial]
    fn test_merge_tls_requires_paths() {
        cleanup_env_vars();
        unsafe {
            env::set_var("TLS_ENABLED", "true");
        }

        let err = merge_config(None).unwrap_err();
        assert!(err.to_string().contains("TLS_CERT_PATH"));

        unsafe {
            env::set_var("TLS_CERT_PATH", "/tmp/cert.pem");
            env::set_var("TLS_KEY_PATH", "/tmp/key.pem");
        }
        let config = merge_config(None).unwrap();
        assert_eq!(
            config.tls.as_ref().unwrap().cert_path,
            PathBuf::from("/tmp/cert.pem")
        );

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_merge_auth_config() {
        cleanup_env_vars();
        unsafe {
            env::set_var("AUTH_REQUIRED", "yes");
            env::set_var("AUTH_API_SECRET", "env-secret");
            env::set_var("AUTH_API_SECRET_ID", "ops");
        }

        let config = merge_config(None).unwrap();
        assert!(config.auth_required);
        assert_eq!(
            config.auth_api_secrets,
            vec![AuthApiSecret {
                id: "ops".to_string(),
                secret: "env-secret".to_string(),
            }]
        );

        // YAML list wins over the env secret
        let config = merge_config(Some(yaml(
            "auth:\n  api_secrets:\n    - id: \"dash\"\n      secret: \"yaml-secret\"\n",
        )))
        .unwrap();
        assert_eq!(config.find_api_secret_id("yaml-secret"), Some("dash"));
        assert_eq!(config.find_api_secret_id("env-secret"), None);

        unsafe {
            env::remove_var("AUTH_API_SECRET");
            env::set_var(
                "AUTH_API_SECRETS_JSON",
                r#"[{"id":"a","secret":"s1"},{"id":"b","secret":"s2"}]"#,
            );
        }
        let config = merge_config(None).unwrap();
        assert_eq!(config.auth_api_secrets.len(), 2);

        cleanup_env_vars();
    }
}
