use std::sync::Arc;

use crate::config::ServerConfig;
use crate::core::clone::VoiceCloner;
use crate::core::generation::{ChunkRequester, GenerationOrchestrator, GenerationResult};
use crate::store::{HistoryLog, VoiceRegistry};

/// Application state that can be shared across handlers
pub struct AppState {
    pub config: ServerConfig,
    /// Chunked generation pipeline; owns the process-wide rotation cursor
    pub orchestrator: Arc<GenerationOrchestrator>,
    /// None when no clone credential is configured
    pub cloner: Option<VoiceCloner>,
    pub voices: VoiceRegistry,
    pub history: HistoryLog,
}

impl AppState {
    pub async fn new(config: ServerConfig) -> GenerationResult<Arc<Self>> {
        let key_pool = Arc::new(config.key_pool()?);
        let requester = ChunkRequester::new(config.provider_endpoints(), config.retry_policy())?;
        let orchestrator = Arc::new(GenerationOrchestrator::new(
            Arc::new(requester),
            key_pool,
            config.generation_settings(),
        ));

        // Cloning stays unavailable rather than failing startup
        let cloner = match config.clone_credential() {
            Some(credential) => {
                match VoiceCloner::new(config.provider_clone_url.clone(), credential) {
                    Ok(cloner) => Some(cloner),
                    Err(e) => {
                        tracing::warn!("Failed to initialize voice cloner: {}", e);
                        None
                    }
                }
            }
            None => None,
        };

        let voices = VoiceRegistry::in_dir(&config.data_dir);
        let history = HistoryLog::in_dir(&config.data_dir);

        tracing::info!(
            keys = orchestrator.key_pool().len(),
            data_dir = %config.data_dir.display(),
            cloning = cloner.is_some(),
            "Application state initialized"
        );

        Ok(Arc::new(Self {
            config,
            orchestrator,
            cloner,
            voices,
            history,
        }))
    }
}
