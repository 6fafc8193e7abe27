use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{generate, history, voices};
use crate::state::AppState;
use std::sync::Arc;

/// Create the API router with protected routes
///
/// Note: Authentication middleware should be applied by the caller once state is available
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Protected routes (auth required when AUTH_REQUIRED=true)
        .route("/generate", post(generate::generate_audio))
        .route("/voices", get(voices::list_voices))
        .route("/voices/clone", post(voices::clone_voice))
        .route("/history", get(history::list_history))
        .layer(TraceLayer::new_for_http())
}
