pub mod api;

use axum::{Router, extract::DefaultBodyLimit, middleware, routing::get};
use std::sync::Arc;

use crate::handlers;
use crate::middleware::auth_middleware;
use crate::state::AppState;

/// Public and protected routes wired to `state`.
///
/// Transport concerns (CORS, rate limiting, security headers) are layered on
/// by the binary.
pub fn create_app_router(state: Arc<AppState>) -> Router {
    let max_body = state.config.max_request_body_bytes;

    let protected_routes = api::create_api_router()
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Health check stays reachable without credentials
    let public_routes = Router::new().route("/", get(handlers::api::health_check));

    public_routes
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(max_body))
        .with_state(state)
}
