use axum::{
    Extension,
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::auth::Auth;
use crate::errors::app_error::AppResult;
use crate::state::AppState;
use crate::store::HistoryEntry;

const DEFAULT_HISTORY_LIMIT: usize = 50;
const MAX_HISTORY_LIMIT: usize = 500;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// Handler for GET /history
///
/// Newest generations last. Authenticated callers only see their own entries.
pub async fn list_history(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<Auth>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<HistoryEntry>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);

    let entries = match auth.id.as_deref() {
        Some(id) => {
            let mut own: Vec<HistoryEntry> = state
                .history
                .recent(usize::MAX)
                .await?
                .into_iter()
                .filter(|entry| entry.user.as_deref() == Some(id))
                .collect();
            let skip = own.len().saturating_sub(limit);
            own.drain(..skip);
            own
        }
        None => state.history.recent(limit).await?,
    };

    Ok(Json(entries))
}
