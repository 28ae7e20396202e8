//! Detection history handlers.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use facegate_models::DetectionRecord;

use crate::state::AppState;

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 500;

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}

/// Most recent detections, newest first.
pub async fn recent_detections(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Json<Vec<DetectionRecord>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    Json(state.detections.recent(limit).await)
}
