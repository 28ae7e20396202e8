//! Camera registry and processing control handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::info;

use facegate_engine::{ActiveCamera, CameraDirectory};
use facegate_models::{Camera, CameraId};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// List all registered cameras.
pub async fn list_cameras(State(state): State<AppState>) -> ApiResult<Json<Vec<Camera>>> {
    let cameras = state.cameras.list_cameras().await?;
    Ok(Json(cameras))
}

/// Get one registered camera.
pub async fn get_camera(
    State(state): State<AppState>,
    Path(camera_id): Path<String>,
) -> ApiResult<Json<Camera>> {
    let id = CameraId::from(camera_id);
    state
        .cameras
        .get_camera(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("camera {id} not found")))
}

/// Register or replace a camera.
pub async fn upsert_camera(
    State(state): State<AppState>,
    Json(camera): Json<Camera>,
) -> ApiResult<(StatusCode, Json<Camera>)> {
    if camera.name.trim().is_empty() {
        return Err(ApiError::bad_request("camera name must not be empty"));
    }
    if camera.source_url.trim().is_empty() {
        return Err(ApiError::bad_request("camera sourceUrl must not be empty"));
    }
    info!(camera_id = %camera.id, "registering camera");
    state.cameras.upsert(camera.clone()).await;
    Ok((StatusCode::CREATED, Json(camera)))
}

#[derive(Serialize)]
pub struct ProcessingResponse {
    pub success: bool,
    pub message: String,
}

/// Start processing a camera.
pub async fn start_camera(
    State(state): State<AppState>,
    Path(camera_id): Path<String>,
) -> ApiResult<Json<ProcessingResponse>> {
    let id = CameraId::from(camera_id);
    state.supervisor.start(&id).await?;
    Ok(Json(ProcessingResponse {
        success: true,
        message: format!("camera {id} processing"),
    }))
}

/// Stop processing a camera.
pub async fn stop_camera(
    State(state): State<AppState>,
    Path(camera_id): Path<String>,
) -> ApiResult<Json<ProcessingResponse>> {
    let id = CameraId::from(camera_id);
    state.supervisor.stop(&id).await?;
    Ok(Json(ProcessingResponse {
        success: true,
        message: format!("camera {id} stopped"),
    }))
}

/// Snapshot of cameras currently being processed.
pub async fn list_processing(State(state): State<AppState>) -> Json<Vec<ActiveCamera>> {
    Json(state.supervisor.list().await)
}
