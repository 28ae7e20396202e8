//! API routes.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;

use crate::handlers::cameras::{
    get_camera, list_cameras, list_processing, start_camera, stop_camera, upsert_camera,
};
use crate::handlers::detections::recent_detections;
use crate::handlers::health;
use crate::metrics::metrics_middleware;
use crate::state::AppState;
use crate::ws::ws_events;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let camera_routes = Router::new()
        .route("/cameras", get(list_cameras))
        .route("/cameras", post(upsert_camera))
        .route("/cameras/:camera_id", get(get_camera))
        .route("/cameras/:camera_id/start", post(start_camera))
        .route("/cameras/:camera_id/stop", post(stop_camera))
        .route("/processing", get(list_processing));

    let detection_routes = Router::new().route("/detections/recent", get(recent_detections));

    let ws_routes = Router::new().route("/ws/events", get(ws_events));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", camera_routes.merge(detection_routes))
        .merge(ws_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
