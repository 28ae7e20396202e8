//! WebSocket event feed.
//!
//! Each client gets its own subscription to the supervisor's event
//! stream and receives every camera lifecycle and detection event as a
//! JSON text frame. A slow client skips ahead past events it missed
//! rather than stalling the pipeline.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::time::interval;
use tracing::{debug, info, warn};

use facegate_models::CameraEvent;

use crate::metrics;
use crate::state::AppState;

/// Global counter for active WebSocket connections.
static ACTIVE_WS_CONNECTIONS: AtomicI64 = AtomicI64::new(0);

const WS_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

fn event_type(event: &CameraEvent) -> &'static str {
    match event {
        CameraEvent::CameraStarted { .. } => "cameraStarted",
        CameraEvent::CameraStopped { .. } => "cameraStopped",
        CameraEvent::CameraError { .. } => "cameraError",
        CameraEvent::FaceDetected { .. } => "faceDetected",
    }
}

/// WebSocket events endpoint.
pub async fn ws_events(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let count = ACTIVE_WS_CONNECTIONS.fetch_add(1, Ordering::SeqCst) + 1;
    metrics::set_ws_active_connections(count);
    metrics::record_ws_connection();

    ws.on_upgrade(|socket| async move {
        handle_events_socket(socket, state).await;
        let count = ACTIVE_WS_CONNECTIONS.fetch_sub(1, Ordering::SeqCst) - 1;
        metrics::set_ws_active_connections(count);
    })
}

async fn handle_events_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = state.supervisor.subscribe();

    info!("WebSocket event subscriber connected");

    let mut heartbeat = interval(WS_HEARTBEAT_INTERVAL);
    let mut last_activity = Instant::now();

    loop {
        tokio::select! {
            // Supervisor event to forward
            event = events.next() => {
                match event {
                    Some(event) => {
                        let json = match serde_json::to_string(&event) {
                            Ok(j) => j,
                            Err(e) => {
                                warn!("failed to serialize camera event: {e}");
                                continue;
                            }
                        };
                        metrics::record_ws_event_sent(event_type(&event));
                        if sender.send(Message::Text(json)).await.is_err() {
                            debug!("WebSocket send failed, client disconnected");
                            break;
                        }
                    }
                    None => break, // Broadcaster gone, server is shutting down
                }
            }
            // Heartbeat to keep connection alive
            _ = heartbeat.tick() => {
                if last_activity.elapsed() > WS_HEARTBEAT_INTERVAL / 2 {
                    if sender.send(Message::Ping(vec![])).await.is_err() {
                        debug!("heartbeat failed, client disconnected");
                        break;
                    }
                }
            }
            // Client messages (pong responses, close)
            client_msg = receiver.next() => {
                match client_msg {
                    Some(Ok(Message::Pong(_))) => {
                        last_activity = Instant::now();
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("client closed event connection");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }
}
