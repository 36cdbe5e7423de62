use axum::{
    extract::{Path, State, WebSocketUpgrade},
    response::IntoResponse,
};
use util::state::AppState;
use util::ws::{WsServerOptions, serve_topic};

use super::topics::attendance_session_topic;

/// GET /ws/attendance/sessions/{session_id}
///
/// Live dashboard feed for one session. Ownership is checked by the route guard;
/// the socket only receives `attendance.*` events for that session.
pub async fn attendance_session_ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
    Path(session_id): Path<i64>,
) -> impl IntoResponse {
    let manager = app_state.ws_clone();
    let topic = attendance_session_topic(session_id);

    ws.on_upgrade(move |socket| async move {
        tracing::info!(session_id, "Dashboard socket opened");
        serve_topic(socket, manager, topic, WsServerOptions::default()).await;
    })
}
