use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
};
use db::models::{allowed_student, attendance_session};
use util::state::AppState;

use super::common::SessionResponse;
use super::put::respond_updated;
use crate::routes::common::{ApiResult, db_error, fail, ok};
use crate::ws::attendance::{emit, payload};

/// DELETE /sessions/{session_id}
///
/// Removes the session with its attendance records and whitelist.
pub async fn delete_session(
    State(state): State<AppState>,
    Extension(session): Extension<attendance_session::Model>,
) -> ApiResult<()> {
    let session_id = session.id;
    match session.delete_cascade(state.db()).await {
        Ok(()) => {
            emit::session_deleted(state.ws(), payload::SessionDeleted { session_id }).await;
            tracing::info!(session_id, "Session deleted");
            ok(StatusCode::OK, (), "Session deleted")
        }
        Err(e) => db_error(e),
    }
}

/// DELETE /sessions/{session_id}/location
///
/// Drops the geofence; check-ins no longer need a location.
pub async fn clear_location(
    State(state): State<AppState>,
    Extension(session): Extension<attendance_session::Model>,
) -> ApiResult<SessionResponse> {
    match session.clear_location(state.db()).await {
        Ok(s) => respond_updated(&state, s, "Location cleared").await,
        Err(e) => db_error(e),
    }
}

/// DELETE /sessions/{session_id}/allowed-students/{student_id}
pub async fn remove_allowed_student(
    State(state): State<AppState>,
    Path((_, student_id)): Path<(i64, String)>,
    Extension(session): Extension<attendance_session::Model>,
) -> ApiResult<()> {
    match allowed_student::Model::remove(state.db(), session.id, student_id.trim()).await {
        Ok(true) => ok(StatusCode::OK, (), "Student removed from allowed list"),
        Ok(false) => fail(StatusCode::NOT_FOUND, "Student is not on the allowed list"),
        Err(e) => db_error(e),
    }
}
