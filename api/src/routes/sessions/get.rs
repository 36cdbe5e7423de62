use axum::{
    Extension,
    extract::State,
    http::StatusCode,
};
use db::models::{allowed_student, attendance_record, attendance_session};
use services::report::{self, SessionAttendance};
use util::state::AppState;

use super::common::SessionResponse;
use crate::auth::AuthUser;
use crate::routes::common::{ApiResult, attendance_error, db_error, ok};

/// GET /sessions
///
/// The caller's sessions, newest first, each with its attendance count.
pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> ApiResult<Vec<SessionResponse>> {
    let db = state.db();
    let sessions = match attendance_session::Model::list_for_teacher(db, claims.sub).await {
        Ok(s) => s,
        Err(e) => return db_error(e),
    };
    let ids: Vec<i64> = sessions.iter().map(|s| s.id).collect();
    let counts = match attendance_record::Model::count_by_sessions(db, &ids).await {
        Ok(c) => c,
        Err(e) => return db_error(e),
    };

    let data = sessions
        .into_iter()
        .map(|s| {
            let count = counts.get(&s.id).copied().unwrap_or(0) as u64;
            SessionResponse::new(s, count)
        })
        .collect();
    ok(StatusCode::OK, data, "Sessions retrieved")
}

/// GET /sessions/{session_id}
pub async fn get_session(
    State(state): State<AppState>,
    Extension(session): Extension<attendance_session::Model>,
) -> ApiResult<SessionResponse> {
    match attendance_record::Model::count_for_session(state.db(), session.id).await {
        Ok(count) => ok(
            StatusCode::OK,
            SessionResponse::new(session, count),
            "Session retrieved",
        ),
        Err(e) => db_error(e),
    }
}

/// GET /sessions/{session_id}/attendance
///
/// For a class-linked session, every roster student with `present`/`absent`
/// and a summary (`"mode": "roster"`). Otherwise the raw check-ins, newest
/// first (`"mode": "records"`).
pub async fn get_session_attendance(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Extension(session): Extension<attendance_session::Model>,
) -> ApiResult<Option<SessionAttendance>> {
    match report::session_attendance(state.db(), claims.sub, session.id).await {
        Ok(view) => ok(StatusCode::OK, Some(view), "Attendance retrieved"),
        Err(e) => attendance_error(e),
    }
}

/// GET /sessions/{session_id}/allowed-students
pub async fn list_allowed_students(
    State(state): State<AppState>,
    Extension(session): Extension<attendance_session::Model>,
) -> ApiResult<Vec<allowed_student::Model>> {
    match allowed_student::Model::list(state.db(), session.id).await {
        Ok(list) => ok(StatusCode::OK, list, "Allowed students retrieved"),
        Err(e) => db_error(e),
    }
}
