use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use db::models::attendance_session;
use serde::Deserialize;
use services::{geo, manual_override::{self, OverrideOutcome}};
use util::state::AppState;

use super::common::SessionResponse;
use crate::auth::AuthUser;
use crate::routes::common::{ApiResult, attendance_error, db_error, fail, ok};
use crate::ws::attendance::{emit, payload};

#[derive(Debug, Deserialize)]
pub struct SetStatusReq {
    pub active: bool,
}

/// Broadcasts `attendance.session_updated` and answers with the fresh session.
pub(super) async fn respond_updated(
    state: &AppState,
    session: attendance_session::Model,
    message: &str,
) -> ApiResult<SessionResponse> {
    emit::session_updated(state.ws(), payload::SessionUpdated::from(&session)).await;
    match db::models::attendance_record::Model::count_for_session(state.db(), session.id).await {
        Ok(count) => ok(StatusCode::OK, SessionResponse::new(session, count), message),
        Err(e) => db_error(e),
    }
}

/// PUT /sessions/{session_id}/status
///
/// ```json
/// { "active": false }
/// ```
pub async fn set_status(
    State(state): State<AppState>,
    Extension(session): Extension<attendance_session::Model>,
    Json(body): Json<SetStatusReq>,
) -> ApiResult<SessionResponse> {
    match session.set_active(state.db(), body.active).await {
        Ok(s) => {
            let msg = if s.active { "Session opened" } else { "Session closed" };
            respond_updated(&state, s, msg).await
        }
        Err(e) => db_error(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateLocationReq {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: Option<i32>,
}

/// PUT /sessions/{session_id}/location
///
/// Sets the geofence center; `radius_m` is optional and keeps the current value when omitted.
pub async fn update_location(
    State(state): State<AppState>,
    Extension(session): Extension<attendance_session::Model>,
    Json(body): Json<UpdateLocationReq>,
) -> ApiResult<SessionResponse> {
    if !geo::valid_coordinates(body.latitude, body.longitude) {
        return fail(StatusCode::BAD_REQUEST, "Invalid coordinates");
    }

    match session
        .set_location(state.db(), body.latitude, body.longitude, body.radius_m)
        .await
    {
        Ok(s) => respond_updated(&state, s, "Location updated").await,
        Err(e) => db_error(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct SetAttendanceReq {
    pub present: bool,
    pub student_name: Option<String>,
}

/// PUT /sessions/{session_id}/attendance/{student_id}
///
/// Manual override. `present: true` records the student (skipping location,
/// whitelist and device rules); `present: false` removes their record. Repeating
/// a request is harmless and reports `changed: false`.
pub async fn set_attendance(
    State(state): State<AppState>,
    Path((_, student_id)): Path<(i64, String)>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Extension(session): Extension<attendance_session::Model>,
    Json(body): Json<SetAttendanceReq>,
) -> ApiResult<Option<OverrideOutcome>> {
    let outcome = match manual_override::set_attendance(
        state.db(),
        claims.sub,
        session.id,
        &student_id,
        body.present,
        body.student_name,
    )
    .await
    {
        Ok(o) => o,
        Err(e) => return attendance_error(e),
    };

    if outcome.changed {
        match &outcome.record {
            Some(rec) if outcome.present => {
                emit::attendance_marked(
                    state.ws(),
                    payload::AttendanceMarked {
                        session_id: outcome.session_id,
                        record_id: rec.id,
                        student_id: rec.student_id.clone(),
                        student_name: rec.student_name.clone(),
                        checked_in_at: rec.checked_in_at.to_rfc3339(),
                        count: outcome.attendance_count,
                        method: "manual",
                    },
                )
                .await
            }
            _ => {
                emit::attendance_removed(
                    state.ws(),
                    payload::AttendanceRemoved {
                        session_id: outcome.session_id,
                        student_id: outcome.student_id.clone(),
                        count: outcome.attendance_count,
                    },
                )
                .await
            }
        }
    }

    let msg = match (outcome.present, outcome.changed) {
        (true, true) => "Student marked present",
        (true, false) => "Student was already present",
        (false, true) => "Student marked absent",
        (false, false) => "Student was already absent",
    };
    ok(StatusCode::OK, Some(outcome), msg)
}
