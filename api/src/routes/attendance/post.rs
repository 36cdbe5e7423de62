use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use services::AttendanceError;
use services::check_in::{self, CheckInRequest};
use util::state::AppState;

use crate::auth::ClientIp;
use crate::routes::common::{ApiResult, attendance_error, ok};
use crate::ws::attendance::{emit, payload};

#[derive(Debug, Deserialize)]
pub struct CheckInBody {
    pub session_code: String,
    pub student_name: String,
    pub student_id: String,
    pub student_email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Serialize, Default)]
pub struct CheckInResponse {
    pub session_title: String,
    pub student_id: String,
    pub checked_in_at: String,
    /// Rejection tag, e.g. `"out_of_range"`. Absent on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius_m: Option<i32>,
}

impl CheckInResponse {
    /// Structured details of a rejection, for clients that render them.
    fn rejected(e: &AttendanceError) -> Self {
        let mut data = Self::default();
        match e {
            AttendanceError::Database(_) => return data,
            AttendanceError::OutOfRange { distance_m, radius_m } => {
                data.distance_m = Some(distance_m.round());
                data.radius_m = Some(*radius_m);
            }
            _ => {}
        }
        data.reason = Some(e.tag());
        data
    }
}

/// POST /attendance/check-in
///
/// ### Request Body
/// ```json
/// {
///   "session_code": "9f2c...",
///   "student_name": "Ann Lee",
///   "student_id": "20231234",
///   "student_email": "ann@example.com",
///   "latitude": 24.7136,
///   "longitude": 46.6753
/// }
/// ```
///
/// ### Responses
/// - `201 Created` attendance recorded
/// - `400` missing fields / location required
/// - `403` closed, out of range, not enrolled, not whitelisted
///
/// Rejections carry `data.reason`; out-of-range ones also carry
/// `data.distance_m` (rounded) and `data.radius_m`.
/// - `404` unknown session code
/// - `409` already checked in (same id or name) / device already used
pub async fn check_in(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Json(body): Json<CheckInBody>,
) -> ApiResult<CheckInResponse> {
    let req = CheckInRequest {
        session_code: body.session_code,
        student_name: body.student_name,
        student_id: body.student_id,
        student_email: body.student_email,
        latitude: body.latitude,
        longitude: body.longitude,
        ip_address: ip,
    };

    match check_in::check_in(state.db(), req).await {
        Ok(outcome) => {
            let checked_in_at = outcome.record.checked_in_at.to_rfc3339();
            emit::attendance_marked(
                state.ws(),
                payload::AttendanceMarked {
                    session_id: outcome.session_id,
                    record_id: outcome.record.id,
                    student_id: outcome.record.student_id.clone(),
                    student_name: outcome.record.student_name.clone(),
                    checked_in_at: checked_in_at.clone(),
                    count: outcome.attendance_count,
                    method: "check_in",
                },
            )
            .await;

            ok(
                StatusCode::CREATED,
                CheckInResponse {
                    session_title: outcome.session_title,
                    student_id: outcome.record.student_id,
                    checked_in_at,
                    ..Default::default()
                },
                "Attendance recorded",
            )
        }
        Err(e) => {
            let details = CheckInResponse::rejected(&e);
            let (status, Json(mut body)) = attendance_error(e);
            body.data = details;
            (status, Json(body))
        }
    }
}
