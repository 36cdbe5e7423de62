use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use services::check_in::{self, SessionPreview};
use util::state::AppState;

use crate::routes::common::{ApiResult, attendance_error, ok};

#[derive(Debug, Serialize, Default)]
pub struct PreviewResponse {
    pub valid: bool,
    pub session_code: String,
    pub title: String,
    pub description: Option<String>,
    pub requires_location: bool,
}

impl From<SessionPreview> for PreviewResponse {
    fn from(p: SessionPreview) -> Self {
        Self {
            valid: true,
            session_code: p.session_code,
            title: p.title,
            description: p.description,
            requires_location: p.requires_location,
        }
    }
}

/// GET /attendance/verify/{code}
///
/// Called after a QR scan.
///
/// - `200 OK` `{ valid: true, title, description, requires_location, session_code }`
/// - `404 Not Found` unknown code
/// - `403 Forbidden` session closed
pub async fn verify_session(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<PreviewResponse> {
    match check_in::verify_session(state.db(), &code).await {
        Ok(p) => ok(StatusCode::OK, p.into(), "Session is open"),
        Err(e) => attendance_error(e),
    }
}

/// GET /attendance/pin/{pin}
///
/// Same as `verify_session` but by typed PIN; non-digits are ignored, so
/// `123-456` and `123 456` both work. The response carries the join code the
/// client then submits with the check-in.
pub async fn verify_pin(
    State(state): State<AppState>,
    Path(pin): Path<String>,
) -> ApiResult<PreviewResponse> {
    match check_in::verify_pin(state.db(), &pin).await {
        Ok(p) => ok(StatusCode::OK, p.into(), "Session is open"),
        Err(e) => attendance_error(e),
    }
}
