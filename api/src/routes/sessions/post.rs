use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use db::models::{
    allowed_student,
    attendance_session::{self, NewSession},
    class,
};
use serde::Deserialize;
use services::geo;
use util::{config, state::AppState};
use validator::Validate;

use super::common::SessionResponse;
use crate::auth::AuthUser;
use crate::routes::common::{
    ApiResult, db_error, fail, is_unique_violation, ok, validation_failed,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSessionReq {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    pub description: Option<String>,
    pub class_id: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_m: Option<i32>,
    pub active: Option<bool>,
}

/// POST /sessions
///
/// ### Request Body
/// ```json
/// { "title": "Lecture 3", "class_id": 2, "latitude": 24.71, "longitude": 46.67, "radius_m": 300 }
/// ```
///
/// Generates the join code and PIN. Sessions start active unless `active: false`.
/// A `class_id` must reference one of the caller's classes (`404` otherwise).
pub async fn create_session(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(body): Json<CreateSessionReq>,
) -> ApiResult<SessionResponse> {
    let body = CreateSessionReq {
        title: body.title.trim().to_owned(),
        ..body
    };
    if let Err(e) = body.validate() {
        return validation_failed(&e);
    }

    let (latitude, longitude) = match (body.latitude, body.longitude) {
        (Some(lat), Some(lon)) if geo::valid_coordinates(lat, lon) => (Some(lat), Some(lon)),
        (None, None) => (None, None),
        _ => {
            return fail(
                StatusCode::BAD_REQUEST,
                "Latitude and longitude must be given together and be valid",
            );
        }
    };

    let db = state.db();
    if let Some(class_id) = body.class_id {
        match class::Model::find_owned(db, claims.sub, class_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return fail(StatusCode::NOT_FOUND, "Class not found"),
            Err(e) => return db_error(e),
        }
    }

    let new = NewSession {
        teacher_id: claims.sub,
        title: body.title,
        description: body
            .description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty()),
        latitude,
        longitude,
        radius_m: body.radius_m.unwrap_or_else(config::default_radius_meters),
        class_id: body.class_id,
        active: body.active.unwrap_or(true),
    };

    match attendance_session::Model::create(db, new).await {
        Ok(s) => {
            tracing::info!(session_id = s.id, teacher_id = claims.sub, "Session created");
            ok(StatusCode::CREATED, SessionResponse::new(s, 0), "Session created")
        }
        Err(e) => db_error(e),
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AllowedStudentReq {
    #[validate(length(min = 1, message = "Student ID is required"))]
    pub student_id: String,
    pub student_name: Option<String>,
}

/// POST /sessions/{session_id}/allowed-students
///
/// - `201 Created`
/// - `409 Conflict` if the id is already on the list
pub async fn add_allowed_student(
    State(state): State<AppState>,
    Extension(session): Extension<attendance_session::Model>,
    Json(body): Json<AllowedStudentReq>,
) -> ApiResult<Option<allowed_student::Model>> {
    let body = AllowedStudentReq {
        student_id: body.student_id.trim().to_owned(),
        ..body
    };
    if let Err(e) = body.validate() {
        return validation_failed(&e);
    }

    match allowed_student::Model::add(state.db(), session.id, &body.student_id, body.student_name)
        .await
    {
        Ok(entry) => ok(StatusCode::CREATED, Some(entry), "Student added to allowed list"),
        Err(e) if is_unique_violation(&e) => {
            fail(StatusCode::CONFLICT, "Student is already on the allowed list")
        }
        Err(e) => db_error(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct BulkAllowedReq {
    pub students: Vec<AllowedStudentReq>,
}

/// POST /sessions/{session_id}/allowed-students/bulk
///
/// Blank ids and ids already listed are skipped. Returns the full list.
pub async fn add_allowed_students_bulk(
    State(state): State<AppState>,
    Extension(session): Extension<attendance_session::Model>,
    Json(body): Json<BulkAllowedReq>,
) -> ApiResult<Vec<allowed_student::Model>> {
    let entries: Vec<(String, Option<String>)> = body
        .students
        .into_iter()
        .map(|s| (s.student_id, s.student_name))
        .collect();

    let db = state.db();
    if let Err(e) = allowed_student::Model::add_many(db, session.id, &entries).await {
        return db_error(e);
    }
    match allowed_student::Model::list(db, session.id).await {
        Ok(list) => ok(StatusCode::OK, list, "Allowed students updated"),
        Err(e) => db_error(e),
    }
}
