use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use db::models::{class, student};
use serde::Deserialize;
use util::state::AppState;
use validator::Validate;

use super::common::ClassResponse;
use crate::auth::AuthUser;
use crate::routes::common::{ApiResult, db_error, fail, ok, validation_failed};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClassReq {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    pub description: Option<String>,
}

/// POST /classes
pub async fn create_class(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(body): Json<CreateClassReq>,
) -> ApiResult<ClassResponse> {
    let body = CreateClassReq {
        name: body.name.trim().to_owned(),
        description: body
            .description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty()),
    };
    if let Err(e) = body.validate() {
        return validation_failed(&e);
    }

    match class::Model::create(state.db(), claims.sub, &body.name, body.description).await {
        Ok(c) => ok(StatusCode::CREATED, ClassResponse::new(c, 0), "Class created"),
        Err(e) => db_error(e),
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddStudentReq {
    #[validate(length(min = 1, message = "Student ID is required"))]
    pub student_id: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

/// POST /classes/{class_id}/students
///
/// - `201 Created`
/// - `409 Conflict` if the student id is already on the roster
pub async fn add_student(
    State(state): State<AppState>,
    Extension(class): Extension<class::Model>,
    Json(body): Json<AddStudentReq>,
) -> ApiResult<Option<student::Model>> {
    let body = AddStudentReq {
        student_id: body.student_id.trim().to_owned(),
        name: body.name.trim().to_owned(),
        email: body.email.map(|e| e.trim().to_owned()).filter(|e| !e.is_empty()),
    };
    if let Err(e) = body.validate() {
        return validation_failed(&e);
    }

    let db = state.db();
    match student::Model::find_in_roster(db, class.id, &body.student_id).await {
        Ok(Some(_)) => {
            return fail(StatusCode::CONFLICT, "Student is already on the roster");
        }
        Ok(None) => {}
        Err(e) => return db_error(e),
    }

    match student::Model::create(db, class.id, &body.student_id, &body.name, body.email).await {
        Ok(s) => ok(StatusCode::CREATED, Some(s), "Student added"),
        Err(e) => db_error(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct BulkStudentsReq {
    pub students: Vec<student::NewStudent>,
}

/// POST /classes/{class_id}/students/bulk
///
/// Rows with a blank id or name, and ids already on the roster, are skipped.
/// Returns the full roster.
pub async fn add_students_bulk(
    State(state): State<AppState>,
    Extension(class): Extension<class::Model>,
    Json(body): Json<BulkStudentsReq>,
) -> ApiResult<Vec<student::Model>> {
    let db = state.db();
    let roster = match student::Model::roster(db, class.id).await {
        Ok(r) => r,
        Err(e) => return db_error(e),
    };

    let mut seen: std::collections::HashSet<String> =
        roster.into_iter().map(|s| s.student_id).collect();
    let fresh: Vec<student::NewStudent> = body
        .students
        .into_iter()
        .filter(|s| seen.insert(s.student_id.trim().to_owned()))
        .collect();

    if let Err(e) = student::Model::create_many(db, class.id, &fresh).await {
        return db_error(e);
    }
    match student::Model::roster(db, class.id).await {
        Ok(r) => ok(StatusCode::OK, r, "Students added"),
        Err(e) => db_error(e),
    }
}
