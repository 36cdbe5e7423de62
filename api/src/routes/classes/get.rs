use axum::{
    Extension,
    extract::State,
    http::StatusCode,
};
use db::models::{class, student};
use services::report::{self, ClassReport};
use util::state::AppState;

use super::common::ClassResponse;
use crate::auth::AuthUser;
use crate::routes::common::{ApiResult, attendance_error, db_error, ok};

/// GET /classes
///
/// The caller's classes, newest first, with roster sizes.
pub async fn list_classes(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> ApiResult<Vec<ClassResponse>> {
    let db = state.db();
    let classes = match class::Model::list_for_teacher(db, claims.sub).await {
        Ok(c) => c,
        Err(e) => return db_error(e),
    };
    let ids: Vec<i64> = classes.iter().map(|c| c.id).collect();
    let counts = match class::Model::student_counts(db, &ids).await {
        Ok(c) => c,
        Err(e) => return db_error(e),
    };

    let data = classes
        .into_iter()
        .map(|c| {
            let n = counts.get(&c.id).copied().unwrap_or(0);
            ClassResponse::new(c, n)
        })
        .collect();
    ok(StatusCode::OK, data, "Classes retrieved")
}

/// GET /classes/{class_id}
pub async fn get_class(
    State(state): State<AppState>,
    Extension(class): Extension<class::Model>,
) -> ApiResult<ClassResponse> {
    match class::Model::student_counts(state.db(), &[class.id]).await {
        Ok(counts) => {
            let n = counts.get(&class.id).copied().unwrap_or(0);
            ok(StatusCode::OK, ClassResponse::new(class, n), "Class retrieved")
        }
        Err(e) => db_error(e),
    }
}

/// GET /classes/{class_id}/students
pub async fn list_students(
    State(state): State<AppState>,
    Extension(class): Extension<class::Model>,
) -> ApiResult<Vec<student::Model>> {
    match student::Model::roster(state.db(), class.id).await {
        Ok(roster) => ok(StatusCode::OK, roster, "Students retrieved"),
        Err(e) => db_error(e),
    }
}

/// GET /classes/{class_id}/report
///
/// Dense student x session matrix over every session linked to the class.
///
/// ```json
/// {
///   "class_id": 1,
///   "class_name": "CS101",
///   "sessions": [{ "id": 4, "title": "Week 1", "active": false, "created_at": "..." }],
///   "students": [{
///     "student_id": "A", "name": "Ann",
///     "attendance": { "4": "present" },
///     "present": 1, "total": 1, "percentage": 100
///   }]
/// }
/// ```
pub async fn class_report(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Extension(class): Extension<class::Model>,
) -> ApiResult<Option<ClassReport>> {
    match report::class_report(state.db(), claims.sub, class.id).await {
        Ok(r) => ok(StatusCode::OK, Some(r), "Report generated"),
        Err(e) => attendance_error(e),
    }
}
