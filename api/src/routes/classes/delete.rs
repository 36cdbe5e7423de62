use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
};
use db::models::{class, student};
use util::state::AppState;

use crate::routes::common::{ApiResult, db_error, fail, ok};

/// DELETE /classes/{class_id}
///
/// Deletes the class and its roster. Linked sessions are kept but unlinked.
pub async fn delete_class(
    State(state): State<AppState>,
    Extension(class): Extension<class::Model>,
) -> ApiResult<()> {
    let class_id = class.id;
    match class.delete_with_roster(state.db()).await {
        Ok(()) => {
            tracing::info!(class_id, "Class deleted");
            ok(StatusCode::OK, (), "Class deleted")
        }
        Err(e) => db_error(e),
    }
}

/// DELETE /classes/{class_id}/students/{student_row_id}
pub async fn remove_student(
    State(state): State<AppState>,
    Path((_, student_row_id)): Path<(i64, i64)>,
    Extension(class): Extension<class::Model>,
) -> ApiResult<()> {
    match student::Model::remove(state.db(), class.id, student_row_id).await {
        Ok(true) => ok(StatusCode::OK, (), "Student removed"),
        Ok(false) => fail(StatusCode::NOT_FOUND, "Student not found"),
        Err(e) => db_error(e),
    }
}
