use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use db::models::class;
use serde::Deserialize;
use util::state::AppState;

use super::common::ClassResponse;
use crate::routes::common::{ApiResult, db_error, fail, ok};

#[derive(Debug, Deserialize)]
pub struct UpdateClassReq {
    pub name: Option<String>,
    /// An empty string clears the description.
    pub description: Option<String>,
}

/// PUT /classes/{class_id}
pub async fn update_class(
    State(state): State<AppState>,
    Extension(class): Extension<class::Model>,
    Json(body): Json<UpdateClassReq>,
) -> ApiResult<ClassResponse> {
    let name = body.name.as_deref().map(str::trim);
    if name.is_some_and(str::is_empty) {
        return fail(StatusCode::BAD_REQUEST, "Name must not be empty");
    }
    let description = body
        .description
        .map(|d| Some(d.trim().to_owned()).filter(|d| !d.is_empty()));

    let db = state.db();
    let updated = match class.update(db, name, description).await {
        Ok(c) => c,
        Err(e) => return db_error(e),
    };
    match class::Model::student_counts(db, &[updated.id]).await {
        Ok(counts) => {
            let n = counts.get(&updated.id).copied().unwrap_or(0);
            ok(StatusCode::OK, ClassResponse::new(updated, n), "Class updated")
        }
        Err(e) => db_error(e),
    }
}
