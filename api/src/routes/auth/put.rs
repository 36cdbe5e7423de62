use axum::{Extension, Json, extract::State, http::StatusCode};
use db::models::teacher;
use sea_orm::EntityTrait;
use serde::Deserialize;
use util::state::AppState;
use validator::Validate;

use crate::auth::AuthUser;
use crate::routes::common::{ApiResult, db_error, fail, ok, validation_failed};

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

/// PUT /auth/password
///
/// - `200 OK` on success
/// - `400 Bad Request` if the current password is wrong or the new one is too short
pub async fn change_password(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<()> {
    if let Err(e) = req.validate() {
        return validation_failed(&e);
    }

    let db = state.db();
    let t = match teacher::Entity::find_by_id(claims.sub).one(db).await {
        Ok(Some(t)) => t,
        Ok(None) => return fail(StatusCode::NOT_FOUND, "Teacher not found"),
        Err(e) => return db_error(e),
    };

    if !t.verify_password(&req.current_password) {
        return fail(StatusCode::BAD_REQUEST, "Current password is incorrect");
    }

    match t.set_password(db, &req.new_password).await {
        Ok(_) => ok(StatusCode::OK, (), "Password updated"),
        Err(e) => db_error(e),
    }
}
