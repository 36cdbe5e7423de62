use axum::{Extension, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use db::models::teacher;
use sea_orm::EntityTrait;
use serde::Serialize;
use util::state::AppState;

use crate::auth::AuthUser;
use crate::routes::common::{ApiResult, db_error, fail, ok};

#[derive(Debug, Serialize, Default)]
pub struct MeResponse {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// GET /auth/me
///
/// Returns the authenticated teacher. A token for a deleted account yields `404`.
pub async fn get_me(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> ApiResult<MeResponse> {
    match teacher::Entity::find_by_id(claims.sub).one(state.db()).await {
        Ok(Some(t)) => ok(
            StatusCode::OK,
            MeResponse {
                id: t.id,
                username: t.username,
                name: t.name,
                created_at: Some(t.created_at),
            },
            "Teacher fetched successfully",
        ),
        Ok(None) => fail(StatusCode::NOT_FOUND, "Teacher not found"),
        Err(e) => db_error(e),
    }
}

