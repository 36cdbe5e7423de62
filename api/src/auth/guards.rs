use crate::auth::claims::AuthUser;
use crate::response::ApiResponse;
use axum::{
    Json,
    body::Body,
    extract::{FromRequestParts, Path, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use db::models::{attendance_session, class};
use std::collections::HashMap;
use util::state::AppState;

#[derive(serde::Serialize, Default)]
pub struct Empty;

type GuardError = (StatusCode, Json<ApiResponse<Empty>>);

/// Helper to extract, validate user from request extensions and insert the back into the request
async fn extract_and_insert_authuser(
    req: Request<Body>,
) -> Result<(Request<Body>, AuthUser), GuardError> {
    let (mut parts, body) = req.into_parts();
    let user = AuthUser::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::error("Authentication required")),
            )
        })?;

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(user.clone());
    Ok((req, user))
}

fn path_id(params: &HashMap<String, String>, key: &str) -> Result<i64, GuardError> {
    params
        .get(key)
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(format!("Missing or invalid {key}"))),
        ))
}

fn not_found(what: &str) -> GuardError {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error(format!("{what} not found"))),
    )
}

fn internal(e: sea_orm::DbErr) -> GuardError {
    tracing::error!(error = %e, "DB error in ownership guard");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::error("Database error")),
    )
}

/// Basic guard to ensure the request is authenticated.
pub async fn allow_authenticated(req: Request<Body>, next: Next) -> Result<Response, GuardError> {
    let (req, _user) = extract_and_insert_authuser(req).await?;
    Ok(next.run(req).await)
}

/// Admits the teacher who owns `{session_id}` and hands the loaded session to
/// the handler as an `Extension<attendance_session::Model>`.
///
/// Sessions owned by someone else answer 404, same as missing ones.
pub async fn require_session_owner(
    State(app_state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, GuardError> {
    let (mut req, user) = extract_and_insert_authuser(req).await?;
    let session_id = path_id(&params, "session_id")?;

    let session = attendance_session::Model::find_owned(app_state.db(), user.0.sub, session_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found("Session"))?;

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

/// Class counterpart of [`require_session_owner`], keyed on `{class_id}`.
pub async fn require_class_owner(
    State(app_state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, GuardError> {
    let (mut req, user) = extract_and_insert_authuser(req).await?;
    let class_id = path_id(&params, "class_id")?;

    let class = class::Model::find_owned(app_state.db(), user.0.sub, class_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found("Class"))?;

    req.extensions_mut().insert(class);
    Ok(next.run(req).await)
}
