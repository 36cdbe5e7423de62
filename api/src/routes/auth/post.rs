use axum::{Json, extract::State, http::StatusCode};
use db::models::teacher;
use serde::{Deserialize, Serialize};
use util::state::AppState;
use validator::Validate;

use crate::auth::generate_jwt;
use crate::routes::common::{ApiResult, db_error, fail, is_unique_violation, ok, validation_failed};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        length(min = 3, message = "Username must be at least 3 characters"),
        regex(
            path = *USERNAME_REGEX,
            message = "Username may only contain letters, digits, '.', '_' and '-'"
        )
    )]
    pub username: String,

    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, Default)]
pub struct AuthResponse {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub token: String,
    pub expires_at: String,
}

lazy_static::lazy_static! {
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[A-Za-z0-9._-]+$").unwrap();
}

fn issue(t: teacher::Model) -> Result<AuthResponse, jsonwebtoken::errors::Error> {
    let (token, expires_at) = generate_jwt(t.id)?;
    Ok(AuthResponse {
        id: t.id,
        username: t.username,
        name: t.name,
        token,
        expires_at,
    })
}

/// POST /auth/register
///
/// ### Request Body
/// ```json
/// { "username": "msmith", "name": "Mary Smith", "password": "secret1" }
/// ```
///
/// ### Responses
/// - `201 Created` with `{ id, username, name, token, expires_at }`
/// - `400 Bad Request` (validation failure)
/// - `409 Conflict` (username taken)
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<AuthResponse> {
    let req = RegisterRequest {
        username: req.username.trim().to_owned(),
        name: req.name.trim().to_owned(),
        password: req.password,
    };
    if let Err(e) = req.validate() {
        return validation_failed(&e);
    }

    let created = teacher::Model::create(state.db(), &req.username, &req.name, &req.password).await;
    match created {
        Ok(t) => match issue(t) {
            Ok(body) => ok(StatusCode::CREATED, body, "Teacher registered successfully"),
            Err(e) => {
                tracing::error!(error = %e, "Token encoding failed");
                fail(StatusCode::INTERNAL_SERVER_ERROR, "Token encoding failed")
            }
        },
        Err(e) if is_unique_violation(&e) => fail(
            StatusCode::CONFLICT,
            "A teacher with this username already exists",
        ),
        Err(e) => db_error(e),
    }
}

/// POST /auth/login
///
/// ### Responses
/// - `200 OK` with `{ id, username, name, token, expires_at }`
/// - `401 Unauthorized` (unknown username or wrong password)
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<AuthResponse> {
    if let Err(e) = req.validate() {
        return validation_failed(&e);
    }

    match teacher::Model::verify_credentials(state.db(), &req.username, &req.password).await {
        Ok(Some(t)) => match issue(t) {
            Ok(body) => ok(StatusCode::OK, body, "Login successful"),
            Err(e) => {
                tracing::error!(error = %e, "Token encoding failed");
                fail(StatusCode::INTERNAL_SERVER_ERROR, "Token encoding failed")
            }
        },
        Ok(None) => {
            tracing::info!(username = %req.username, "Failed login attempt");
            fail(StatusCode::UNAUTHORIZED, "Invalid username or password")
        }
        Err(e) => db_error(e),
    }
}
