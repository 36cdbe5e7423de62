//! `/auth` routes: teacher registration, login and profile.
//!
//! - `post.rs` → register, login
//! - `get.rs` → current teacher
//! - `put.rs` → password change

pub mod get;
pub mod post;
pub mod put;

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post, put},
};
use util::state::AppState;

use crate::auth::guards::allow_authenticated;
use get::get_me;
use post::{login, register};
use put::change_password;

/// - `POST /auth/register` → `register`
/// - `POST /auth/login` → `login`
/// - `GET /auth/me` → `get_me`
/// - `PUT /auth/password` → `change_password`
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(get_me).route_layer(from_fn(allow_authenticated)))
        .route(
            "/password",
            put(change_password).route_layer(from_fn(allow_authenticated)),
        )
}
