//! Public, student-facing attendance routes. No token required.

pub mod get;
pub mod post;

use axum::{
    Router,
    routing::{get, post},
};
use util::state::AppState;

use get::{verify_pin, verify_session};
use post::check_in;

/// - `GET /attendance/verify/{code}` → `verify_session`
/// - `GET /attendance/pin/{pin}` → `verify_pin`
/// - `POST /attendance/check-in` → `check_in`
pub fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route("/verify/{code}", get(verify_session))
        .route("/pin/{pin}", get(verify_pin))
        .route("/check-in", post(check_in))
}
