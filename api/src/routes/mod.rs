//! HTTP route entry point for `/api/...`.
//!
//! Route groups:
//! - `/health` → health check (public)
//! - `/auth` → teacher registration, login, profile
//! - `/attendance` → student-facing verify + check-in (public)
//! - `/sessions` → session management, whitelist, manual attendance (teacher)
//! - `/classes` → classes, rosters and reports (teacher)

use crate::auth::guards::allow_authenticated;
use crate::routes::{
    attendance::attendance_routes, auth::auth_routes, classes::classes_routes,
    health::health_routes, sessions::sessions_routes,
};
use axum::{Router, middleware::from_fn};
use util::state::AppState;

pub mod attendance;
pub mod auth;
pub mod classes;
pub mod common;
pub mod health;
pub mod sessions;

/// Builds the `/api` router. Per-item ownership checks live inside the
/// session and class groups; the collection routes only need a valid token.
pub fn routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/health", health_routes())
        .nest("/auth", auth_routes())
        .nest("/attendance", attendance_routes())
        .nest(
            "/sessions",
            sessions_routes(app_state.clone()).route_layer(from_fn(allow_authenticated)),
        )
        .nest(
            "/classes",
            classes_routes(app_state).route_layer(from_fn(allow_authenticated)),
        )
}
