use axum::{Router, middleware::from_fn};
use util::state::AppState;

use crate::{auth::guards::allow_authenticated, ws::attendance::ws_attendance_routes};

pub mod attendance;
pub mod core;

/// `/ws/...` upgrade routes. Every socket needs a valid token (header or `?token=`).
pub fn ws_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/attendance", ws_attendance_routes(app_state))
        .route_layer(from_fn(allow_authenticated))
}
