pub mod auth;
pub mod response;
pub mod routes;
pub mod ws;

use axum::{Router, middleware::from_fn};
use util::state::AppState;

/// Full application router: `/api` JSON endpoints, `/ws` live dashboard,
/// and request logging. CORS is layered on by the binary.
pub fn app(app_state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::routes(app_state.clone()))
        .nest("/ws", ws::ws_routes(app_state.clone()))
        .layer(from_fn(auth::middleware::log_request))
        .with_state(app_state)
}
