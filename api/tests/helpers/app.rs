use api::auth::generate_jwt;
use axum::Router;
use db::{models::teacher, test_utils::setup_test_db};
use util::{state::AppState, ws::WebSocketManager};

/// Full router over a fresh in-memory database.
pub async fn make_test_app() -> (Router, AppState) {
    let state = AppState::new(setup_test_db().await, WebSocketManager::new());
    (api::app(state.clone()), state)
}

/// Creates a teacher and returns it with a bearer token.
pub async fn seed_teacher(state: &AppState, username: &str) -> (teacher::Model, String) {
    let t = teacher::Model::create(state.db(), username, "Test Teacher", "password123")
        .await
        .expect("Failed to create teacher");
    let (token, _) = generate_jwt(t.id).expect("Failed to sign token");
    (t, token)
}
