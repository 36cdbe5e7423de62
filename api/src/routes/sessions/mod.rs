//! `/sessions` routes (teacher-scoped).
//!
//! Collection routes only need a valid token. Everything under
//! `/sessions/{session_id}` additionally passes `require_session_owner`, which
//! loads the session into the request extensions.

pub mod common;
pub mod delete;
pub mod get;
pub mod post;
pub mod put;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use util::state::AppState;

use crate::auth::guards::require_session_owner;
use delete::{clear_location, delete_session, remove_allowed_student};
use get::{get_session, get_session_attendance, list_allowed_students, list_sessions};
use post::{add_allowed_student, add_allowed_students_bulk, create_session};
use put::{set_attendance, set_status, update_location};

pub fn sessions_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_sessions).post(create_session))
        .nest(
            "/{session_id}",
            session_item_routes()
                .route_layer(from_fn_with_state(app_state, require_session_owner)),
        )
}

fn session_item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_session).delete(delete_session))
        .route("/status", put(set_status))
        .route("/location", put(update_location).delete(clear_location))
        .route("/attendance", get(get_session_attendance))
        .route("/attendance/{student_id}", put(set_attendance))
        .route(
            "/allowed-students",
            get(list_allowed_students).post(add_allowed_student),
        )
        .route("/allowed-students/bulk", post(add_allowed_students_bulk))
        .route(
            "/allowed-students/{student_id}",
            axum::routing::delete(remove_allowed_student),
        )
}
