//! `/classes` routes (teacher-scoped): classes, rosters and the attendance report.

pub mod common;
pub mod delete;
pub mod get;
pub mod post;
pub mod put;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
};
use util::state::AppState;

use crate::auth::guards::require_class_owner;
use delete::{delete_class, remove_student};
use get::{class_report, get_class, list_classes, list_students};
use post::{add_student, add_students_bulk, create_class};
use put::update_class;

pub fn classes_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_classes).post(create_class))
        .nest(
            "/{class_id}",
            class_item_routes().route_layer(from_fn_with_state(app_state, require_class_owner)),
        )
}

fn class_item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_class).put(update_class).delete(delete_class))
        .route("/students", get(list_students).post(add_student))
        .route("/students/bulk", post(add_students_bulk))
        .route("/students/{student_row_id}", delete(remove_student))
        .route("/report", get(class_report))
}
