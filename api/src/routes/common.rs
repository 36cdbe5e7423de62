use axum::{Json, http::StatusCode};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use services::AttendanceError;
use validator::ValidationErrors;

use crate::response::ApiResponse;

pub type ApiResult<T> = (StatusCode, Json<ApiResponse<T>>);

/// Joins every field message into one `; `-separated string.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| {
            errs.iter()
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn ok<T: Serialize>(status: StatusCode, data: T, message: impl Into<String>) -> ApiResult<T> {
    (status, Json(ApiResponse::success(data, message)))
}

pub fn fail<T: Serialize + Default>(status: StatusCode, message: impl Into<String>) -> ApiResult<T> {
    (status, Json(ApiResponse::error(message)))
}

pub fn validation_failed<T: Serialize + Default>(errors: &ValidationErrors) -> ApiResult<T> {
    fail(StatusCode::BAD_REQUEST, format_validation_errors(errors))
}

pub fn db_error<T: Serialize + Default>(e: DbErr) -> ApiResult<T> {
    tracing::error!(error = %e, "Database error");
    fail(StatusCode::INTERNAL_SERVER_ERROR, "Database error")
}

pub fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

pub fn status_for(e: &AttendanceError) -> StatusCode {
    match e {
        AttendanceError::NotFound(_) => StatusCode::NOT_FOUND,
        AttendanceError::SessionClosed
        | AttendanceError::OutOfRange { .. }
        | AttendanceError::NotEnrolled
        | AttendanceError::NotWhitelisted => StatusCode::FORBIDDEN,
        AttendanceError::AlreadyCheckedIn | AttendanceError::DeviceAlreadyUsed => {
            StatusCode::CONFLICT
        }
        AttendanceError::LocationRequired | AttendanceError::Invalid(_) => StatusCode::BAD_REQUEST,
        AttendanceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Single translation point from a rejected operation to an HTTP response.
pub fn attendance_error<T: Serialize + Default>(e: AttendanceError) -> ApiResult<T> {
    if let AttendanceError::Database(db) = e {
        return db_error(db);
    }
    fail(status_for(&e), e.to_string())
}
