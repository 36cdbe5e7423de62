use serde::Serialize;

/// JSON envelope returned by every `/api` endpoint.
///
/// ```json
/// { "success": true, "data": { "id": 1, "title": "Lecture 3" }, "message": "Session created" }
/// ```
///
/// Error responses carry `success: false` and `T::default()` as `data`.
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            data: T::default(),
            message: message.into(),
        }
    }
}
