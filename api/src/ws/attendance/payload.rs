use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SessionUpdated {
    pub session_id: i64,
    pub title: String,
    pub active: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_m: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceMarked {
    pub session_id: i64,
    pub record_id: i64,
    pub student_id: String,
    pub student_name: String,
    pub checked_in_at: String, // RFC3339
    pub count: u64,
    /// `"check_in"` or `"manual"`.
    pub method: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceRemoved {
    pub session_id: i64,
    pub student_id: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionDeleted {
    pub session_id: i64,
}

impl From<&db::models::attendance_session::Model> for SessionUpdated {
    fn from(s: &db::models::attendance_session::Model) -> Self {
        Self {
            session_id: s.id,
            title: s.title.clone(),
            active: s.active,
            latitude: s.latitude,
            longitude: s.longitude,
            radius_m: s.radius_m,
        }
    }
}
