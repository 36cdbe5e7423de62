use chrono::{DateTime, Utc};
use db::models::attendance_session;
use serde::Serialize;
use util::config;

#[derive(Debug, Serialize, Default)]
pub struct SessionResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub session_code: String,
    pub pin: String,
    pub active: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_m: i32,
    /// Radius actually enforced at check-in.
    pub effective_radius_m: i32,
    pub class_id: Option<i64>,
    pub attendance_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionResponse {
    pub fn new(s: attendance_session::Model, attendance_count: u64) -> Self {
        let effective_radius_m = s.effective_radius(config::default_radius_meters());
        Self {
            id: s.id,
            title: s.title,
            description: s.description,
            session_code: s.session_code,
            pin: s.pin,
            active: s.active,
            latitude: s.latitude,
            longitude: s.longitude,
            radius_m: s.radius_m,
            effective_radius_m,
            class_id: s.class_id,
            attendance_count,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}
