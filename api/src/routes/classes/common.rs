use chrono::{DateTime, Utc};
use db::models::class;
use serde::Serialize;

#[derive(Debug, Serialize, Default)]
pub struct ClassResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub student_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClassResponse {
    pub fn new(c: class::Model, student_count: i64) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            student_count,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}
