//! Roster/record reconciliation.
//!
//! A student is `present` for a session iff a record exists with that session id
//! and the student's external identifier. Everything else is `absent`.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use db::models::{attendance_record, attendance_session, class, student};
use sea_orm::DatabaseConnection;
use serde::Serialize;

use crate::error::AttendanceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionColumn {
    pub id: i64,
    pub title: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentReportRow {
    pub student_row_id: i64,
    pub student_id: String,
    pub name: String,
    pub email: Option<String>,
    /// Keyed by session id; one entry per report column.
    pub attendance: BTreeMap<i64, AttendanceStatus>,
    pub present: u32,
    pub total: u32,
    pub percentage: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassReport {
    pub class_id: i64,
    pub class_name: String,
    /// Oldest first.
    pub sessions: Vec<SessionColumn>,
    /// Roster order.
    pub students: Vec<StudentReportRow>,
}

/// `round(present / total * 100)`, half rounding up, and 0 when there are no sessions.
pub fn percentage(present: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (present * 100 + total / 2) / total
}

fn present_keys(records: &[attendance_record::Model]) -> HashSet<(i64, &str)> {
    records
        .iter()
        .map(|r| (r.session_id, r.student_id.as_str()))
        .collect()
}

/// Builds the dense student x session matrix. `sessions` must already be in column order.
pub fn build_class_report(
    class: &class::Model,
    roster: &[student::Model],
    sessions: &[attendance_session::Model],
    records: &[attendance_record::Model],
) -> ClassReport {
    let present = present_keys(records);
    let total = sessions.len() as u32;

    let students = roster
        .iter()
        .map(|s| {
            let attendance: BTreeMap<i64, AttendanceStatus> = sessions
                .iter()
                .map(|session| {
                    let status = if present.contains(&(session.id, s.student_id.as_str())) {
                        AttendanceStatus::Present
                    } else {
                        AttendanceStatus::Absent
                    };
                    (session.id, status)
                })
                .collect();
            let present_count = attendance
                .values()
                .filter(|st| **st == AttendanceStatus::Present)
                .count() as u32;

            StudentReportRow {
                student_row_id: s.id,
                student_id: s.student_id.clone(),
                name: s.name.clone(),
                email: s.email.clone(),
                attendance,
                present: present_count,
                total,
                percentage: percentage(present_count, total),
            }
        })
        .collect();

    ClassReport {
        class_id: class.id,
        class_name: class.name.clone(),
        sessions: sessions
            .iter()
            .map(|s| SessionColumn {
                id: s.id,
                title: s.title.clone(),
                active: s.active,
                created_at: s.created_at,
            })
            .collect(),
        students,
    }
}

pub async fn class_report(
    db: &DatabaseConnection,
    teacher_id: i64,
    class_id: i64,
) -> Result<ClassReport, AttendanceError> {
    let class = class::Model::find_owned(db, teacher_id, class_id)
        .await?
        .ok_or(AttendanceError::NotFound("Class"))?;

    let roster = student::Model::roster(db, class.id).await?;
    let sessions = attendance_session::Model::list_for_class(db, class.id).await?;
    let ids: Vec<i64> = sessions.iter().map(|s| s.id).collect();
    let records = attendance_record::Model::for_sessions(db, &ids).await?;

    Ok(build_class_report(&class, &roster, &sessions, &records))
}

#[derive(Debug, Clone, Serialize)]
pub struct RosterEntry {
    pub student_row_id: i64,
    pub student_id: String,
    pub name: String,
    pub email: Option<String>,
    pub status: AttendanceStatus,
    pub record_id: Option<i64>,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RosterSummary {
    pub present: u32,
    pub absent: u32,
    pub total: u32,
    pub percentage: u32,
    /// Check-ins by students no longer on the roster; not part of `total`.
    pub unlisted: u32,
}

/// Attendance for one session.
///
/// Linked sessions list every roster student, plus any records left by
/// students removed from the roster since. Unlinked ones only have the raw
/// records, newest first, since there is nobody to mark absent.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SessionAttendance {
    Roster {
        session: attendance_session::Model,
        class_id: i64,
        students: Vec<RosterEntry>,
        unlisted: Vec<attendance_record::Model>,
        summary: RosterSummary,
    },
    Records {
        session: attendance_session::Model,
        records: Vec<attendance_record::Model>,
    },
}

pub fn build_session_roster(
    roster: &[student::Model],
    records: &[attendance_record::Model],
) -> (Vec<RosterEntry>, Vec<attendance_record::Model>, RosterSummary) {
    let by_student: HashMap<&str, &attendance_record::Model> = records
        .iter()
        .map(|r| (r.student_id.as_str(), r))
        .collect();

    let entries: Vec<RosterEntry> = roster
        .iter()
        .map(|s| {
            let record = by_student.get(s.student_id.as_str());
            RosterEntry {
                student_row_id: s.id,
                student_id: s.student_id.clone(),
                name: s.name.clone(),
                email: s.email.clone(),
                status: if record.is_some() {
                    AttendanceStatus::Present
                } else {
                    AttendanceStatus::Absent
                },
                record_id: record.map(|r| r.id),
                checked_in_at: record.map(|r| r.checked_in_at),
                latitude: record.and_then(|r| r.latitude),
                longitude: record.and_then(|r| r.longitude),
            }
        })
        .collect();

    let on_roster: HashSet<&str> = roster.iter().map(|s| s.student_id.as_str()).collect();
    let unlisted: Vec<attendance_record::Model> = records
        .iter()
        .filter(|r| !on_roster.contains(r.student_id.as_str()))
        .cloned()
        .collect();

    let total = entries.len() as u32;
    let present = entries
        .iter()
        .filter(|e| e.status == AttendanceStatus::Present)
        .count() as u32;

    let summary = RosterSummary {
        present,
        absent: total - present,
        total,
        percentage: percentage(present, total),
        unlisted: unlisted.len() as u32,
    };
    (entries, unlisted, summary)
}

pub async fn session_attendance(
    db: &DatabaseConnection,
    teacher_id: i64,
    session_id: i64,
) -> Result<SessionAttendance, AttendanceError> {
    let session = attendance_session::Model::find_owned(db, teacher_id, session_id)
        .await?
        .ok_or(AttendanceError::NotFound("Session"))?;
    let records = attendance_record::Model::for_session(db, session.id).await?;

    match session.class_id {
        Some(class_id) => {
            let roster = student::Model::roster(db, class_id).await?;
            let (students, unlisted, summary) = build_session_roster(&roster, &records);
            Ok(SessionAttendance::Roster {
                session,
                class_id,
                students,
                unlisted,
                summary,
            })
        }
        None => Ok(SessionAttendance::Records { session, records }),
    }
}
