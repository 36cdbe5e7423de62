use db::models::{
    allowed_student,
    attendance_record::{self, NewRecord},
    attendance_session, student,
};
use sea_orm::{DatabaseConnection, SqlErr, TransactionTrait};
use serde::Serialize;
use tracing::info;

use crate::error::AttendanceError;

#[derive(Debug, Clone, Serialize)]
pub struct OverrideOutcome {
    pub session_id: i64,
    pub student_id: String,
    pub present: bool,
    /// `false` when the student was already in the requested state.
    pub changed: bool,
    pub record: Option<attendance_record::Model>,
    pub attendance_count: u64,
}

/// Marks a student present or absent by hand.
///
/// Skips the geofence, whitelist and device rules. For a class-linked session
/// the student must be on the roster and the roster name wins over `student_name`.
pub async fn set_attendance(
    db: &DatabaseConnection,
    teacher_id: i64,
    session_id: i64,
    student_id: &str,
    present: bool,
    student_name: Option<String>,
) -> Result<OverrideOutcome, AttendanceError> {
    let student_id = student_id.trim();
    if student_id.is_empty() {
        return Err(AttendanceError::Invalid("Student ID is required".into()));
    }

    let txn = db.begin().await?;
    let session = attendance_session::Model::find_owned(&txn, teacher_id, session_id)
        .await?
        .ok_or(AttendanceError::NotFound("Session"))?;

    let existing = attendance_record::Model::find_for_student(&txn, session.id, student_id).await?;

    let (changed, record) = if present {
        match existing {
            Some(r) => (false, Some(r)),
            None => {
                let (name, email) = match session.class_id {
                    Some(class_id) => {
                        let s = student::Model::find_in_roster(&txn, class_id, student_id)
                            .await?
                            .ok_or(AttendanceError::NotEnrolled)?;
                        (s.name, s.email)
                    }
                    None => (
                        fallback_name(&txn, session.id, student_id, student_name).await?,
                        None,
                    ),
                };
                let inserted = attendance_record::Model::insert(
                    &txn,
                    NewRecord {
                        session_id: session.id,
                        student_name: name,
                        student_id: student_id.to_owned(),
                        student_email: email,
                        ..Default::default()
                    },
                )
                .await
                .map_err(|e| match e.sql_err() {
                    Some(SqlErr::UniqueConstraintViolation(_)) => AttendanceError::AlreadyCheckedIn,
                    _ => AttendanceError::Database(e),
                })?;
                (true, Some(inserted))
            }
        }
    } else {
        let removed =
            attendance_record::Model::delete_for_student(&txn, session.id, student_id).await?;
        (removed, None)
    };

    let attendance_count = attendance_record::Model::count_for_session(&txn, session.id).await?;
    txn.commit().await?;

    if changed {
        info!(
            session_id = session.id,
            student_id = %student_id,
            present,
            "Attendance set manually"
        );
    }

    Ok(OverrideOutcome {
        session_id: session.id,
        student_id: student_id.to_owned(),
        present,
        changed,
        record,
        attendance_count,
    })
}

/// Given name, then the whitelist entry's name, then the identifier itself.
async fn fallback_name<C: sea_orm::ConnectionTrait>(
    db: &C,
    session_id: i64,
    student_id: &str,
    given: Option<String>,
) -> Result<String, AttendanceError> {
    if let Some(name) = given.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty()) {
        return Ok(name);
    }
    let listed = allowed_student::Model::list(db, session_id)
        .await?
        .into_iter()
        .find(|a| a.student_id == student_id)
        .and_then(|a| a.student_name);
    Ok(listed.unwrap_or_else(|| student_id.to_owned()))
}
