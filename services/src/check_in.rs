//! Check-in admission.
//!
//! A submission passes through a fixed chain of rules; the first failing rule
//! decides the rejection and nothing is written. The whole chain runs inside a
//! single transaction, and the `(session_id, student_id)` unique index closes the
//! window between the duplicate check and the insert.

use db::models::{
    allowed_student,
    attendance_record::{self, NewRecord},
    attendance_session, student,
};
use sea_orm::{ConnectionTrait, DatabaseConnection, SqlErr, TransactionTrait};
use serde::Serialize;
use tracing::info;
use util::config;

use crate::error::AttendanceError;
use crate::geo;

/// A student's submission, as received from the public form.
#[derive(Debug, Clone, Default)]
pub struct CheckInRequest {
    pub session_code: String,
    pub student_name: String,
    pub student_id: String,
    pub student_email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub ip_address: Option<String>,
}

/// Knobs that depend on deployment rather than on the session.
#[derive(Debug, Clone, Copy)]
pub struct AdmissionPolicy {
    pub default_radius_m: i32,
    pub enforce_device_check: bool,
}

impl AdmissionPolicy {
    pub fn from_config() -> Self {
        Self {
            default_radius_m: config::default_radius_meters(),
            enforce_device_check: config::enforce_device_check(),
        }
    }
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self {
            default_radius_m: 500,
            enforce_device_check: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckInOutcome {
    pub session_id: i64,
    pub session_title: String,
    pub record: attendance_record::Model,
    /// Records in the session after this one was added.
    pub attendance_count: u64,
}

/// What a student sees after scanning a code or typing a PIN.
#[derive(Debug, Clone, Serialize)]
pub struct SessionPreview {
    pub session_code: String,
    pub title: String,
    pub description: Option<String>,
    pub requires_location: bool,
}

impl From<&attendance_session::Model> for SessionPreview {
    fn from(s: &attendance_session::Model) -> Self {
        Self {
            session_code: s.session_code.clone(),
            title: s.title.clone(),
            description: s.description.clone(),
            requires_location: s.center().is_some(),
        }
    }
}

/// Resolves a scanned join code to an open session.
pub async fn verify_session(
    db: &DatabaseConnection,
    code: &str,
) -> Result<SessionPreview, AttendanceError> {
    let session = attendance_session::Model::find_by_code(db, code)
        .await?
        .ok_or(AttendanceError::NotFound("Session"))?;
    check_active(&session)?;
    Ok(SessionPreview::from(&session))
}

/// Resolves a typed PIN to an open session. Anything but digits is ignored.
pub async fn verify_pin(
    db: &DatabaseConnection,
    raw_pin: &str,
) -> Result<SessionPreview, AttendanceError> {
    let pin = normalize_pin(raw_pin);
    if pin.is_empty() {
        return Err(AttendanceError::NotFound("Session"));
    }
    let session = attendance_session::Model::find_by_pin(db, &pin)
        .await?
        .ok_or(AttendanceError::NotFound("Session"))?;
    check_active(&session)?;
    Ok(SessionPreview::from(&session))
}

pub fn normalize_pin(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Runs the admission chain with the configured policy.
pub async fn check_in(
    db: &DatabaseConnection,
    req: CheckInRequest,
) -> Result<CheckInOutcome, AttendanceError> {
    check_in_with_policy(db, req, AdmissionPolicy::from_config()).await
}

pub async fn check_in_with_policy(
    db: &DatabaseConnection,
    req: CheckInRequest,
    policy: AdmissionPolicy,
) -> Result<CheckInOutcome, AttendanceError> {
    let req = normalize_request(req)?;

    let result = admit(db, &req, policy).await;
    match &result {
        Ok(outcome) => info!(
            session_id = outcome.session_id,
            student_id = %req.student_id,
            "Check-in accepted"
        ),
        Err(AttendanceError::Database(e)) => {
            tracing::error!(code = %req.session_code, error = %e, "Check-in failed")
        }
        Err(e) => info!(
            code = %req.session_code,
            student_id = %req.student_id,
            reason = e.tag(),
            "Check-in rejected"
        ),
    }
    result
}

async fn admit(
    db: &DatabaseConnection,
    req: &CheckInRequest,
    policy: AdmissionPolicy,
) -> Result<CheckInOutcome, AttendanceError> {
    // Dropping the transaction on any early return rolls it back.
    let txn = db.begin().await?;

    let session = attendance_session::Model::find_by_code(&txn, &req.session_code)
        .await?
        .ok_or(AttendanceError::NotFound("Session"))?;

    check_active(&session)?;
    check_geofence(&session, req.latitude, req.longitude, policy.default_radius_m)?;
    check_eligibility(&txn, &session, &req.student_id).await?;

    let existing = attendance_record::Model::for_session(&txn, session.id).await?;
    check_duplicates(
        &existing,
        &req.student_id,
        &req.student_name,
        req.ip_address.as_deref().filter(|_| policy.enforce_device_check),
    )?;

    let record = attendance_record::Model::insert(
        &txn,
        NewRecord {
            session_id: session.id,
            student_name: req.student_name.clone(),
            student_id: req.student_id.clone(),
            student_email: req.student_email.clone(),
            latitude: req.latitude,
            longitude: req.longitude,
            ip_address: req.ip_address.clone(),
        },
    )
    .await
    .map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AttendanceError::AlreadyCheckedIn,
        _ => AttendanceError::Database(e),
    })?;

    let attendance_count = attendance_record::Model::count_for_session(&txn, session.id).await?;
    txn.commit().await?;

    Ok(CheckInOutcome {
        session_id: session.id,
        session_title: session.title,
        record,
        attendance_count,
    })
}

/// Trims identity fields and rejects submissions that cannot be evaluated.
fn normalize_request(mut req: CheckInRequest) -> Result<CheckInRequest, AttendanceError> {
    req.session_code = req.session_code.trim().to_owned();
    req.student_name = req.student_name.trim().to_owned();
    req.student_id = req.student_id.trim().to_owned();
    req.student_email = req
        .student_email
        .map(|e| e.trim().to_owned())
        .filter(|e| !e.is_empty());
    req.ip_address = req
        .ip_address
        .map(|ip| ip.trim().to_owned())
        .filter(|ip| !ip.is_empty());

    if req.session_code.is_empty() {
        return Err(AttendanceError::Invalid("Session code is required".into()));
    }
    if req.student_name.is_empty() {
        return Err(AttendanceError::Invalid("Student name is required".into()));
    }
    if req.student_id.is_empty() {
        return Err(AttendanceError::Invalid("Student ID is required".into()));
    }
    if let (Some(lat), Some(lon)) = (req.latitude, req.longitude) {
        if !geo::valid_coordinates(lat, lon) {
            return Err(AttendanceError::Invalid("Invalid coordinates".into()));
        }
    }
    Ok(req)
}

pub fn check_active(session: &attendance_session::Model) -> Result<(), AttendanceError> {
    if session.active {
        Ok(())
    } else {
        Err(AttendanceError::SessionClosed)
    }
}

/// Returns the measured distance when the session is geofenced.
pub fn check_geofence(
    session: &attendance_session::Model,
    latitude: Option<f64>,
    longitude: Option<f64>,
    default_radius_m: i32,
) -> Result<Option<f64>, AttendanceError> {
    let Some((center_lat, center_lon)) = session.center() else {
        return Ok(None);
    };
    let (Some(lat), Some(lon)) = (latitude, longitude) else {
        return Err(AttendanceError::LocationRequired);
    };

    let distance_m = geo::haversine_m(center_lat, center_lon, lat, lon);
    let radius_m = session.effective_radius(default_radius_m);
    if distance_m > f64::from(radius_m) {
        return Err(AttendanceError::OutOfRange {
            distance_m,
            radius_m,
        });
    }
    Ok(Some(distance_m))
}

/// Class roster when linked, otherwise the whitelist (empty admits everyone).
pub async fn check_eligibility<C: ConnectionTrait>(
    db: &C,
    session: &attendance_session::Model,
    student_id: &str,
) -> Result<(), AttendanceError> {
    if let Some(class_id) = session.class_id {
        return match student::Model::find_in_roster(db, class_id, student_id).await? {
            Some(_) => Ok(()),
            None => Err(AttendanceError::NotEnrolled),
        };
    }

    if !allowed_student::Model::any_for_session(db, session.id).await? {
        return Ok(());
    }
    if allowed_student::Model::is_allowed(db, session.id, student_id).await? {
        Ok(())
    } else {
        Err(AttendanceError::NotWhitelisted)
    }
}

/// Identity (id or case-insensitive name) first, then device.
///
/// `ip` is `None` when the device rule is off or the address is unknown.
pub fn check_duplicates(
    existing: &[attendance_record::Model],
    student_id: &str,
    student_name: &str,
    ip: Option<&str>,
) -> Result<(), AttendanceError> {
    let name = student_name.to_lowercase();
    if existing
        .iter()
        .any(|r| r.student_id == student_id || r.student_name.to_lowercase() == name)
    {
        return Err(AttendanceError::AlreadyCheckedIn);
    }

    if let Some(ip) = ip {
        if existing.iter().any(|r| r.ip_address.as_deref() == Some(ip)) {
            return Err(AttendanceError::DeviceAlreadyUsed);
        }
    }
    Ok(())
}
