use sea_orm::DbErr;

/// Why a check-in, override or report could not be carried out.
///
/// Every variant except `Database` is an expected rejection that the caller
/// shows to the user. `Database` is an infrastructure fault.
#[derive(Debug, thiserror::Error)]
pub enum AttendanceError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Session is closed")]
    SessionClosed,

    #[error("Location is required for this session")]
    LocationRequired,

    #[error("You are {distance_m:.0} m away; the allowed radius is {radius_m} m")]
    OutOfRange { distance_m: f64, radius_m: i32 },

    #[error("Student is not enrolled in this class")]
    NotEnrolled,

    #[error("Student is not on the allowed list for this session")]
    NotWhitelisted,

    #[error("Attendance already recorded for this student")]
    AlreadyCheckedIn,

    #[error("Attendance already recorded from this device")]
    DeviceAlreadyUsed,

    #[error("{0}")]
    Invalid(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl AttendanceError {
    /// Short machine-readable tag, used in logs.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::SessionClosed => "session_closed",
            Self::LocationRequired => "location_required",
            Self::OutOfRange { .. } => "out_of_range",
            Self::NotEnrolled => "not_enrolled",
            Self::NotWhitelisted => "not_whitelisted",
            Self::AlreadyCheckedIn => "already_checked_in",
            Self::DeviceAlreadyUsed => "device_already_used",
            Self::Invalid(_) => "invalid",
            Self::Database(_) => "database",
        }
    }
}
