//! Attendance rules shared by the API and the seeder.
//!
//! [`check_in`] decides whether a student submission becomes an attendance record,
//! [`report`] reconciles rosters against recorded check-ins, and
//! [`manual_override`] lets a teacher correct either by hand.

pub mod check_in;
pub mod error;
pub mod geo;
pub mod manual_override;
pub mod report;

pub use error::AttendanceError;
