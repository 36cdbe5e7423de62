pub mod allowed_student;
pub mod attendance_record;
pub mod attendance_session;
pub mod class;
pub mod student;
pub mod teacher;
