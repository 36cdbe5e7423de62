pub mod m202510010001_create_teachers;
pub mod m202510010002_create_classes;
pub mod m202510010003_create_attendance_sessions;
pub mod m202510010004_create_attendance_records;
