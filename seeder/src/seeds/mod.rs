pub mod class;
pub mod session;
pub mod teacher;

/// Login of the demo account every other seeder hangs its data off.
pub const DEMO_USERNAME: &str = "admin";
pub const DEMO_PASSWORD: &str = "admin123";
pub const DEMO_CLASS: &str = "CS101 Introduction to Programming";
