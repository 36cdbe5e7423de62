pub mod app;
pub mod ws;

pub use app::{make_test_app, seed_teacher};
pub use request::{body_json, get, json};
pub use ws::{connect_ws, spawn_server};
