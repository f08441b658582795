pub mod attendance_repo;
pub mod class_repo;
pub mod event_repo;
pub mod fixtures;
pub mod progress_repo;
pub mod schema;
pub mod session_repo;
pub mod store;
pub mod util;
pub mod workout_repo;

pub use crate::store::DbStore;
