pub mod attendance;
pub mod classes;
pub mod clock;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod live;
pub mod progress;
pub mod scoring;
pub mod sessions;
pub mod store;
pub mod structure;
pub mod tracker;
pub mod workouts;

pub mod types;

pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::error::WodboardError;
pub use crate::live::{LiveClass, RequestContext};
pub use crate::store::Store;
