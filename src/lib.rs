pub mod config;
pub mod error;
pub mod meetup;
pub mod models;
pub mod pipeline;
pub mod sanitize;
pub mod snapshot;

pub use config::SnapshotConfig;
pub use error::{Result, SnapshotError};
pub use models::{NormalizedEvent, Venue};
pub use snapshot::Snapshot;
