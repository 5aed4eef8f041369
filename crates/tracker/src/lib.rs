//! Asynchronous job lifecycle tracking.
//!
//! Given the id of a job the backend already accepted, [`JobTracker`]
//! polls its status until the job succeeds, fails or is canceled,
//! reporting every observed snapshot along the way. [`TrackerManager`]
//! runs many such sessions concurrently, broadcasts their progress as
//! [`JobEvent`]s and hands each caller a [`SessionOutcome`] for the
//! session's final event.

pub mod config;
pub mod error;
pub mod events;
pub mod manager;
pub mod provider;
pub mod tracker;

pub use config::TrackerConfig;
pub use error::TrackError;
pub use events::JobEvent;
pub use manager::{ManagerError, SessionOutcome, TrackerManager};
pub use provider::{JobStatusProvider, ProviderError};
pub use tracker::JobTracker;
