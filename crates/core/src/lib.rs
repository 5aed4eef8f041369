//! Shared domain types for the studio jobs client.
//!
//! Holds the client-side view of a backend job, the status
//! classification used by the tracker, and the pagination/query types
//! of the job list endpoint.

pub mod error;
pub mod job;
pub mod page;
pub mod types;
