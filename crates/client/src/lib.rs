//! HTTP client for the studio backend's job endpoints.
//!
//! [`ApiClient`] implements the uniform request contract shared by
//! every backend call (base URL, timeout, bearer token, response
//! envelope). [`JobsApi`] wraps the `/jobs` endpoints on top of it.

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod jobs;

pub use client::ApiClient;
pub use config::{ApiConfig, ConfigError};
pub use error::ApiError;
pub use jobs::JobsApi;
