//! Client-side view of a backend job and its status classification.
//!
//! A [`Job`] is a read-only snapshot returned by `GET /jobs/{id}`. Only
//! `status` and `errorMessage` carry meaning for the tracker; every other
//! field the backend sends is kept verbatim in [`Job::payload`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Message used when a failed job carries no error message of its own.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Job failed";

/// Wire format of the backend's `LocalDateTime` fields.
const BACKEND_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

// ---------------------------------------------------------------------------
// JobStatus
// ---------------------------------------------------------------------------

/// Status string reported by the backend for a job.
///
/// The backend is inconsistent about naming (`SUCCEEDED` vs `COMPLETED`,
/// `RUNNING` vs `GENERATING`), so all spellings are accepted. Unknown
/// strings are preserved in [`JobStatus::Other`] rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Pending,
    Running,
    Generating,
    Succeeded,
    Completed,
    Failed,
    Canceled,
    Other(String),
}

/// How the tracker treats an observed status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPhase {
    /// Not terminal yet -- poll again.
    Continue,
    /// Terminal success.
    Succeeded,
    /// Terminal failure.
    Failed,
    /// Terminal: the job was canceled on the backend.
    Canceled,
}

impl JobStatus {
    /// Canonical wire spelling of this status.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Generating => "GENERATING",
            Self::Succeeded => "SUCCEEDED",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Canceled => "CANCELED",
            Self::Other(s) => s,
        }
    }

    /// Classify this status for polling purposes.
    ///
    /// Unrecognised statuses are treated as still in progress.
    pub fn phase(&self) -> StatusPhase {
        match self {
            Self::Succeeded | Self::Completed => StatusPhase::Succeeded,
            Self::Failed => StatusPhase::Failed,
            Self::Canceled => StatusPhase::Canceled,
            Self::Pending | Self::Running | Self::Generating | Self::Other(_) => {
                StatusPhase::Continue
            }
        }
    }

    /// Whether no further transitions are expected after this status.
    pub fn is_terminal(&self) -> bool {
        self.phase() != StatusPhase::Continue
    }
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "RUNNING" => Self::Running,
            "GENERATING" => Self::Generating,
            "SUCCEEDED" => Self::Succeeded,
            "COMPLETED" => Self::Completed,
            "FAILED" => Self::Failed,
            "CANCELED" | "CANCELLED" => Self::Canceled,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for JobStatus {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// A snapshot of a backend job as observed by one poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: DbId,
    pub status: JobStatus,
    /// Present only when the job failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Every other field the backend sent, untouched.
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

impl Job {
    /// Build a snapshot with an empty payload.
    pub fn new(id: DbId, status: impl Into<JobStatus>) -> Self {
        Self {
            id,
            status: status.into(),
            error_message: None,
            payload: serde_json::Map::new(),
        }
    }

    /// Attach a backend error message.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Attach an opaque payload field.
    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }

    /// Message describing why the job failed.
    ///
    /// Falls back to [`DEFAULT_FAILURE_MESSAGE`] when the backend sent no
    /// message or an empty one.
    pub fn failure_message(&self) -> &str {
        match self.error_message.as_deref() {
            Some(msg) if !msg.is_empty() => msg,
            _ => DEFAULT_FAILURE_MESSAGE,
        }
    }

    /// Completion percentage (0-100), if the backend reports one.
    pub fn progress(&self) -> Option<i64> {
        self.payload.get("progress").and_then(|v| v.as_i64())
    }

    pub fn job_type(&self) -> Option<&str> {
        self.payload.get("jobType").and_then(|v| v.as_str())
    }

    pub fn project_id(&self) -> Option<DbId> {
        self.payload.get("projectId").and_then(|v| v.as_i64())
    }

    pub fn total_items(&self) -> Option<i64> {
        self.payload.get("totalItems").and_then(|v| v.as_i64())
    }

    pub fn done_items(&self) -> Option<i64> {
        self.payload.get("doneItems").and_then(|v| v.as_i64())
    }

    /// URL of the primary generated artifact.
    pub fn result_url(&self) -> Option<&str> {
        self.payload.get("resultUrl").and_then(|v| v.as_str())
    }

    /// All image URLs produced by a multi-image job (empty if none).
    pub fn all_image_urls(&self) -> Vec<&str> {
        self.payload
            .get("allImageUrls")
            .and_then(|v| v.as_array())
            .map(|urls| urls.iter().filter_map(|u| u.as_str()).collect())
            .unwrap_or_default()
    }

    /// Creation time as sent by the backend (zone-less local time).
    pub fn created_at(&self) -> Option<NaiveDateTime> {
        self.payload
            .get("createdAt")
            .and_then(|v| v.as_str())
            .and_then(|s| NaiveDateTime::parse_from_str(s, BACKEND_DATETIME_FORMAT).ok())
    }
}
