//! Lifecycle events emitted by the tracker manager.

use serde::Serialize;
use studio_core::job::Job;
use studio_core::types::DbId;

use crate::error::TrackError;

/// A state change observed by a managed tracking session.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobEvent {
    /// A snapshot was fetched (sent for every poll, terminal ones too).
    Progress { job: Job },

    /// The job succeeded. Carries the final snapshot.
    Succeeded { job: Job },

    /// The job failed on the backend.
    Failed { job_id: DbId, error: String },

    /// The job was canceled on the backend.
    Canceled { job_id: DbId },

    /// A status fetch failed and the session gave up.
    TransportFailed { job_id: DbId, error: String },

    /// The session was stopped locally before the job finished.
    Stopped { job_id: DbId },
}

impl JobEvent {
    /// The job this event concerns.
    pub fn job_id(&self) -> DbId {
        match self {
            Self::Progress { job } | Self::Succeeded { job } => job.id,
            Self::Failed { job_id, .. }
            | Self::Canceled { job_id }
            | Self::TransportFailed { job_id, .. }
            | Self::Stopped { job_id } => *job_id,
        }
    }

    /// Whether this is the last event of its session.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }

    /// The single terminal event describing how a session ended.
    pub fn from_outcome(job_id: DbId, outcome: Result<Job, TrackError>) -> Self {
        match outcome {
            Ok(job) => Self::Succeeded { job },
            Err(TrackError::JobFailed { message, .. }) => Self::Failed {
                job_id,
                error: message,
            },
            Err(TrackError::JobCanceled { .. }) => Self::Canceled { job_id },
            Err(TrackError::Cancelled { .. }) => Self::Stopped { job_id },
            Err(e @ (TrackError::Transport { .. } | TrackError::InvalidInterval)) => {
                Self::TransportFailed {
                    job_id,
                    error: e.to_string(),
                }
            }
        }
    }
}
