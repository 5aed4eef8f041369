use studio_core::types::DbId;

use crate::provider::ProviderError;

/// Ways a tracking session can end without a successful job.
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    /// A status fetch could not complete. Not retried.
    #[error("Failed to fetch status of job {job_id}: {source}")]
    Transport {
        job_id: DbId,
        #[source]
        source: ProviderError,
    },

    /// The backend reported the job as failed.
    #[error("Job {job_id} failed: {message}")]
    JobFailed { job_id: DbId, message: String },

    /// The backend reported the job as canceled.
    #[error("Job {job_id} was canceled")]
    JobCanceled { job_id: DbId },

    /// The session was stopped through its cancellation token.
    #[error("Tracking of job {job_id} was cancelled")]
    Cancelled { job_id: DbId },

    /// The poll interval was zero.
    #[error("Poll interval must be greater than zero")]
    InvalidInterval,
}
