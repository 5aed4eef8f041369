//! The seam the tracker polls through.
//!
//! [`JobStatusProvider`] is implemented for the HTTP [`JobsApi`]; tests
//! supply scripted in-memory providers.

use std::sync::Arc;

use async_trait::async_trait;
use studio_client::JobsApi;
use studio_core::job::Job;
use studio_core::types::DbId;

/// Error returned by a provider call. Boxed so that the tracker can hand
/// the caller the exact error the provider produced.
pub type ProviderError = Box<dyn std::error::Error + Send + Sync>;

/// Source of job snapshots.
#[async_trait]
pub trait JobStatusProvider: Send + Sync {
    /// Read the current snapshot of a job.
    async fn get_job_status(&self, job_id: DbId) -> Result<Job, ProviderError>;

    /// Ask the backend to cancel a job.
    async fn cancel_job(&self, job_id: DbId) -> Result<(), ProviderError>;
}

#[async_trait]
impl JobStatusProvider for JobsApi {
    async fn get_job_status(&self, job_id: DbId) -> Result<Job, ProviderError> {
        Ok(self.get_job(job_id).await?)
    }

    async fn cancel_job(&self, job_id: DbId) -> Result<(), ProviderError> {
        Ok(JobsApi::cancel_job(self, job_id).await?)
    }
}

#[async_trait]
impl<P: JobStatusProvider + ?Sized> JobStatusProvider for Arc<P> {
    async fn get_job_status(&self, job_id: DbId) -> Result<Job, ProviderError> {
        (**self).get_job_status(job_id).await
    }

    async fn cancel_job(&self, job_id: DbId) -> Result<(), ProviderError> {
        (**self).cancel_job(job_id).await
    }
}
