//! Wrappers for the `/jobs` endpoints.

use studio_core::job::Job;
use studio_core::page::{JobQuery, Page};
use studio_core::types::DbId;

use crate::client::ApiClient;
use crate::error::ApiError;

/// Job status, history and cancellation calls.
#[derive(Debug, Clone)]
pub struct JobsApi {
    client: ApiClient,
}

impl JobsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// The underlying client (shared pool and token).
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Fetch the current snapshot of a job.
    ///
    /// Sends `GET /jobs/{job_id}`.
    pub async fn get_job(&self, job_id: DbId) -> Result<Job, ApiError> {
        self.client.get(&format!("/jobs/{job_id}")).await
    }

    /// List the caller's jobs, newest first.
    ///
    /// Sends `GET /jobs` with the query's page, size and filters. The
    /// query is validated first so out-of-range pages never reach the
    /// backend.
    pub async fn list_jobs(&self, query: &JobQuery) -> Result<Page<Job>, ApiError> {
        query.validate()?;
        self.client.get_with_query("/jobs", query).await
    }

    /// Ask the backend to cancel a pending or running job.
    ///
    /// Sends `POST /jobs/{job_id}/cancel`. Jobs that already finished are
    /// rejected by the backend with a business error.
    pub async fn cancel_job(&self, job_id: DbId) -> Result<(), ApiError> {
        self.client
            .post::<()>(&format!("/jobs/{job_id}/cancel"))
            .await?;
        tracing::info!(job_id, "Job cancellation requested");
        Ok(())
    }
}
