//! Poll a single job until it reaches a terminal state.
//!
//! A session is one call to [`JobTracker::track`]: fetch immediately,
//! hand the snapshot to the progress callback, classify its status, and
//! either finish or sleep for the configured interval and fetch again.
//! Fetches within a session are strictly sequential. The cancellation
//! token is checked at both suspension points (the in-flight fetch and
//! the sleep), so a cancelled session never issues another request.

use studio_core::job::{Job, StatusPhase};
use studio_core::types::DbId;
use tokio_util::sync::CancellationToken;

use crate::config::TrackerConfig;
use crate::error::TrackError;
use crate::provider::JobStatusProvider;

/// Observes backend jobs through a [`JobStatusProvider`].
pub struct JobTracker<P> {
    provider: P,
    config: TrackerConfig,
}

impl<P: JobStatusProvider> JobTracker<P> {
    pub fn new(provider: P, config: TrackerConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Track `job_id` until it succeeds, invoking `on_progress` with every
    /// fetched snapshot (terminal ones included), in fetch order.
    ///
    /// Resolves with the first snapshot whose status is terminal-success.
    /// Fails with [`TrackError::JobFailed`] or [`TrackError::JobCanceled`]
    /// when the backend reports those states, with
    /// [`TrackError::Transport`] as soon as any fetch errors (the callback
    /// is not invoked for that fetch), and with [`TrackError::Cancelled`]
    /// once `cancel` fires.
    pub async fn track<F>(
        &self,
        job_id: DbId,
        mut on_progress: F,
        cancel: &CancellationToken,
    ) -> Result<Job, TrackError>
    where
        F: FnMut(&Job),
    {
        let interval = self.config.interval;
        if interval.is_zero() {
            return Err(TrackError::InvalidInterval);
        }

        tracing::info!(
            job_id,
            interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            "Tracking job",
        );

        let mut poll = 0u64;
        loop {
            poll = poll.saturating_add(1);

            let job = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(job_id, poll, "Job tracking cancelled");
                    return Err(TrackError::Cancelled { job_id });
                }
                result = self.provider.get_job_status(job_id) => match result {
                    Ok(job) => job,
                    Err(source) => {
                        tracing::warn!(job_id, poll, error = %source, "Job status fetch failed");
                        return Err(TrackError::Transport { job_id, source });
                    }
                }
            };

            tracing::debug!(job_id, poll, status = %job.status, "Observed job status");
            on_progress(&job);

            match job.status.phase() {
                StatusPhase::Succeeded => {
                    tracing::info!(job_id, poll, status = %job.status, "Job succeeded");
                    return Ok(job);
                }
                StatusPhase::Failed => {
                    let message = job.failure_message().to_string();
                    tracing::info!(job_id, poll, error = %message, "Job failed");
                    return Err(TrackError::JobFailed { job_id, message });
                }
                StatusPhase::Canceled => {
                    tracing::info!(job_id, poll, "Job was canceled on the backend");
                    return Err(TrackError::JobCanceled { job_id });
                }
                StatusPhase::Continue => {}
            }

            // Wait before the next poll, respecting cancellation.
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(job_id, poll, "Job tracking cancelled");
                    return Err(TrackError::Cancelled { job_id });
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }

    /// [`track`](Self::track) without a progress callback.
    pub async fn wait(&self, job_id: DbId, cancel: &CancellationToken) -> Result<Job, TrackError> {
        self.track(job_id, |_| {}, cancel).await
    }
}
