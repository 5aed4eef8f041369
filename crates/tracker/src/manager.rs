//! Concurrent tracking of many jobs.
//!
//! [`TrackerManager`] spawns one tracking task per watched job. Each task
//! runs on a child of the manager's master cancellation token, so a job
//! can be stopped on its own or all of them at once during shutdown.
//!
//! Progress and outcomes are broadcast via a [`tokio::sync::broadcast`]
//! channel. Call [`TrackerManager::subscribe`] to receive them. A slow
//! subscriber can lag and miss events, so [`TrackerManager::watch`] also
//! hands back a [`SessionOutcome`] that always receives the session's
//! terminal event.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use studio_core::types::DbId;
use tokio::sync::{broadcast, oneshot, RwLock};
use tokio_util::sync::CancellationToken;

use crate::config::TrackerConfig;
use crate::events::JobEvent;
use crate::provider::JobStatusProvider;
use crate::tracker::JobTracker;

/// Broadcast channel capacity for job events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// How long shutdown waits for each session task to exit.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

type SessionMap = Arc<RwLock<HashMap<DbId, ManagedSession>>>;

/// Resolves with the terminal event of one session.
///
/// Errors only if the session task died without reporting.
pub type SessionOutcome = oneshot::Receiver<JobEvent>;

/// Owns the tracking sessions of every watched job.
pub struct TrackerManager<P> {
    tracker: Arc<JobTracker<P>>,
    sessions: SessionMap,
    event_tx: broadcast::Sender<JobEvent>,
    /// Master cancellation token -- cancelled during shutdown.
    cancel: CancellationToken,
}

/// Internal bookkeeping for a single session.
struct ManagedSession {
    task_handle: tokio::task::JoinHandle<()>,
    /// Per-session cancellation token (child of the master token).
    cancel: CancellationToken,
}

impl<P: JobStatusProvider + 'static> TrackerManager<P> {
    /// Create a manager polling through `provider`.
    ///
    /// Rejects a zero poll interval up front so no session can start
    /// with one.
    pub fn new(provider: P, config: TrackerConfig) -> Result<Arc<Self>, ManagerError> {
        if config.interval.is_zero() {
            return Err(ManagerError::InvalidInterval);
        }
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Arc::new(Self {
            tracker: Arc::new(JobTracker::new(provider, config)),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            event_tx,
            cancel: CancellationToken::new(),
        }))
    }

    /// Subscribe to job events.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.event_tx.subscribe()
    }

    /// IDs of the jobs currently being tracked.
    pub async fn watched_job_ids(&self) -> Vec<DbId> {
        let mut ids: Vec<DbId> = self.sessions.read().await.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Start tracking a job in the background.
    ///
    /// Every snapshot is broadcast as [`JobEvent::Progress`]; the session
    /// ends with exactly one terminal event, after it has been removed
    /// from [`watched_job_ids`](Self::watched_job_ids). That terminal event
    /// is broadcast and also delivered to the returned [`SessionOutcome`].
    pub async fn watch(&self, job_id: DbId) -> Result<SessionOutcome, ManagerError> {
        if self.cancel.is_cancelled() {
            return Err(ManagerError::ShutDown);
        }

        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&job_id) {
            return Err(ManagerError::AlreadyWatching(job_id));
        }

        let session_cancel = self.cancel.child_token();
        let cancel_clone = session_cancel.clone();
        let tracker = Arc::clone(&self.tracker);
        let sessions_ref = Arc::clone(&self.sessions);
        let event_tx = self.event_tx.clone();
        let (outcome_tx, outcome_rx) = oneshot::channel();

        let task_handle = tokio::spawn(async move {
            let progress_tx = event_tx.clone();
            let outcome = tracker
                .track(
                    job_id,
                    |job| {
                        let _ = progress_tx.send(JobEvent::Progress { job: job.clone() });
                    },
                    &cancel_clone,
                )
                .await;

            sessions_ref.write().await.remove(&job_id);
            let event = JobEvent::from_outcome(job_id, outcome);
            let _ = event_tx.send(event.clone());
            let _ = outcome_tx.send(event);
            tracing::info!(job_id, "Tracking session exited");
        });

        sessions.insert(
            job_id,
            ManagedSession {
                task_handle,
                cancel: session_cancel,
            },
        );
        Ok(outcome_rx)
    }

    /// Stop tracking a job locally. The backend job is left untouched.
    pub async fn stop(&self, job_id: DbId) -> Result<(), ManagerError> {
        let sessions = self.sessions.read().await;
        let session = sessions
            .get(&job_id)
            .ok_or(ManagerError::NotWatching(job_id))?;
        session.cancel.cancel();
        tracing::info!(job_id, "Stopping tracking session");
        Ok(())
    }

    /// Cancel the job on the backend, then stop tracking it if it was
    /// being watched.
    pub async fn cancel_job(&self, job_id: DbId) -> Result<(), ManagerError> {
        self.tracker
            .provider()
            .cancel_job(job_id)
            .await
            .map_err(|e| ManagerError::CancelFailed(e.to_string()))?;

        if let Some(session) = self.sessions.read().await.get(&job_id) {
            session.cancel.cancel();
        }
        Ok(())
    }

    /// Gracefully stop every session.
    ///
    /// Cancels the master token, then waits up to 5 seconds per task
    /// for a clean exit.
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down tracker manager");
        self.cancel.cancel();

        // Release the lock before awaiting: exiting tasks take it to
        // deregister themselves.
        let drained: Vec<(DbId, ManagedSession)> =
            self.sessions.write().await.drain().collect();
        for (job_id, session) in drained {
            tracing::info!(job_id, "Stopping tracking session");
            session.cancel.cancel();
            let _ = tokio::time::timeout(SHUTDOWN_GRACE, session.task_handle).await;
        }

        tracing::info!("Tracker manager shut down complete");
    }
}

/// Errors that can occur when interacting with the manager.
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    /// A session for this job is already running.
    #[error("Job {0} is already being watched")]
    AlreadyWatching(DbId),

    /// No session exists for this job.
    #[error("Job {0} is not being watched")]
    NotWatching(DbId),

    /// The backend refused or failed the cancellation request.
    #[error("Failed to cancel job: {0}")]
    CancelFailed(String),

    /// The configured poll interval was zero.
    #[error("Poll interval must be greater than zero")]
    InvalidInterval,

    /// The manager has been shut down.
    #[error("Tracker manager is shut down")]
    ShutDown,
}
