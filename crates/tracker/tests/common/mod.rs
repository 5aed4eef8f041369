#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use studio_client::{ApiClient, ApiConfig, JobsApi};
use studio_core::job::{Job, JobStatus};
use studio_core::types::DbId;
use studio_tracker::{JobStatusProvider, ProviderError};
use tokio::time::Instant;

/// One scripted answer to a status fetch.
pub enum Step {
    Status(Job),
    /// Fail the fetch with a connection-refused I/O error.
    Fail(&'static str),
}

pub fn status(job_id: DbId, status: &str) -> Step {
    Step::Status(Job::new(job_id, status))
}

/// In-memory provider replaying a per-job script of answers.
///
/// Records fetch start times and flags any fetch that starts while
/// another fetch for the same job is still in flight.
#[derive(Default)]
pub struct ScriptedProvider {
    scripts: Mutex<HashMap<DbId, VecDeque<Step>>>,
    /// Returned once a job's script is exhausted.
    fallbacks: Mutex<HashMap<DbId, Job>>,
    latency: Duration,
    in_flight: Mutex<HashSet<DbId>>,
    overlaps: AtomicUsize,
    fetch_times: Mutex<HashMap<DbId, Vec<Instant>>>,
    cancel_calls: Mutex<Vec<DbId>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn script(self, job_id: DbId, steps: Vec<Step>) -> Self {
        self.scripts.lock().unwrap().insert(job_id, steps.into());
        self
    }

    /// Keep answering `status` after the script runs out.
    pub fn then_forever(self, job_id: DbId, status: &str) -> Self {
        self.fallbacks
            .lock()
            .unwrap()
            .insert(job_id, Job::new(job_id, status));
        self
    }

    pub fn calls(&self, job_id: DbId) -> usize {
        self.fetch_times(job_id).len()
    }

    pub fn fetch_times(&self, job_id: DbId) -> Vec<Instant> {
        self.fetch_times
            .lock()
            .unwrap()
            .get(&job_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn overlaps(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }

    pub fn cancel_calls(&self) -> Vec<DbId> {
        self.cancel_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobStatusProvider for ScriptedProvider {
    async fn get_job_status(&self, job_id: DbId) -> Result<Job, ProviderError> {
        if !self.in_flight.lock().unwrap().insert(job_id) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        self.fetch_times
            .lock()
            .unwrap()
            .entry(job_id)
            .or_default()
            .push(Instant::now());

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let step = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&job_id)
            .and_then(|steps| steps.pop_front());
        self.in_flight.lock().unwrap().remove(&job_id);

        match step {
            Some(Step::Status(job)) => Ok(job),
            Some(Step::Fail(msg)) => Err(Box::new(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                msg,
            ))),
            None => self
                .fallbacks
                .lock()
                .unwrap()
                .get(&job_id)
                .cloned()
                .ok_or_else(|| "script exhausted".into()),
        }
    }

    async fn cancel_job(&self, job_id: DbId) -> Result<(), ProviderError> {
        self.cancel_calls.lock().unwrap().push(job_id);
        Ok(())
    }
}

/// Shorthand for a snapshot with a status.
pub fn job(job_id: DbId, status: JobStatus) -> Job {
    Job::new(job_id, status)
}

/// Serve `router` on an ephemeral local port and return a jobs API
/// pointed at it.
pub async fn spawn_backend(router: Router) -> JobsApi {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    let client = ApiClient::new(ApiConfig {
        base_url: format!("http://{addr}/api"),
        ..Default::default()
    })
    .unwrap();
    JobsApi::new(client)
}
