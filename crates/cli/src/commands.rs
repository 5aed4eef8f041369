use std::collections::BTreeSet;
use std::io::Write;
use std::time::Duration;

use anyhow::Context;
use serde::Serialize;
use studio_client::{ApiClient, ApiConfig, ConfigError, JobsApi};
use studio_core::job::JobStatus;
use studio_core::page::JobQuery;
use studio_core::types::DbId;
use studio_tracker::{JobEvent, JobTracker, TrackerConfig, TrackerManager};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::args::{Args, Command};

/// Execute one CLI invocation.
pub async fn run(args: Args) -> anyhow::Result<()> {
    let config = ApiConfig::from_env().context("Invalid API configuration")?;
    let config = apply_overrides(config, args.base_url.as_deref(), args.token)
        .context("Invalid --base-url")?;

    let api = JobsApi::new(ApiClient::new(config)?);
    tracing::debug!(base_url = %api.client().base_url(), "Loaded API configuration");

    let mut out = std::io::stdout();

    match args.command {
        Command::Status { job_id } => print_json(&mut out, &api.get_job(job_id).await?),
        Command::List {
            page,
            size,
            status,
            job_type,
            project_id,
        } => {
            let query = JobQuery {
                page,
                size,
                status: status.map(JobStatus::from),
                job_type,
                project_id,
            };
            print_json(&mut out, &api.list_jobs(&query).await?)
        }
        Command::Track {
            job_id,
            interval_ms,
        } => {
            let mut config = TrackerConfig::from_env().context("Invalid tracker configuration")?;
            if let Some(ms) = interval_ms {
                config.interval = Duration::from_millis(ms);
            }
            track(api, config, job_id, &interrupt_on_ctrl_c(), &mut out).await
        }
        Command::Watch { job_ids } => {
            let config = TrackerConfig::from_env().context("Invalid tracker configuration")?;
            watch(api, config, job_ids, &interrupt_on_ctrl_c(), &mut out).await
        }
        Command::Cancel { job_id } => cancel(&api, job_id, &mut out).await,
    }
}

/// Apply the `--base-url` and `--token` flags on top of `config`.
fn apply_overrides(
    config: ApiConfig,
    base_url: Option<&str>,
    token: Option<String>,
) -> Result<ApiConfig, ConfigError> {
    let mut config = match base_url {
        Some(base_url) => config.with_base_url(base_url)?,
        None => config,
    };
    if let Some(token) = token {
        config.token = Some(token);
    }
    Ok(config)
}

/// A token cancelled on the first Ctrl-C.
fn interrupt_on_ctrl_c() -> CancellationToken {
    let interrupt = CancellationToken::new();
    let token = interrupt.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, stopping");
            token.cancel();
        }
    });
    interrupt
}

/// Follow one job to completion; `interrupt` stops tracking (not the job).
async fn track(
    api: JobsApi,
    config: TrackerConfig,
    job_id: DbId,
    interrupt: &CancellationToken,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let tracker = JobTracker::new(api, config);

    let job = tracker
        .track(
            job_id,
            |job| {
                tracing::info!(
                    job_id = job.id,
                    job_type = job.job_type(),
                    project_id = job.project_id(),
                    status = %job.status,
                    progress = ?job.progress(),
                    done = ?job.done_items(),
                    total = ?job.total_items(),
                    "Job update",
                );
            },
            interrupt,
        )
        .await?;

    print_json(out, &job)
}

/// Track several jobs concurrently, streaming events as JSON lines.
///
/// Progress lines are best effort and may be skipped under load; every
/// job's final event is always written. Fails if any job did not
/// succeed, including jobs stopped by `interrupt`.
async fn watch(
    api: JobsApi,
    config: TrackerConfig,
    job_ids: Vec<DbId>,
    interrupt: &CancellationToken,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let manager = TrackerManager::new(api, config)?;
    let mut progress = manager.subscribe();

    let mut outcomes = JoinSet::new();
    for job_id in job_ids.into_iter().collect::<BTreeSet<_>>() {
        let outcome = manager.watch(job_id).await?;
        outcomes.spawn(async move { (job_id, outcome.await) });
    }

    let mut unsuccessful = 0usize;
    let mut interrupted = false;
    loop {
        tokio::select! {
            _ = interrupt.cancelled(), if !interrupted => {
                interrupted = true;
                manager.shutdown().await;
            }
            event = progress.recv() => match event {
                Ok(event) => write_progress(out, &event)?,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Progress stream lagged");
                }
                Err(RecvError::Closed) => break,
            },
            joined = outcomes.join_next() => {
                let Some(joined) = joined else { break };
                let (job_id, outcome) = joined.context("Outcome task panicked")?;
                let event = outcome.unwrap_or_else(|_| {
                    tracing::warn!(job_id, "Session ended without an outcome");
                    JobEvent::Stopped { job_id }
                });

                // Progress already queued belongs before this outcome.
                loop {
                    match progress.try_recv() {
                        Ok(queued) => write_progress(out, &queued)?,
                        Err(TryRecvError::Lagged(_)) => continue,
                        Err(_) => break,
                    }
                }

                write_json_line(out, &event)?;
                if !matches!(event, JobEvent::Succeeded { .. }) {
                    unsuccessful += 1;
                }
            }
        }
    }

    manager.shutdown().await;

    if unsuccessful > 0 {
        anyhow::bail!("{unsuccessful} job(s) did not succeed");
    }
    Ok(())
}

/// Ask the backend to cancel a job. A job that already finished is
/// reported, not treated as an error.
async fn cancel(api: &JobsApi, job_id: DbId, out: &mut impl Write) -> anyhow::Result<()> {
    match api.cancel_job(job_id).await {
        Ok(()) => writeln!(out, "Cancellation requested for job {job_id}")?,
        Err(e) if e.is_already_finished() => writeln!(out, "Job {job_id} already finished")?,
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Terminal events are written from the session outcomes instead.
fn write_progress(out: &mut impl Write, event: &JobEvent) -> anyhow::Result<()> {
    if let JobEvent::Progress { .. } = event {
        write_json_line(out, event)?;
    }
    Ok(())
}

fn write_json_line<T: Serialize>(out: &mut impl Write, value: &T) -> anyhow::Result<()> {
    writeln!(out, "{}", serde_json::to_string(value)?)?;
    Ok(())
}

fn print_json<T: Serialize>(out: &mut impl Write, value: &T) -> anyhow::Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}
