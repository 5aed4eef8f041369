use clap::{Parser, Subcommand};
use studio_core::page::DEFAULT_PAGE_SIZE;
use studio_core::types::DbId;

/// Inspect and track generation jobs on the studio backend
#[derive(Debug, Parser)]
#[command(name = "studio-jobs", version)]
pub struct Args {
    /// Backend base URL including the /api prefix (overrides STUDIO_API_BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Bearer token (overrides STUDIO_API_TOKEN)
    #[arg(long)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// print a job's current snapshot
    Status { job_id: DbId },

    /// list your jobs, newest first
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        size: u32,

        /// only jobs in this status, e.g. RUNNING
        #[arg(long)]
        status: Option<String>,

        /// only jobs of this type, e.g. GENERATE_VIDEO
        #[arg(long)]
        job_type: Option<String>,

        #[arg(long)]
        project_id: Option<DbId>,
    },

    /// poll a job until it finishes and print the final snapshot
    Track {
        job_id: DbId,

        /// delay between polls (overrides STUDIO_POLL_INTERVAL_MS)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: Option<u64>,
    },

    /// track several jobs at once, printing one JSON event per line
    Watch {
        #[arg(required = true)]
        job_ids: Vec<DbId>,
    },

    /// ask the backend to cancel a job
    Cancel { job_id: DbId },
}
