//! One entry point for running a scraper job, shared by the HTTP trigger and
//! the scheduler.
//!
//! Overlapping runs of the same job inside this process are refused rather
//! than queued; the per-brand lease covers runs in other processes.

use std::sync::Arc;

use solarhub_core::{AppConfig, SourceKind};
use solarhub_ingest::{BatchReport, IngestError};
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::Mutex;

/// One lock per job kind.
#[derive(Debug, Clone, Default)]
pub struct JobLocks {
    news: Arc<Mutex<()>>,
    video: Arc<Mutex<()>>,
}

impl JobLocks {
    pub(crate) fn for_source(&self, source: SourceKind) -> &Arc<Mutex<()>> {
        match source {
            SourceKind::News => &self.news,
            SourceKind::Video => &self.video,
        }
    }
}

#[derive(Debug, Error)]
pub enum JobRunError {
    #[error("{} job already in progress; skipped", .0.as_str())]
    InProgress(SourceKind),
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

/// Runs one invocation of the `source` job unless one is already running.
pub async fn run_job(
    source: SourceKind,
    pool: PgPool,
    config: &AppConfig,
    locks: &JobLocks,
) -> Result<BatchReport, JobRunError> {
    let Ok(_guard) = locks.for_source(source).try_lock() else {
        tracing::warn!(source = %source, "job already in progress; skipped");
        return Err(JobRunError::InProgress(source));
    };

    let report = match source {
        SourceKind::News => solarhub_ingest::run_news_job(pool, config, None).await?,
        SourceKind::Video => solarhub_ingest::run_video_job(pool, config, None).await?,
    };
    Ok(report)
}
