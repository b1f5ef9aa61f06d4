//! Background job scheduler.
//!
//! Registers the news and video scraper jobs on their cron schedules. Both
//! go through [`run_job`], so a scheduled run and an HTTP-triggered run of
//! the same job never overlap in this process.

use std::sync::Arc;

use solarhub_core::{AppConfig, SourceKind};
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::runner::{run_job, JobLocks, JobRunError};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    config: Arc<AppConfig>,
    locks: JobLocks,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let news_cron = config.news_cron.clone();
    let video_cron = config.video_cron.clone();
    register_job(
        &scheduler,
        SourceKind::News,
        &news_cron,
        pool.clone(),
        Arc::clone(&config),
        locks.clone(),
    )
    .await?;
    register_job(&scheduler, SourceKind::Video, &video_cron, pool, config, locks).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_job(
    scheduler: &JobScheduler,
    source: SourceKind,
    schedule: &str,
    pool: PgPool,
    config: Arc<AppConfig>,
    locks: JobLocks,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(schedule, move |_uuid, _lock| {
        let pool = pool.clone();
        let config = Arc::clone(&config);
        let locks = locks.clone();

        Box::pin(async move {
            tracing::info!(source = %source, "scheduler: starting run");
            match run_job(source, pool, &config, &locks).await {
                Ok(report) => tracing::info!(
                    source = %source,
                    inserted = report.total_inserted(),
                    failed = report.failed(),
                    "scheduler: {}",
                    report.message()
                ),
                Err(e @ JobRunError::InProgress(_)) => {
                    tracing::info!(source = %source, "scheduler: {e}");
                }
                Err(JobRunError::Ingest(e)) => {
                    tracing::error!(source = %source, error = %e, "scheduler: run failed");
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(source = %source, schedule, "scheduler: job registered");
    Ok(())
}
