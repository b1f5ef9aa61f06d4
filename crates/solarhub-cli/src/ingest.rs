//! `ingest` command handlers.
//!
//! Each handler runs exactly one batch, the same unit of work as one
//! scheduled or HTTP-triggered invocation, and prints the batch report.

use clap::Subcommand;
use solarhub_core::{AppConfig, SourceKind};
use solarhub_ingest::{BatchReport, BrandOutcome, BrandTarget};
use sqlx::PgPool;

/// Sub-commands available under `ingest`.
#[derive(Debug, Subcommand)]
pub enum IngestCommands {
    /// Fetch news for the stalest brands
    News {
        /// Override the configured batch size
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=1000))]
        batch_size: Option<u32>,

        /// Print the brands that would be processed without fetching
        #[arg(long)]
        dry_run: bool,
    },
    /// Fetch channel uploads for the stalest brands
    Video {
        /// Override the configured batch size
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=1000))]
        batch_size: Option<u32>,

        /// Print the brands that would be processed without fetching
        #[arg(long)]
        dry_run: bool,
    },
}

impl IngestCommands {
    fn parts(&self) -> (SourceKind, Option<u32>, bool) {
        match *self {
            IngestCommands::News {
                batch_size,
                dry_run,
            } => (SourceKind::News, batch_size, dry_run),
            IngestCommands::Video {
                batch_size,
                dry_run,
            } => (SourceKind::Video, batch_size, dry_run),
        }
    }
}

/// Runs one `ingest` sub-command.
///
/// # Errors
///
/// Returns an error only for failures that abort the whole batch: missing
/// configuration, or the brand selection itself failing.
pub async fn run(command: IngestCommands, pool: PgPool, config: &AppConfig) -> anyhow::Result<()> {
    let (source, batch_size, dry_run) = command.parts();

    if dry_run {
        let brands = solarhub_ingest::preview_batch(pool, config, source, batch_size).await?;
        print_preview(source, &brands);
        return Ok(());
    }

    let report = match source {
        SourceKind::News => solarhub_ingest::run_news_job(pool, config, batch_size).await?,
        SourceKind::Video => solarhub_ingest::run_video_job(pool, config, batch_size).await?,
    };
    print_report(&report);
    Ok(())
}

fn print_preview(source: SourceKind, brands: &[BrandTarget]) {
    if brands.is_empty() {
        println!("[dry-run] no brands would be processed for {source}");
        return;
    }
    println!("[dry-run] {} brand(s) would be processed for {source}:", brands.len());
    for brand in brands {
        let checkpoint = brand
            .checkpoint
            .map_or_else(|| "never".to_string(), |cp| cp.to_rfc3339());
        println!("  {:<40} last scraped: {checkpoint}", brand.name);
    }
}

fn print_report(report: &BatchReport) {
    println!("{}", report.message());
    for brand in &report.brands {
        println!("  {:<40} {}", brand.brand_name, describe(&brand.outcome));
    }
}

fn describe(outcome: &BrandOutcome) -> String {
    match outcome {
        BrandOutcome::Persisted {
            fetched,
            inserted,
            duplicates,
            api_calls,
            ..
        } => format!(
            "fetched {fetched}, inserted {inserted}, duplicates {duplicates}, api calls {api_calls}"
        ),
        BrandOutcome::FetchFailed { error } => format!("fetch failed: {error}"),
        BrandOutcome::PersistFailed { error, .. } => format!("persist failed: {error}"),
        BrandOutcome::SkippedLeased => "skipped (lease held elsewhere)".to_string(),
        BrandOutcome::SkippedNoChannel { .. } => "skipped (no channel id)".to_string(),
    }
}
