use chrono::{DateTime, Utc};
use serde::Serialize;
use solarhub_core::{AppConfig, SourceKind};
use solarhub_db::BrandRow;
use uuid::Uuid;

/// A brand selected for one invocation, with the checkpoint for the source
/// being ingested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandTarget {
    pub id: Uuid,
    pub name: String,
    pub youtube_channel_id: Option<String>,
    pub checkpoint: Option<DateTime<Utc>>,
}

impl BrandTarget {
    #[must_use]
    pub fn from_row(row: BrandRow, source: SourceKind) -> Self {
        let checkpoint = row.checkpoint(source);
        Self {
            id: row.id,
            name: row.name,
            youtube_channel_id: row.youtube_channel_id,
            checkpoint,
        }
    }
}

/// Per-job knobs for one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSettings {
    pub batch_size: u32,
    /// Lifetime of the per-brand in-progress lease.
    pub lease_ttl_secs: u64,
    /// Hard cap on video API calls per brand per run. Unused by news.
    pub api_call_limit_per_brand: u32,
}

impl IngestSettings {
    #[must_use]
    pub fn news(config: &AppConfig) -> Self {
        Self {
            batch_size: config.news_batch_size,
            lease_ttl_secs: config.lease_ttl_secs,
            api_call_limit_per_brand: config.youtube_api_call_limit_per_brand,
        }
    }

    #[must_use]
    pub fn video(config: &AppConfig) -> Self {
        Self {
            batch_size: config.video_batch_size,
            lease_ttl_secs: config.lease_ttl_secs,
            api_call_limit_per_brand: config.youtube_api_call_limit_per_brand,
        }
    }

    /// Same settings with a different batch size.
    #[must_use]
    pub fn with_batch_size(self, batch_size: u32) -> Self {
        Self { batch_size, ..self }
    }
}

/// Why video paging for a brand stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PagingStop {
    /// The listing had no further pages.
    Exhausted,
    /// The per-brand call cap was reached.
    CallCap,
    /// The API reported quota exhaustion or rate limiting.
    Throttled,
}

/// Terminal state of one brand in one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BrandOutcome {
    /// Fetched, filtered and written. `discarded` counts items dropped for a
    /// missing title or URL or, for video, a keyword miss. `checkpoint` is
    /// `None` when paging was cut short before any item came back.
    Persisted {
        fetched: usize,
        discarded: usize,
        duplicates: usize,
        inserted: usize,
        api_calls: u32,
        paging: Option<PagingStop>,
        checkpoint: Option<DateTime<Utc>>,
    },
    /// The fetch or parse failed; checkpoint unchanged.
    FetchFailed { error: String },
    /// A store write failed. `checkpoint` is set if it was still advanced.
    PersistFailed {
        error: String,
        checkpoint: Option<DateTime<Utc>>,
    },
    /// Another run holds this brand's lease.
    SkippedLeased,
    /// Video brand without a channel id; checkpoint moved to now.
    SkippedNoChannel { checkpoint: Option<DateTime<Utc>> },
}

impl BrandOutcome {
    #[must_use]
    pub fn inserted(&self) -> usize {
        match self {
            BrandOutcome::Persisted { inserted, .. } => *inserted,
            _ => 0,
        }
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            BrandOutcome::FetchFailed { .. } | BrandOutcome::PersistFailed { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandReport {
    pub brand_id: Uuid,
    pub brand_name: String,
    pub outcome: BrandOutcome,
}

/// Summary of one invocation of a scraper job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub source: SourceKind,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub brands: Vec<BrandReport>,
}

impl BatchReport {
    #[must_use]
    pub fn total_inserted(&self) -> usize {
        self.brands.iter().map(|b| b.outcome.inserted()).sum()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.brands.iter().filter(|b| b.outcome.is_failure()).count()
    }

    /// Human-readable summary returned to the trigger caller.
    #[must_use]
    pub fn message(&self) -> String {
        if self.brands.is_empty() {
            return match self.source {
                SourceKind::News => "No brands to process.".to_string(),
                SourceKind::Video => "No brands to process in this YouTube video batch.".to_string(),
            };
        }
        format!(
            "{} scraping task completed for {} brands ({} new records, {} failed).",
            self.source.label(),
            self.brands.len(),
            self.total_inserted(),
            self.failed(),
        )
    }
}
