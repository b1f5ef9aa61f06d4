use chrono::{DateTime, Duration, Utc};
use solarhub_core::{MediaRecord, SourceKind};

use super::{acquire_lease, log_outcome, preload_existing, release_lease, select_batch};
use crate::dedup::ExistingUrls;
use crate::error::IngestError;
use crate::relevance::RelevanceFilter;
use crate::store::ContentStore;
use crate::types::{BatchReport, BrandOutcome, BrandReport, BrandTarget, IngestSettings};
use crate::video::{harvest_uploads, uploads_playlist_id, QuotaBudget, VideoFetcher};

/// How far back a brand with no video checkpoint starts.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 3650;

/// Runs one video invocation over the stalest `settings.batch_size` brands.
///
/// # Errors
///
/// Returns [`IngestError`] only if selecting the batch or preloading stored
/// URLs fails. Per-brand failures land in the report.
pub async fn run_video_batch<S, F>(
    store: &S,
    fetcher: &F,
    relevance: &RelevanceFilter,
    settings: &IngestSettings,
) -> Result<BatchReport, IngestError>
where
    S: ContentStore + ?Sized,
    F: VideoFetcher + ?Sized,
{
    let source = SourceKind::Video;
    let started_at = Utc::now();
    let brands = select_batch(store, source, settings.batch_size).await?;

    if brands.is_empty() {
        tracing::info!("no brands to process in this YouTube video batch");
        return Ok(BatchReport {
            source,
            started_at,
            finished_at: Utc::now(),
            brands: Vec::new(),
        });
    }

    let mut existing = preload_existing(store, source, &brands).await?;
    let mut reports = Vec::with_capacity(brands.len());

    for brand in brands {
        let outcome = match brand.youtube_channel_id.as_deref().map(str::trim) {
            Some(channel_id) if !channel_id.is_empty() => {
                match acquire_lease(store, source, &brand, settings.lease_ttl_secs).await {
                    Ok(()) => {
                        let outcome = ingest_brand(
                            store,
                            fetcher,
                            relevance,
                            settings,
                            &brand,
                            channel_id,
                            &mut existing,
                        )
                        .await;
                        release_lease(store, source, &brand).await;
                        outcome
                    }
                    Err(outcome) => outcome,
                }
            }
            _ => skip_without_channel(store, &brand).await,
        };
        log_outcome(source, &brand, &outcome);
        reports.push(BrandReport {
            brand_id: brand.id,
            brand_name: brand.name,
            outcome,
        });
    }

    let report = BatchReport {
        source,
        started_at,
        finished_at: Utc::now(),
        brands: reports,
    };
    tracing::info!(
        brands = report.brands.len(),
        inserted = report.total_inserted(),
        failed = report.failed(),
        "video batch completed"
    );
    Ok(report)
}

/// Moves the checkpoint of a brand with no channel so it rotates to the back.
async fn skip_without_channel<S>(store: &S, brand: &BrandTarget) -> BrandOutcome
where
    S: ContentStore + ?Sized,
{
    match store
        .advance_checkpoint(SourceKind::Video, brand.id, Utc::now())
        .await
    {
        Ok(checkpoint) => BrandOutcome::SkippedNoChannel {
            checkpoint: Some(checkpoint),
        },
        Err(e) => BrandOutcome::PersistFailed {
            error: format!("checkpoint update failed: {e}"),
            checkpoint: None,
        },
    }
}

fn start_point(brand: &BrandTarget, now: DateTime<Utc>) -> DateTime<Utc> {
    brand
        .checkpoint
        .unwrap_or_else(|| now - Duration::days(DEFAULT_LOOKBACK_DAYS))
}

async fn ingest_brand<S, F>(
    store: &S,
    fetcher: &F,
    relevance: &RelevanceFilter,
    settings: &IngestSettings,
    brand: &BrandTarget,
    channel_id: &str,
    existing: &mut ExistingUrls,
) -> BrandOutcome
where
    S: ContentStore + ?Sized,
    F: VideoFetcher + ?Sized,
{
    let playlist_id = uploads_playlist_id(channel_id);
    let published_after = start_point(brand, Utc::now());
    let mut budget = QuotaBudget::new(settings.api_call_limit_per_brand);

    let harvest = match harvest_uploads(fetcher, &playlist_id, published_after, &mut budget).await
    {
        Ok(harvest) => harvest,
        Err(e) => {
            return BrandOutcome::FetchFailed {
                error: e.to_string(),
            }
        }
    };

    // Computed over everything retrieved, before the keyword filter.
    let target = harvest.checkpoint_target(Utc::now());

    let fetched = harvest.items.len();
    let records: Vec<MediaRecord> = harvest
        .items
        .iter()
        .filter(|item| relevance.is_relevant(&item.title, &item.description))
        .filter_map(|item| item.to_record(brand))
        .collect();
    let discarded = fetched - records.len();
    let (fresh, duplicates) = existing.retain_new(records);

    let inserted = if fresh.is_empty() {
        0
    } else {
        match store.insert_media(&fresh).await {
            Ok(n) => n,
            Err(e) => {
                return BrandOutcome::PersistFailed {
                    error: e.to_string(),
                    checkpoint: None,
                }
            }
        }
    };
    existing.extend(&fresh);

    let checkpoint = match target {
        Some(at) => match store.advance_checkpoint(SourceKind::Video, brand.id, at).await {
            Ok(checkpoint) => Some(checkpoint),
            Err(e) => {
                return BrandOutcome::PersistFailed {
                    error: format!("checkpoint update failed: {e}"),
                    checkpoint: None,
                }
            }
        },
        None => None,
    };

    BrandOutcome::Persisted {
        fetched,
        discarded,
        duplicates,
        inserted,
        api_calls: harvest.api_calls,
        paging: Some(harvest.stop),
        checkpoint,
    }
}
