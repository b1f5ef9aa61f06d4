use chrono::Utc;
use solarhub_core::{NewsRecord, SourceKind};

use super::{acquire_lease, log_outcome, preload_existing, release_lease, select_batch};
use crate::dedup::ExistingUrls;
use crate::error::IngestError;
use crate::news::{NewsFetch, NewsFetcher};
use crate::store::ContentStore;
use crate::types::{BatchReport, BrandOutcome, BrandReport, BrandTarget, IngestSettings};

/// Runs one news invocation over the stalest `settings.batch_size` brands.
///
/// A brand whose fetch fails keeps its checkpoint. Every other brand has its
/// checkpoint moved to now, including when the insert fails.
///
/// # Errors
///
/// Returns [`IngestError`] only if selecting the batch or preloading stored
/// URLs fails.
pub async fn run_news_batch<S, F>(
    store: &S,
    fetcher: &F,
    settings: &IngestSettings,
) -> Result<BatchReport, IngestError>
where
    S: ContentStore + ?Sized,
    F: NewsFetcher + ?Sized,
{
    let source = SourceKind::News;
    let started_at = Utc::now();
    let brands = select_batch(store, source, settings.batch_size).await?;

    if brands.is_empty() {
        tracing::info!("no brands to process in this news batch");
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
        let outcome = match acquire_lease(store, source, &brand, settings.lease_ttl_secs).await {
            Ok(()) => {
                let outcome = ingest_brand(store, fetcher, &brand, &mut existing).await;
                release_lease(store, source, &brand).await;
                outcome
            }
            Err(outcome) => outcome,
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
        "news batch completed"
    );
    Ok(report)
}

async fn ingest_brand<S, F>(
    store: &S,
    fetcher: &F,
    brand: &BrandTarget,
    existing: &mut ExistingUrls,
) -> BrandOutcome
where
    S: ContentStore + ?Sized,
    F: NewsFetcher + ?Sized,
{
    let NewsFetch { articles, requests } = match fetcher.fetch(&brand.name).await {
        Ok(fetch) => fetch,
        Err(e) => {
            return BrandOutcome::FetchFailed {
                error: e.to_string(),
            }
        }
    };

    let fetched = articles.len();
    let records: Vec<NewsRecord> = articles
        .into_iter()
        .filter_map(|article| {
            let record = article.into_record(brand);
            if record.is_none() {
                tracing::debug!(brand = %brand.name, "discarding article without title or URL");
            }
            record
        })
        .collect();
    let discarded = fetched - records.len();
    let (fresh, duplicates) = existing.retain_new(records);

    let inserted = if fresh.is_empty() {
        Ok(0)
    } else {
        store.insert_news(&fresh).await
    };

    // Best effort: the checkpoint moves even when the insert failed.
    let checkpoint = store
        .advance_checkpoint(SourceKind::News, brand.id, Utc::now())
        .await;

    match (inserted, checkpoint) {
        (Ok(inserted), Ok(checkpoint)) => {
            existing.extend(&fresh);
            BrandOutcome::Persisted {
                fetched,
                discarded,
                duplicates,
                inserted,
                api_calls: requests,
                paging: None,
                checkpoint: Some(checkpoint),
            }
        }
        (Err(e), checkpoint) => BrandOutcome::PersistFailed {
            error: e.to_string(),
            checkpoint: checkpoint.ok(),
        },
        (Ok(_), Err(e)) => BrandOutcome::PersistFailed {
            error: format!("checkpoint update failed: {e}"),
            checkpoint: None,
        },
    }
}
