//! Batch orchestration: select, fetch, filter, persist, checkpoint.
//!
//! Brands in a batch run one after another. Each brand reaches a terminal
//! [`BrandOutcome`] on its own; only selection and the existing-URL preload
//! can fail the whole run.

pub mod news;
pub mod video;

pub use news::run_news_batch;
pub use video::run_video_batch;

use solarhub_core::SourceKind;
use uuid::Uuid;

use crate::dedup::ExistingUrls;
use crate::error::IngestError;
use crate::store::ContentStore;
use crate::types::{BrandOutcome, BrandTarget};

/// Picks up to `batch_size` brands for `source`, stalest checkpoint first.
///
/// # Errors
///
/// Returns [`IngestError::Store`] if the selection query fails.
pub async fn select_batch<S>(
    store: &S,
    source: SourceKind,
    batch_size: u32,
) -> Result<Vec<BrandTarget>, IngestError>
where
    S: ContentStore + ?Sized,
{
    let brands = store.select_batch(source, batch_size).await?;
    tracing::info!(
        source = %source,
        batch_size,
        selected = brands.len(),
        "selected brand batch"
    );
    Ok(brands)
}

/// Loads stored URLs for every brand in the batch in one query.
pub(crate) async fn preload_existing<S>(
    store: &S,
    source: SourceKind,
    brands: &[BrandTarget],
) -> Result<ExistingUrls, IngestError>
where
    S: ContentStore + ?Sized,
{
    let ids: Vec<Uuid> = brands.iter().map(|b| b.id).collect();
    let pairs = store.existing_urls(source, &ids).await?;
    tracing::debug!(source = %source, stored = pairs.len(), "preloaded existing URLs");
    Ok(ExistingUrls::from_pairs(pairs))
}

/// Takes the brand's lease. `Err` carries the outcome to report instead.
pub(crate) async fn acquire_lease<S>(
    store: &S,
    source: SourceKind,
    brand: &BrandTarget,
    ttl_secs: u64,
) -> Result<(), BrandOutcome>
where
    S: ContentStore + ?Sized,
{
    match store.try_acquire_lease(source, brand.id, ttl_secs).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(BrandOutcome::SkippedLeased),
        Err(e) => Err(BrandOutcome::PersistFailed {
            error: format!("lease acquisition failed: {e}"),
            checkpoint: None,
        }),
    }
}

/// Releases the brand's lease. Failures are logged; the lease expires anyway.
pub(crate) async fn release_lease<S>(store: &S, source: SourceKind, brand: &BrandTarget)
where
    S: ContentStore + ?Sized,
{
    if let Err(e) = store.release_lease(source, brand.id).await {
        tracing::warn!(
            brand = %brand.name,
            brand_id = %brand.id,
            source = %source,
            error = %e,
            "failed to release lease; it will expire"
        );
    }
}

pub(crate) fn log_outcome(source: SourceKind, brand: &BrandTarget, outcome: &BrandOutcome) {
    match outcome {
        BrandOutcome::Persisted {
            fetched,
            discarded,
            duplicates,
            inserted,
            api_calls,
            paging,
            checkpoint,
        } => tracing::info!(
            brand = %brand.name,
            brand_id = %brand.id,
            source = %source,
            fetched,
            discarded,
            duplicates,
            inserted,
            api_calls,
            paging = ?paging,
            checkpoint = ?checkpoint,
            "brand processed"
        ),
        BrandOutcome::FetchFailed { error } => tracing::warn!(
            brand = %brand.name,
            brand_id = %brand.id,
            source = %source,
            error = %error,
            "fetch failed; checkpoint unchanged"
        ),
        BrandOutcome::PersistFailed { error, checkpoint } => tracing::error!(
            brand = %brand.name,
            brand_id = %brand.id,
            source = %source,
            error = %error,
            checkpoint = ?checkpoint,
            "persist failed"
        ),
        BrandOutcome::SkippedLeased => tracing::info!(
            brand = %brand.name,
            brand_id = %brand.id,
            source = %source,
            "skipped: another run holds the lease"
        ),
        BrandOutcome::SkippedNoChannel { checkpoint } => tracing::info!(
            brand = %brand.name,
            brand_id = %brand.id,
            checkpoint = ?checkpoint,
            "skipped: no YouTube channel id configured"
        ),
    }
}
