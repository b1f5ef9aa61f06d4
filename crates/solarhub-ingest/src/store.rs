//! Persistence seam for the pipeline.
//!
//! [`ContentStore`] is what the batch runners talk to; [`PgContentStore`]
//! backs it with the `solarhub-db` queries. Tests substitute an in-memory
//! implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use solarhub_core::{MediaRecord, NewsRecord, SourceKind};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::IngestError;
use crate::types::BrandTarget;

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Up to `limit` brands, stalest `source` checkpoint first.
    async fn select_batch(
        &self,
        source: SourceKind,
        limit: u32,
    ) -> Result<Vec<BrandTarget>, IngestError>;

    /// Stored `(brand_id, canonical_url)` pairs for `brand_ids`.
    async fn existing_urls(
        &self,
        source: SourceKind,
        brand_ids: &[Uuid],
    ) -> Result<Vec<(Uuid, String)>, IngestError>;

    /// Conflict-tolerant insert. Returns how many rows were written.
    async fn insert_news(&self, records: &[NewsRecord]) -> Result<usize, IngestError>;

    /// Conflict-tolerant insert. Returns how many rows were written.
    async fn insert_media(&self, records: &[MediaRecord]) -> Result<usize, IngestError>;

    /// Moves the checkpoint forward (never backward) and returns the stored value.
    async fn advance_checkpoint(
        &self,
        source: SourceKind,
        brand_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, IngestError>;

    async fn try_acquire_lease(
        &self,
        source: SourceKind,
        brand_id: Uuid,
        ttl_secs: u64,
    ) -> Result<bool, IngestError>;

    async fn release_lease(&self, source: SourceKind, brand_id: Uuid) -> Result<(), IngestError>;
}

/// [`ContentStore`] over a Postgres pool.
#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn select_batch(
        &self,
        source: SourceKind,
        limit: u32,
    ) -> Result<Vec<BrandTarget>, IngestError> {
        let rows = solarhub_db::list_brands_for_batch(&self.pool, source, i64::from(limit)).await?;
        Ok(rows
            .into_iter()
            .map(|row| BrandTarget::from_row(row, source))
            .collect())
    }

    async fn existing_urls(
        &self,
        source: SourceKind,
        brand_ids: &[Uuid],
    ) -> Result<Vec<(Uuid, String)>, IngestError> {
        let pairs = match source {
            SourceKind::News => solarhub_db::list_news_urls_for_brands(&self.pool, brand_ids).await?,
            SourceKind::Video => {
                solarhub_db::list_media_urls_for_brands(&self.pool, brand_ids).await?
            }
        };
        Ok(pairs)
    }

    async fn insert_news(&self, records: &[NewsRecord]) -> Result<usize, IngestError> {
        match solarhub_db::insert_news(&self.pool, records).await {
            Ok(inserted) => Ok(inserted.len()),
            Err(e) if e.is_unique_violation() => {
                tracing::warn!(error = %e, "news insert hit a unique constraint; treating as duplicates");
                Ok(0)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn insert_media(&self, records: &[MediaRecord]) -> Result<usize, IngestError> {
        match solarhub_db::insert_media(&self.pool, records).await {
            Ok(inserted) => Ok(inserted.len()),
            Err(e) if e.is_unique_violation() => {
                tracing::warn!(error = %e, "media insert hit a unique constraint; treating as duplicates");
                Ok(0)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn advance_checkpoint(
        &self,
        source: SourceKind,
        brand_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, IngestError> {
        Ok(solarhub_db::advance_checkpoint(&self.pool, source, brand_id, at).await?)
    }

    async fn try_acquire_lease(
        &self,
        source: SourceKind,
        brand_id: Uuid,
        ttl_secs: u64,
    ) -> Result<bool, IngestError> {
        Ok(solarhub_db::try_acquire_lease(&self.pool, source, brand_id, ttl_secs).await?)
    }

    async fn release_lease(&self, source: SourceKind, brand_id: Uuid) -> Result<(), IngestError> {
        Ok(solarhub_db::release_lease(&self.pool, source, brand_id).await?)
    }
}
