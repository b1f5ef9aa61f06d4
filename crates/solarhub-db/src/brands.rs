//! Database operations for the `brands` table.
//!
//! Each [`SourceKind`] owns a checkpoint column and a lease column on the
//! same row. Column names are resolved from a closed enum, never from input.

use chrono::{DateTime, Utc};
use solarhub_core::SourceKind;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `brands` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BrandRow {
    pub id: Uuid,
    pub name: String,
    pub youtube_channel_id: Option<String>,
    pub last_scraped_at: Option<DateTime<Utc>>,
    pub youtube_last_scraped_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl BrandRow {
    /// The checkpoint for `source`, or `None` if never scraped.
    #[must_use]
    pub fn checkpoint(&self, source: SourceKind) -> Option<DateTime<Utc>> {
        match source {
            SourceKind::News => self.last_scraped_at,
            SourceKind::Video => self.youtube_last_scraped_at,
        }
    }
}

const BRAND_COLUMNS: &str =
    "id, name, youtube_channel_id, last_scraped_at, youtube_last_scraped_at, created_at";

fn checkpoint_column(source: SourceKind) -> &'static str {
    match source {
        SourceKind::News => "last_scraped_at",
        SourceKind::Video => "youtube_last_scraped_at",
    }
}

fn lease_column(source: SourceKind) -> &'static str {
    match source {
        SourceKind::News => "news_lease_until",
        SourceKind::Video => "video_lease_until",
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns up to `limit` brands ordered by the `source` checkpoint ascending,
/// never-scraped brands first. Brands holding a live lease for `source` are
/// skipped.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_brands_for_batch(
    pool: &PgPool,
    source: SourceKind,
    limit: i64,
) -> Result<Vec<BrandRow>, DbError> {
    let checkpoint = checkpoint_column(source);
    let lease = lease_column(source);
    let sql = format!(
        "SELECT {BRAND_COLUMNS} \
         FROM brands \
         WHERE {lease} IS NULL OR {lease} < NOW() \
         ORDER BY {checkpoint} ASC NULLS FIRST, id \
         LIMIT $1"
    );

    let rows = sqlx::query_as::<_, BrandRow>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Returns a single brand by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_brand(pool: &PgPool, brand_id: Uuid) -> Result<Option<BrandRow>, DbError> {
    let sql = format!("SELECT {BRAND_COLUMNS} FROM brands WHERE id = $1");
    let row = sqlx::query_as::<_, BrandRow>(&sql)
        .bind(brand_id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Creates a brand and returns the inserted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn create_brand(
    pool: &PgPool,
    name: &str,
    youtube_channel_id: Option<&str>,
) -> Result<BrandRow, DbError> {
    let sql = format!(
        "INSERT INTO brands (name, youtube_channel_id) VALUES ($1, $2) RETURNING {BRAND_COLUMNS}"
    );
    let row = sqlx::query_as::<_, BrandRow>(&sql)
        .bind(name)
        .bind(youtube_channel_id)
        .fetch_one(pool)
        .await?;

    Ok(row)
}

/// Moves the `source` checkpoint forward to `at` and returns the stored value.
///
/// The update uses `GREATEST`, so an `at` older than the current checkpoint
/// leaves it unchanged.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no brand has `brand_id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn advance_checkpoint(
    pool: &PgPool,
    source: SourceKind,
    brand_id: Uuid,
    at: DateTime<Utc>,
) -> Result<DateTime<Utc>, DbError> {
    let column = checkpoint_column(source);
    let sql = format!(
        "UPDATE brands \
         SET {column} = GREATEST(COALESCE({column}, '-infinity'::timestamptz), $2), \
             updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {column}"
    );

    let stored = sqlx::query_scalar::<_, DateTime<Utc>>(&sql)
        .bind(brand_id)
        .bind(at)
        .fetch_optional(pool)
        .await?;

    stored.ok_or(DbError::NotFound)
}

/// Takes the in-progress lease on `brand_id` for `source` if nobody holds a
/// live one. Returns `false` when another run owns the brand.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn try_acquire_lease(
    pool: &PgPool,
    source: SourceKind,
    brand_id: Uuid,
    ttl_secs: u64,
) -> Result<bool, DbError> {
    let lease = lease_column(source);
    let sql = format!(
        "UPDATE brands \
         SET {lease} = NOW() + make_interval(secs => $2::float8) \
         WHERE id = $1 AND ({lease} IS NULL OR {lease} < NOW())"
    );

    #[allow(clippy::cast_precision_loss)] // lease TTLs are far below 2^52 seconds
    let ttl = ttl_secs as f64;
    let result = sqlx::query(&sql)
        .bind(brand_id)
        .bind(ttl)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}

/// Clears the `source` lease on `brand_id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn release_lease(
    pool: &PgPool,
    source: SourceKind,
    brand_id: Uuid,
) -> Result<(), DbError> {
    let lease = lease_column(source);
    let sql = format!("UPDATE brands SET {lease} = NULL WHERE id = $1");
    sqlx::query(&sql).bind(brand_id).execute(pool).await?;
    Ok(())
}
