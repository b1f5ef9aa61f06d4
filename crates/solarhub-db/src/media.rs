//! Database operations for the `media` table.

use chrono::{DateTime, Utc};
use solarhub_core::MediaRecord;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Returns every `(brand_id, full_url)` pair already stored for the given
/// brands, in one round-trip.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_media_urls_for_brands(
    pool: &PgPool,
    brand_ids: &[Uuid],
) -> Result<Vec<(Uuid, String)>, DbError> {
    if brand_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, (Uuid, String)>(
        "SELECT brand_id, full_url FROM media WHERE brand_id = ANY($1)",
    )
    .bind(brand_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Inserts `records` in a single statement, ignoring rows that collide with
/// `(brand_id, full_url)`. Returns the URLs that were actually inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn insert_media(pool: &PgPool, records: &[MediaRecord]) -> Result<Vec<String>, DbError> {
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let mut brand_ids: Vec<Uuid> = Vec::with_capacity(records.len());
    let mut titles: Vec<String> = Vec::with_capacity(records.len());
    let mut youtube_ids: Vec<String> = Vec::with_capacity(records.len());
    let mut urls: Vec<String> = Vec::with_capacity(records.len());
    let mut thumbnails: Vec<Option<String>> = Vec::with_capacity(records.len());
    let mut platforms: Vec<String> = Vec::with_capacity(records.len());
    let mut published: Vec<Option<DateTime<Utc>>> = Vec::with_capacity(records.len());
    let mut languages: Vec<String> = Vec::with_capacity(records.len());

    for record in records {
        brand_ids.push(record.brand_id);
        titles.push(record.title.clone());
        youtube_ids.push(record.youtube_id.clone());
        urls.push(record.full_url.clone());
        thumbnails.push(record.thumbnail_url.clone());
        platforms.push(record.platform.clone());
        published.push(record.published_at);
        languages.push(record.language.clone());
    }

    let inserted = sqlx::query_scalar::<_, String>(
        "INSERT INTO media \
             (brand_id, title, youtube_id, full_url, thumbnail_url, platform, published_at, \
              language) \
         SELECT * FROM UNNEST(\
              $1::uuid[], $2::text[], $3::text[], $4::text[], $5::text[], $6::text[], \
              $7::timestamptz[], $8::text[]) \
         ON CONFLICT (brand_id, full_url) DO NOTHING \
         RETURNING full_url",
    )
    .bind(&brand_ids)
    .bind(&titles)
    .bind(&youtube_ids)
    .bind(&urls)
    .bind(&thumbnails)
    .bind(&platforms)
    .bind(&published)
    .bind(&languages)
    .fetch_all(pool)
    .await?;

    Ok(inserted)
}
