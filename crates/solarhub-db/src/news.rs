//! Database operations for the `news` table.

use chrono::{DateTime, Utc};
use solarhub_core::NewsRecord;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Returns every `(brand_id, full_content_url)` pair already stored for the
/// given brands, in one round-trip.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_news_urls_for_brands(
    pool: &PgPool,
    brand_ids: &[Uuid],
) -> Result<Vec<(Uuid, String)>, DbError> {
    if brand_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, (Uuid, String)>(
        "SELECT brand_id, full_content_url FROM news WHERE brand_id = ANY($1)",
    )
    .bind(brand_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Inserts `records` in a single statement, ignoring rows that collide with
/// `(brand_id, full_content_url)`.
///
/// Returns the URLs that were actually inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn insert_news(pool: &PgPool, records: &[NewsRecord]) -> Result<Vec<String>, DbError> {
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let mut brand_ids: Vec<Uuid> = Vec::with_capacity(records.len());
    let mut titles: Vec<String> = Vec::with_capacity(records.len());
    let mut summaries: Vec<Option<String>> = Vec::with_capacity(records.len());
    let mut urls: Vec<String> = Vec::with_capacity(records.len());
    let mut sources: Vec<String> = Vec::with_capacity(records.len());
    let mut published: Vec<Option<DateTime<Utc>>> = Vec::with_capacity(records.len());
    let mut languages: Vec<String> = Vec::with_capacity(records.len());
    let mut previews: Vec<Option<String>> = Vec::with_capacity(records.len());

    for record in records {
        brand_ids.push(record.brand_id);
        titles.push(record.title.clone());
        summaries.push(record.summary.clone());
        urls.push(record.full_content_url.clone());
        sources.push(record.source.clone());
        published.push(record.published_at);
        languages.push(record.language.clone());
        previews.push(record.preview_image_url.clone());
    }

    let inserted = sqlx::query_scalar::<_, String>(
        "INSERT INTO news \
             (brand_id, title, summary, full_content_url, source, published_at, language, \
              preview_image_url) \
         SELECT * FROM UNNEST(\
              $1::uuid[], $2::text[], $3::text[], $4::text[], $5::text[], $6::timestamptz[], \
              $7::text[], $8::text[]) \
         ON CONFLICT (brand_id, full_content_url) DO NOTHING \
         RETURNING full_content_url",
    )
    .bind(&brand_ids)
    .bind(&titles)
    .bind(&summaries)
    .bind(&urls)
    .bind(&sources)
    .bind(&published)
    .bind(&languages)
    .bind(&previews)
    .fetch_all(pool)
    .await?;

    Ok(inserted)
}
