//! Production wiring for the two scraper jobs.
//!
//! Each call builds its own store, HTTP client and settings from
//! [`AppConfig`], runs one batch, and returns the report. Nothing is shared
//! between invocations beyond the database.

use solarhub_core::{AppConfig, SourceKind};
use sqlx::PgPool;

use crate::error::IngestError;
use crate::http::HttpSettings;
use crate::news::GoogleNewsClient;
use crate::pipeline::{run_news_batch, run_video_batch, select_batch};
use crate::relevance::RelevanceFilter;
use crate::store::PgContentStore;
use crate::types::{BatchReport, BrandTarget, IngestSettings};
use crate::video::YoutubeClient;

/// One news invocation against the configured search endpoint.
///
/// # Errors
///
/// Returns [`IngestError`] if the HTTP client cannot be built or the batch
/// cannot be selected.
pub async fn run_news_job(
    pool: PgPool,
    config: &AppConfig,
    batch_size: Option<u32>,
) -> Result<BatchReport, IngestError> {
    let store = PgContentStore::new(pool);
    let http = HttpSettings::from_app_config(config);
    let client = GoogleNewsClient::new(&http, config.news_format, config.news_locale.clone())?;
    let settings = settings_for(SourceKind::News, config, batch_size);

    tracing::info!(batch_size = settings.batch_size, format = ?config.news_format, "starting news job");
    run_news_batch(&store, &client, &settings).await
}

/// One video invocation against the uploads listing API.
///
/// # Errors
///
/// Returns [`IngestError::Config`] if `YOUTUBE_API_KEY` is unset, or any
/// error from building the client or selecting the batch.
pub async fn run_video_job(
    pool: PgPool,
    config: &AppConfig,
    batch_size: Option<u32>,
) -> Result<BatchReport, IngestError> {
    let api_key = youtube_api_key(config)?;
    let store = PgContentStore::new(pool);
    let http = HttpSettings::from_app_config(config);
    let client = YoutubeClient::new(api_key, config.youtube_page_size, &http)?;
    let settings = settings_for(SourceKind::Video, config, batch_size);

    tracing::info!(
        batch_size = settings.batch_size,
        call_limit = settings.api_call_limit_per_brand,
        "starting video job"
    );
    run_video_batch(&store, &client, &RelevanceFilter::default(), &settings).await
}

/// Brands the next invocation of `source` would pick, without fetching.
///
/// # Errors
///
/// Returns [`IngestError::Store`] if the selection query fails.
pub async fn preview_batch(
    pool: PgPool,
    config: &AppConfig,
    source: SourceKind,
    batch_size: Option<u32>,
) -> Result<Vec<BrandTarget>, IngestError> {
    let store = PgContentStore::new(pool);
    let settings = settings_for(source, config, batch_size);
    select_batch(&store, source, settings.batch_size).await
}

fn settings_for(source: SourceKind, config: &AppConfig, batch_size: Option<u32>) -> IngestSettings {
    let settings = match source {
        SourceKind::News => IngestSettings::news(config),
        SourceKind::Video => IngestSettings::video(config),
    };
    match batch_size {
        Some(n) => settings.with_batch_size(n),
        None => settings,
    }
}

fn youtube_api_key(config: &AppConfig) -> Result<&str, IngestError> {
    config
        .youtube_api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| IngestError::Config("YOUTUBE_API_KEY is not set".to_string()))
}
