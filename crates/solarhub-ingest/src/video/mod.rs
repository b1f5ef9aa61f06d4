//! Video source: paginated channel-uploads listing behind a metered API.

pub mod client;
pub mod harvest;
pub mod quota;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use solarhub_core::{MediaRecord, DEFAULT_LANGUAGE, YOUTUBE_PLATFORM};

use crate::error::IngestError;
use crate::types::BrandTarget;

pub use client::YoutubeClient;
pub use harvest::{harvest_uploads, Harvest};
pub use quota::QuotaBudget;

/// Resolves a channel id to its uploads playlist id (`UC…` → `UU…`).
///
/// Ids without the `UC` prefix are returned unchanged.
#[must_use]
pub fn uploads_playlist_id(channel_id: &str) -> String {
    let channel_id = channel_id.trim();
    match channel_id.strip_prefix("UC") {
        Some(rest) => format!("UU{rest}"),
        None => channel_id.to_string(),
    }
}

/// Watch URL for a video id.
#[must_use]
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// One upload from a playlist page, flattened from the API snippet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistItem {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub published_at: Option<DateTime<Utc>>,
    pub thumbnail_url: Option<String>,
}

impl PlaylistItem {
    /// Normalizes into a storable record for `brand`.
    ///
    /// Returns `None` when the title or video id is empty.
    #[must_use]
    pub fn to_record(&self, brand: &BrandTarget) -> Option<MediaRecord> {
        let title = self.title.trim();
        let video_id = self.video_id.trim();
        if title.is_empty() || video_id.is_empty() {
            return None;
        }
        Some(MediaRecord {
            brand_id: brand.id,
            title: title.to_string(),
            youtube_id: video_id.to_string(),
            full_url: watch_url(video_id),
            thumbnail_url: self.thumbnail_url.clone(),
            platform: YOUTUBE_PLATFORM.to_string(),
            published_at: self.published_at,
            language: DEFAULT_LANGUAGE.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistPage {
    pub items: Vec<PlaylistItem>,
    pub next_page_token: Option<String>,
}

/// Fetches one page of a playlist listing. Each call spends one unit of quota.
#[async_trait]
pub trait VideoFetcher: Send + Sync {
    async fn fetch_page(
        &self,
        playlist_id: &str,
        published_after: DateTime<Utc>,
        page_token: Option<&str>,
    ) -> Result<PlaylistPage, IngestError>;
}
