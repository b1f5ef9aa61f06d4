use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Language tag stamped on every ingested record.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Platform label for video records.
pub const YOUTUBE_PLATFORM: &str = "youtube";

/// Anything keyed by `(brand_id, canonical_url)` for de-duplication.
pub trait ContentRecord {
    fn brand_id(&self) -> Uuid;
    fn canonical_url(&self) -> &str;
}

/// A news article found for a brand, normalized for storage in `news`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsRecord {
    pub brand_id: Uuid,
    pub title: String,
    /// Plain-text description, at most 300 characters.
    pub summary: Option<String>,
    /// Absolute article URL; half of the dedup key.
    pub full_content_url: String,
    /// Publisher label, e.g. `"Reuters"`. Defaults to `"Google News"`.
    pub source: String,
    pub published_at: Option<DateTime<Utc>>,
    pub language: String,
    pub preview_image_url: Option<String>,
}

impl ContentRecord for NewsRecord {
    fn brand_id(&self) -> Uuid {
        self.brand_id
    }

    fn canonical_url(&self) -> &str {
        &self.full_content_url
    }
}

/// A channel upload found for a brand, normalized for storage in `media`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub brand_id: Uuid,
    pub title: String,
    /// Platform-native video id.
    pub youtube_id: String,
    /// Watch URL; half of the dedup key.
    pub full_url: String,
    pub thumbnail_url: Option<String>,
    pub platform: String,
    pub published_at: Option<DateTime<Utc>>,
    pub language: String,
}

impl ContentRecord for MediaRecord {
    fn brand_id(&self) -> Uuid {
        self.brand_id
    }

    fn canonical_url(&self) -> &str {
        &self.full_url
    }
}
