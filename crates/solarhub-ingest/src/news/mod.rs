//! News source: search-feed fetcher and the parsers behind it.

pub mod client;
pub mod html;
pub mod rss;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use solarhub_core::{NewsRecord, DEFAULT_LANGUAGE};

use crate::error::IngestError;
use crate::text::{strip_html, truncate_chars};
use crate::types::BrandTarget;

pub use client::GoogleNewsClient;
pub use html::{CardSelectors, NewsHtmlParser};
pub use rss::RssFeedParser;

/// Maximum length of a stored summary, in characters.
pub const SUMMARY_MAX_CHARS: usize = 300;

/// Source label used when the feed does not name a publisher.
pub const DEFAULT_NEWS_SOURCE: &str = "Google News";

const PLACEHOLDER_IMAGE_BASE: &str = "https://placehold.co/600x400/EEE/31343C?text=";

/// One article as lifted from a feed or results page, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArticle {
    pub title: String,
    pub url: String,
    /// Raw description; may contain markup.
    pub description: Option<String>,
    pub source: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl ParsedArticle {
    /// Normalizes into a storable record for `brand`.
    ///
    /// Returns `None` when the title or URL is empty.
    #[must_use]
    pub fn into_record(self, brand: &BrandTarget) -> Option<NewsRecord> {
        let title = self.title.trim().to_string();
        let url = self.url.trim().to_string();
        if title.is_empty() || url.is_empty() {
            return None;
        }

        let summary = self
            .description
            .map(|d| truncate_chars(&strip_html(&d), SUMMARY_MAX_CHARS))
            .filter(|s| !s.is_empty());
        let source = self
            .source
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_NEWS_SOURCE.to_string());

        Some(NewsRecord {
            brand_id: brand.id,
            title,
            summary,
            full_content_url: url,
            source,
            published_at: self.published_at,
            language: DEFAULT_LANGUAGE.to_string(),
            preview_image_url: Some(placeholder_image_url(&brand.name)),
        })
    }
}

/// Placeholder preview image labelled with the brand name.
#[must_use]
pub fn placeholder_image_url(brand_name: &str) -> String {
    let encoded = utf8_percent_encode(brand_name, NON_ALPHANUMERIC);
    format!("{PLACEHOLDER_IMAGE_BASE}{encoded}")
}

/// Turns a response body into articles. One implementation per markup.
pub trait NewsParser: Send + Sync {
    /// # Errors
    ///
    /// Returns an [`IngestError`] if the body cannot be parsed at all.
    fn parse(&self, body: &str) -> Result<Vec<ParsedArticle>, IngestError>;
}

/// Parsed search results plus the number of HTTP requests spent on them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsFetch {
    pub articles: Vec<ParsedArticle>,
    /// Includes attempts repeated after a 429.
    pub requests: u32,
}

/// Fetches and parses the news search results for one brand.
#[async_trait]
pub trait NewsFetcher: Send + Sync {
    async fn fetch(&self, brand_name: &str) -> Result<NewsFetch, IngestError>;
}
