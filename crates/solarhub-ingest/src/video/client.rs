//! HTTP client for the YouTube Data API `playlistItems` endpoint.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use super::{PlaylistItem, PlaylistPage, VideoFetcher};
use crate::error::IngestError;
use crate::http::HttpSettings;
use crate::retry::retry_with_backoff;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";

/// Error reasons the API uses when the project's quota is spent.
const QUOTA_REASONS: &[&str] = &["quotaExceeded", "dailyLimitExceeded"];

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemsResponse {
    #[serde(default)]
    items: Vec<RawPlaylistItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPlaylistItem {
    snippet: Snippet,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Snippet {
    title: String,
    description: String,
    published_at: Option<DateTime<Utc>>,
    resource_id: ResourceId,
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ResourceId {
    video_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Thumbnails {
    high: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiErrorBody {
    message: String,
    errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiErrorDetail {
    reason: String,
}

impl From<RawPlaylistItem> for PlaylistItem {
    fn from(raw: RawPlaylistItem) -> Self {
        let Snippet {
            title,
            description,
            published_at,
            resource_id,
            thumbnails,
        } = raw.snippet;
        PlaylistItem {
            video_id: resource_id.video_id,
            title,
            description,
            published_at,
            thumbnail_url: thumbnails.high.or(thumbnails.default).map(|t| t.url),
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the uploads listing. Use [`YoutubeClient::new`] for production
/// or [`YoutubeClient::with_base_url`] to point at a mock server in tests.
pub struct YoutubeClient {
    client: Client,
    api_key: String,
    base_url: Url,
    page_size: u32,
    http: HttpSettings,
}

impl YoutubeClient {
    /// # Errors
    ///
    /// Returns [`IngestError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, page_size: u32, http: &HttpSettings) -> Result<Self, IngestError> {
        Self::with_base_url(api_key, page_size, http, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`IngestError::Http`] if the client cannot be built, or
    /// [`IngestError::Config`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        page_size: u32,
        http: &HttpSettings,
        base_url: &str,
    ) -> Result<Self, IngestError> {
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| IngestError::Config(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client: http.build_client()?,
            api_key: api_key.to_owned(),
            base_url,
            page_size: page_size.clamp(1, 50),
            http: http.clone(),
        })
    }

    fn playlist_url(
        &self,
        playlist_id: &str,
        published_after: DateTime<Utc>,
        page_token: Option<&str>,
    ) -> Result<Url, IngestError> {
        let mut url = self
            .base_url
            .join("playlistItems")
            .map_err(|e| IngestError::Config(format!("invalid playlistItems URL: {e}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("part", "snippet");
            pairs.append_pair("playlistId", playlist_id);
            pairs.append_pair("key", &self.api_key);
            pairs.append_pair("maxResults", &self.page_size.to_string());
            pairs.append_pair(
                "publishedAfter",
                &published_after.to_rfc3339_opts(SecondsFormat::Millis, true),
            );
            if let Some(token) = page_token {
                pairs.append_pair("pageToken", token);
            }
        }
        Ok(url)
    }

    async fn request_page(&self, url: &Url, playlist_id: &str) -> Result<PlaylistPage, IngestError> {
        // reqwest errors embed the request URL, which carries the API key.
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| IngestError::Http(e.without_url()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| IngestError::Http(e.without_url()))?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(IngestError::RateLimited {
                url: redact_key(url),
            });
        }
        if !status.is_success() {
            return Err(classify_api_error(status, &body));
        }

        let parsed: PlaylistItemsResponse =
            serde_json::from_str(&body).map_err(|e| IngestError::Deserialize {
                context: format!("playlistItems(playlistId={playlist_id})"),
                source: e,
            })?;

        Ok(PlaylistPage {
            items: parsed.items.into_iter().map(PlaylistItem::from).collect(),
            next_page_token: parsed.next_page_token,
        })
    }
}

#[async_trait]
impl VideoFetcher for YoutubeClient {
    async fn fetch_page(
        &self,
        playlist_id: &str,
        published_after: DateTime<Utc>,
        page_token: Option<&str>,
    ) -> Result<PlaylistPage, IngestError> {
        let url = self.playlist_url(playlist_id, published_after, page_token)?;
        tracing::debug!(playlist_id, url = %redact_key(&url), "requesting playlist page");
        retry_with_backoff(self.http.max_retries, self.http.backoff_base_ms, || {
            self.request_page(&url, playlist_id)
        })
        .await
    }
}

/// Maps a non-2xx API response to a quota error or a generic API error.
fn classify_api_error(status: StatusCode, body: &str) -> IngestError {
    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error)
        .unwrap_or_default();

    let quota_reason = detail
        .errors
        .iter()
        .any(|e| QUOTA_REASONS.contains(&e.reason.as_str()));
    if quota_reason || detail.message.to_lowercase().contains("quota") {
        return IngestError::QuotaExceeded(detail.message);
    }

    let message = if detail.message.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {}", detail.message)
    };
    IngestError::YoutubeApi(message)
}

/// URL with the `key` query parameter masked, for logs and errors.
fn redact_key(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "key" { "REDACTED".into() } else { v };
            (k.into_owned(), v.into_owned())
        })
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}
