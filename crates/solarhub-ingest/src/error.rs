use solarhub_core::ConfigError;
use solarhub_db::DbError;
use thiserror::Error;

/// Errors raised while ingesting news or video content.
///
/// Only [`IngestError::Config`] and store failures during batch selection
/// abort an invocation; everything else is contained to one brand.
#[derive(Debug, Error)]
pub enum IngestError {
    /// A required setting is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] DbError),

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// HTTP 429 from an upstream host.
    #[error("rate limited by upstream: {url}")]
    RateLimited { url: String },

    /// The video API reported that the project's quota is used up.
    #[error("YouTube quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The video API returned an error envelope unrelated to quota.
    #[error("YouTube API error: {0}")]
    YoutubeApi(String),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid CSS selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },
}

impl From<ConfigError> for IngestError {
    fn from(err: ConfigError) -> Self {
        IngestError::Config(err.to_string())
    }
}

impl IngestError {
    /// `true` for upstream signals that mean "stop asking for now".
    #[must_use]
    pub fn is_throttle(&self) -> bool {
        matches!(
            self,
            IngestError::QuotaExceeded(_) | IngestError::RateLimited { .. }
        )
    }
}
