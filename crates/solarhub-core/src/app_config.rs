use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Which news endpoint (and therefore which parser) the news job uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsFormat {
    /// Structured RSS feed (`/rss/search`).
    Rss,
    /// Search-results HTML page (`/search`), parsed card by card.
    Html,
}

/// Locale query parameters appended to the news search URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsLocale {
    pub hl: String,
    pub gl: String,
    pub ceid: String,
}

impl Default for NewsLocale {
    fn default() -> Self {
        Self {
            hl: "en-US".to_string(),
            gl: "US".to_string(),
            ceid: "US:en".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub api_keys: Vec<String>,
    pub youtube_api_key: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub news_batch_size: u32,
    pub video_batch_size: u32,
    pub news_format: NewsFormat,
    pub news_locale: NewsLocale,
    pub youtube_api_call_limit_per_brand: u32,
    pub youtube_page_size: u32,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub http_max_retries: u32,
    pub http_retry_backoff_base_ms: u64,
    pub lease_ttl_secs: u64,
    pub news_cron: String,
    pub video_cron: String,
    pub scheduler_enabled: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("api_keys", &format!("[{} redacted]", self.api_keys.len()))
            .field(
                "youtube_api_key",
                &self.youtube_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("news_batch_size", &self.news_batch_size)
            .field("video_batch_size", &self.video_batch_size)
            .field("news_format", &self.news_format)
            .field("news_locale", &self.news_locale)
            .field(
                "youtube_api_call_limit_per_brand",
                &self.youtube_api_call_limit_per_brand,
            )
            .field("youtube_page_size", &self.youtube_page_size)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("http_max_retries", &self.http_max_retries)
            .field(
                "http_retry_backoff_base_ms",
                &self.http_retry_backoff_base_ms,
            )
            .field("lease_ttl_secs", &self.lease_ttl_secs)
            .field("news_cron", &self.news_cron)
            .field("video_cron", &self.video_cron)
            .field("scheduler_enabled", &self.scheduler_enabled)
            .finish()
    }
}
