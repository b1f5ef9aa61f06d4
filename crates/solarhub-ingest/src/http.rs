use std::time::Duration;

use reqwest::Client;
use solarhub_core::AppConfig;

use crate::error::IngestError;

/// Outbound HTTP settings shared by the news and video clients.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Extra attempts after an HTTP 429. Zero disables back-off.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "solarhub/0.1 (content-ingest)".to_string(),
            max_retries: 0,
            backoff_base_ms: 1_000,
        }
    }
}

impl HttpSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
            max_retries: config.http_max_retries,
            backoff_base_ms: config.http_retry_backoff_base_ms,
        }
    }

    /// Builds the `reqwest` client used for one invocation.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Http`] if the client cannot be constructed.
    pub fn build_client(&self) -> Result<Client, IngestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(self.user_agent.clone())
            .build()?;
        Ok(client)
    }
}
