//! HTTP client for the Google News search endpoints.
//!
//! One client serves one format: `/rss/search` with [`RssFeedParser`], or
//! `/search` with [`NewsHtmlParser`]. No authentication is involved.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{Client, StatusCode, Url};
use solarhub_core::{NewsFormat, NewsLocale};

use super::html::{CardSelectors, NewsHtmlParser, DEFAULT_RESULTS_BASE_URL};
use super::rss::RssFeedParser;
use super::{NewsFetch, NewsFetcher, NewsParser};
use crate::error::IngestError;
use crate::http::HttpSettings;
use crate::retry::retry_with_backoff;

const DEFAULT_BASE_URL: &str = "https://news.google.com/";

pub struct GoogleNewsClient {
    client: Client,
    base_url: Url,
    format: NewsFormat,
    locale: NewsLocale,
    parser: Box<dyn NewsParser>,
    http: HttpSettings,
}

impl GoogleNewsClient {
    /// Creates a client pointed at the production news host.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        http: &HttpSettings,
        format: NewsFormat,
        locale: NewsLocale,
    ) -> Result<Self, IngestError> {
        Self::with_base_url(http, format, locale, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// Relative links in HTML results still resolve against the production
    /// host, since that is where the article pages live.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Http`] if the client cannot be built, or
    /// [`IngestError::Config`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        http: &HttpSettings,
        format: NewsFormat,
        locale: NewsLocale,
        base_url: &str,
    ) -> Result<Self, IngestError> {
        let parser: Box<dyn NewsParser> = match format {
            NewsFormat::Rss => Box::new(RssFeedParser),
            NewsFormat::Html => Box::new(NewsHtmlParser::new(
                &CardSelectors::default(),
                DEFAULT_RESULTS_BASE_URL,
            )?),
        };
        Self::with_parser(http, format, locale, base_url, parser)
    }

    /// Creates a client with an explicit parser, e.g. custom card selectors.
    ///
    /// # Errors
    ///
    /// Same as [`GoogleNewsClient::with_base_url`].
    pub fn with_parser(
        http: &HttpSettings,
        format: NewsFormat,
        locale: NewsLocale,
        base_url: &str,
        parser: Box<dyn NewsParser>,
    ) -> Result<Self, IngestError> {
        // Exactly one trailing slash so the endpoint path is appended, not substituted.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| IngestError::Config(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client: http.build_client()?,
            base_url,
            format,
            locale,
            parser,
            http: http.clone(),
        })
    }

    /// Search URL for the brand's exact (quoted) name.
    #[must_use]
    pub fn search_url(&self, brand_name: &str) -> String {
        let quoted = format!("\"{brand_name}\"");
        let query = utf8_percent_encode(&quoted, NON_ALPHANUMERIC);
        let NewsLocale { hl, gl, ceid } = &self.locale;
        match self.format {
            NewsFormat::Rss => format!(
                "{}rss/search?q={query}&hl={hl}&gl={gl}&ceid={ceid}",
                self.base_url
            ),
            NewsFormat::Html => format!(
                "{}search?q={query}&hl={hl}&gl={gl}&ceid={ceid}&tbs=qdr:y",
                self.base_url
            ),
        }
    }

    async fn get_body(&self, url: &str) -> Result<String, IngestError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(IngestError::RateLimited {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(IngestError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl NewsFetcher for GoogleNewsClient {
    async fn fetch(&self, brand_name: &str) -> Result<NewsFetch, IngestError> {
        let url = self.search_url(brand_name);
        tracing::debug!(brand = brand_name, %url, "fetching news search");
        let mut requests = 0u32;
        let body = retry_with_backoff(self.http.max_retries, self.http.backoff_base_ms, || {
            requests += 1;
            self.get_body(&url)
        })
        .await?;
        Ok(NewsFetch {
            articles: self.parser.parse(&body)?,
            requests,
        })
    }
}
