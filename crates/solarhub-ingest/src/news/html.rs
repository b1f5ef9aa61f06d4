//! Card-by-card parser for the news search results page.
//!
//! The page markup is outside our control, so every selector lives in
//! [`CardSelectors`] and can be swapped without touching the pipeline.

use chrono::{DateTime, Utc};
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use super::{NewsParser, ParsedArticle};
use crate::error::IngestError;

/// Host that relative article links on the results page resolve against.
pub const DEFAULT_RESULTS_BASE_URL: &str = "https://news.google.com/";

/// CSS selectors for one article card and its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSelectors {
    pub card: String,
    /// Anchor carrying the title text and the relative `href`.
    pub link: String,
    pub source: String,
    /// Element carrying a `datetime` attribute.
    pub time: String,
}

impl Default for CardSelectors {
    fn default() -> Self {
        Self {
            card: "article.IFHyqb".to_string(),
            link: "a.JtKRv".to_string(),
            source: "div.vr1PYe".to_string(),
            time: "time.hvbAAd".to_string(),
        }
    }
}

/// Extracts articles from a search-results HTML document.
#[derive(Debug, Clone)]
pub struct NewsHtmlParser {
    card: Selector,
    link: Selector,
    source: Selector,
    time: Selector,
    base_url: Url,
}

impl NewsHtmlParser {
    /// # Errors
    ///
    /// Returns [`IngestError::Selector`] if a selector does not parse, or
    /// [`IngestError::Config`] if `base_url` is not a valid URL.
    pub fn new(selectors: &CardSelectors, base_url: &str) -> Result<Self, IngestError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| IngestError::Config(format!("invalid base URL '{base_url}': {e}")))?;
        Ok(Self {
            card: compile(&selectors.card)?,
            link: compile(&selectors.link)?,
            source: compile(&selectors.source)?,
            time: compile(&selectors.time)?,
            base_url,
        })
    }

    fn parse_card(&self, card: ElementRef<'_>) -> Option<ParsedArticle> {
        let link = card.select(&self.link).next()?;
        let href = link.value().attr("href")?.trim();
        if href.is_empty() {
            return None;
        }
        let url = self.base_url.join(href).ok()?;

        let title = collapse_text(link);
        let source = card
            .select(&self.source)
            .next()
            .map(collapse_text)
            .filter(|s| !s.is_empty());
        let published_at = card
            .select(&self.time)
            .next()
            .and_then(|t| t.value().attr("datetime"))
            .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Some(ParsedArticle {
            title,
            url: url.to_string(),
            description: None,
            source,
            published_at,
        })
    }
}

impl NewsParser for NewsHtmlParser {
    fn parse(&self, body: &str) -> Result<Vec<ParsedArticle>, IngestError> {
        let document = Html::parse_document(body);
        let mut articles = Vec::new();
        for (index, card) in document.select(&self.card).enumerate() {
            match self.parse_card(card) {
                Some(article) => articles.push(article),
                None => tracing::debug!(index, "article card missing a usable link"),
            }
        }
        tracing::debug!(cards = articles.len(), "parsed results page");
        Ok(articles)
    }
}

fn compile(selector: &str) -> Result<Selector, IngestError> {
    Selector::parse(selector).map_err(|e| IngestError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn collapse_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
