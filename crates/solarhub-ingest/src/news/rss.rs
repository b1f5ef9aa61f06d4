//! RSS 2.0 feed parser for the news search endpoint.

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesText, Event};
use quick_xml::Reader;

use super::{NewsParser, ParsedArticle};
use crate::error::IngestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Description,
    PubDate,
    Source,
}

impl Field {
    fn from_tag(name: &str) -> Option<Self> {
        match name {
            "title" => Some(Field::Title),
            "link" => Some(Field::Link),
            "description" => Some(Field::Description),
            "pubDate" => Some(Field::PubDate),
            "source" => Some(Field::Source),
            _ => None,
        }
    }
}

#[derive(Default)]
struct ItemBuf {
    title: String,
    link: String,
    description: String,
    pub_date: String,
    source: String,
}

impl ItemBuf {
    fn push(&mut self, field: Field, text: &str) {
        let target = match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            Field::Description => &mut self.description,
            Field::PubDate => &mut self.pub_date,
            Field::Source => &mut self.source,
        };
        target.push_str(text);
    }

    fn finish(self) -> ParsedArticle {
        let non_empty = |s: String| {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };
        ParsedArticle {
            title: self.title.trim().to_string(),
            url: self.link.trim().to_string(),
            published_at: parse_pub_date(&self.pub_date),
            description: non_empty(self.description),
            source: non_empty(self.source),
        }
    }
}

/// Parses `<item>` elements out of an RSS feed.
///
/// Items are returned as found; title/URL validation happens when they are
/// turned into records.
#[derive(Debug, Clone, Copy, Default)]
pub struct RssFeedParser;

impl NewsParser for RssFeedParser {
    fn parse(&self, body: &str) -> Result<Vec<ParsedArticle>, IngestError> {
        let mut reader = Reader::from_str(body);
        reader.config_mut().trim_text(true);

        let mut articles = Vec::new();
        let mut item: Option<ItemBuf> = None;
        let mut field: Option<Field> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let name_buf = e.name().as_ref().to_vec();
                    let name = std::str::from_utf8(&name_buf).unwrap_or("");
                    if name == "item" {
                        item = Some(ItemBuf::default());
                        field = None;
                    } else if item.is_some() {
                        field = Field::from_tag(name);
                    }
                }
                Ok(Event::End(e)) => {
                    let name_buf = e.name().as_ref().to_vec();
                    let name = std::str::from_utf8(&name_buf).unwrap_or("");
                    if name == "item" {
                        if let Some(done) = item.take() {
                            articles.push(done.finish());
                        }
                    }
                    field = None;
                }
                Ok(Event::Text(e)) => {
                    if let (Some(buf), Some(f)) = (item.as_mut(), field) {
                        buf.push(f, &unescape_lossy(&e));
                    }
                }
                Ok(Event::CData(e)) => {
                    if let (Some(buf), Some(f)) = (item.as_mut(), field) {
                        buf.push(f, &String::from_utf8_lossy(&e));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(IngestError::Xml(e)),
                _ => {}
            }
        }

        tracing::debug!(items = articles.len(), "parsed RSS feed");
        Ok(articles)
    }
}

/// Unescapes XML entities, keeping the raw text when an entity is unknown
/// (Google News descriptions carry HTML entities such as `&nbsp;`).
fn unescape_lossy(text: &BytesText<'_>) -> String {
    match text.unescape() {
        Ok(s) => s.into_owned(),
        Err(_) => String::from_utf8_lossy(text).into_owned(),
    }
}

fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
