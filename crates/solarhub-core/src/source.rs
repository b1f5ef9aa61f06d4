use serde::{Deserialize, Serialize};

/// The two content sources ingested per brand.
///
/// Each source owns its own checkpoint column on `brands`, so a brand can be
/// fresh for news while still stale for video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    News,
    Video,
}

impl SourceKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::News => "news",
            SourceKind::Video => "video",
        }
    }

    /// Human label used in job summaries.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SourceKind::News => "News",
            SourceKind::Video => "YouTube video",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&SourceKind::Video).expect("serialize");
        assert_eq!(json, "\"video\"");
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(SourceKind::News.to_string(), "news");
        assert_eq!(SourceKind::Video.to_string(), SourceKind::Video.as_str());
    }
}
