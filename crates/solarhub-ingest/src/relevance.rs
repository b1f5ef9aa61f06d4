/// Solar-domain keywords a video must mention to be kept.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "solar",
    "panel",
    "module",
    "photovoltaic",
    "inverter",
    "pv",
    "cell",
    "wafer",
    "heterojunction",
    "topcon",
    "perc",
    "energy",
    "power",
    "battery",
    "storage",
];

/// Case-insensitive substring allow-list over title and description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelevanceFilter {
    keywords: Vec<String>,
}

impl Default for RelevanceFilter {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS.iter().copied())
    }
}

impl RelevanceFilter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    #[must_use]
    pub fn is_relevant(&self, title: &str, description: &str) -> bool {
        let title = title.to_lowercase();
        let description = description.to_lowercase();
        self.keywords
            .iter()
            .any(|k| title.contains(k.as_str()) || description.contains(k.as_str()))
    }
}
