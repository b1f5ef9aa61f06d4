//! In-memory pre-filter against already-stored content.

use std::collections::{HashMap, HashSet};

use solarhub_core::ContentRecord;
use uuid::Uuid;

/// Canonical URLs already persisted, grouped by brand.
#[derive(Debug, Default)]
pub struct ExistingUrls {
    by_brand: HashMap<Uuid, HashSet<String>>,
}

impl ExistingUrls {
    /// Groups the `(brand_id, url)` pairs returned by one preload query.
    #[must_use]
    pub fn from_pairs(pairs: Vec<(Uuid, String)>) -> Self {
        let mut by_brand: HashMap<Uuid, HashSet<String>> = HashMap::new();
        for (brand_id, url) in pairs {
            by_brand.entry(brand_id).or_default().insert(url);
        }
        Self { by_brand }
    }

    #[must_use]
    pub fn contains(&self, brand_id: Uuid, url: &str) -> bool {
        self.by_brand
            .get(&brand_id)
            .is_some_and(|urls| urls.contains(url))
    }

    /// Splits `records` into new ones and a duplicate count.
    ///
    /// A record is a duplicate if its key is already stored or appeared
    /// earlier in `records`.
    pub fn retain_new<R: ContentRecord>(&self, records: Vec<R>) -> (Vec<R>, usize) {
        let mut seen: HashSet<(Uuid, String)> = HashSet::new();
        let mut fresh = Vec::with_capacity(records.len());
        let mut duplicates = 0usize;

        for record in records {
            let brand_id = record.brand_id();
            let url = record.canonical_url();
            if self.contains(brand_id, url) || !seen.insert((brand_id, url.to_string())) {
                tracing::debug!(%brand_id, url, "filtering out duplicate");
                duplicates += 1;
                continue;
            }
            fresh.push(record);
        }

        (fresh, duplicates)
    }

    /// Records keys written during this invocation.
    pub fn extend<R: ContentRecord>(&mut self, records: &[R]) {
        for record in records {
            self.by_brand
                .entry(record.brand_id())
                .or_default()
                .insert(record.canonical_url().to_string());
        }
    }
}
