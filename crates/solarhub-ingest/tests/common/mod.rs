//! In-memory [`ContentStore`] shared by the pipeline integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use solarhub_core::{ContentRecord, MediaRecord, NewsRecord, SourceKind};
use solarhub_db::DbError;
use solarhub_ingest::{BrandTarget, ContentStore, IngestError, IngestSettings};

#[derive(Debug, Clone)]
pub struct MemBrand {
    pub id: Uuid,
    pub name: String,
    pub youtube_channel_id: Option<String>,
    pub news_checkpoint: Option<DateTime<Utc>>,
    pub video_checkpoint: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct State {
    brands: Vec<MemBrand>,
    news: Vec<NewsRecord>,
    media: Vec<MediaRecord>,
    leases: HashSet<(SourceKind, Uuid)>,
    contested: HashSet<(SourceKind, Uuid)>,
    fail_inserts: bool,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_brand(
        &self,
        name: &str,
        youtube_channel_id: Option<&str>,
        checkpoint: Option<DateTime<Utc>>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().unwrap().brands.push(MemBrand {
            id,
            name: name.to_string(),
            youtube_channel_id: youtube_channel_id.map(ToOwned::to_owned),
            news_checkpoint: checkpoint,
            video_checkpoint: checkpoint,
        });
        id
    }

    pub fn brand(&self, id: Uuid) -> MemBrand {
        self.state
            .lock()
            .unwrap()
            .brands
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .expect("brand exists")
    }

    pub fn news(&self) -> Vec<NewsRecord> {
        self.state.lock().unwrap().news.clone()
    }

    pub fn media(&self) -> Vec<MediaRecord> {
        self.state.lock().unwrap().media.clone()
    }

    pub fn hold_lease(&self, source: SourceKind, brand_id: Uuid) {
        self.state.lock().unwrap().leases.insert((source, brand_id));
    }

    /// Selection still returns the brand, but taking its lease fails.
    pub fn contest_lease(&self, source: SourceKind, brand_id: Uuid) {
        self.state.lock().unwrap().contested.insert((source, brand_id));
    }

    pub fn lease_held(&self, source: SourceKind, brand_id: Uuid) -> bool {
        self.state.lock().unwrap().leases.contains(&(source, brand_id))
    }

    pub fn fail_inserts(&self) {
        self.state.lock().unwrap().fail_inserts = true;
    }
}

fn checkpoint_of(brand: &MemBrand, source: SourceKind) -> Option<DateTime<Utc>> {
    match source {
        SourceKind::News => brand.news_checkpoint,
        SourceKind::Video => brand.video_checkpoint,
    }
}

fn insert_unique<R: ContentRecord + Clone>(table: &mut Vec<R>, records: &[R]) -> usize {
    let mut inserted = 0;
    for record in records {
        let taken = table.iter().any(|r| {
            r.brand_id() == record.brand_id() && r.canonical_url() == record.canonical_url()
        });
        if !taken {
            table.push(record.clone());
            inserted += 1;
        }
    }
    inserted
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn select_batch(
        &self,
        source: SourceKind,
        limit: u32,
    ) -> Result<Vec<BrandTarget>, IngestError> {
        let state = self.state.lock().unwrap();
        let mut brands: Vec<&MemBrand> = state
            .brands
            .iter()
            .filter(|b| !state.leases.contains(&(source, b.id)))
            .collect();
        // Option orders None first, matching NULLS FIRST.
        brands.sort_by_key(|b| (checkpoint_of(b, source), b.id));
        Ok(brands
            .into_iter()
            .take(limit as usize)
            .map(|b| BrandTarget {
                id: b.id,
                name: b.name.clone(),
                youtube_channel_id: b.youtube_channel_id.clone(),
                checkpoint: checkpoint_of(b, source),
            })
            .collect())
    }

    async fn existing_urls(
        &self,
        source: SourceKind,
        brand_ids: &[Uuid],
    ) -> Result<Vec<(Uuid, String)>, IngestError> {
        let state = self.state.lock().unwrap();
        let pairs = match source {
            SourceKind::News => state
                .news
                .iter()
                .map(|r| (r.brand_id, r.full_content_url.clone()))
                .collect::<Vec<_>>(),
            SourceKind::Video => state
                .media
                .iter()
                .map(|r| (r.brand_id, r.full_url.clone()))
                .collect(),
        };
        Ok(pairs
            .into_iter()
            .filter(|(id, _)| brand_ids.contains(id))
            .collect())
    }

    async fn insert_news(&self, records: &[NewsRecord]) -> Result<usize, IngestError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_inserts {
            return Err(IngestError::Store(DbError::NotFound));
        }
        Ok(insert_unique(&mut state.news, records))
    }

    async fn insert_media(&self, records: &[MediaRecord]) -> Result<usize, IngestError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_inserts {
            return Err(IngestError::Store(DbError::NotFound));
        }
        Ok(insert_unique(&mut state.media, records))
    }

    async fn advance_checkpoint(
        &self,
        source: SourceKind,
        brand_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, IngestError> {
        let mut state = self.state.lock().unwrap();
        let brand = state
            .brands
            .iter_mut()
            .find(|b| b.id == brand_id)
            .ok_or(IngestError::Store(DbError::NotFound))?;
        let slot = match source {
            SourceKind::News => &mut brand.news_checkpoint,
            SourceKind::Video => &mut brand.video_checkpoint,
        };
        let next = slot.map_or(at, |current| current.max(at));
        *slot = Some(next);
        Ok(next)
    }

    async fn try_acquire_lease(
        &self,
        source: SourceKind,
        brand_id: Uuid,
        _ttl_secs: u64,
    ) -> Result<bool, IngestError> {
        let mut state = self.state.lock().unwrap();
        if state.contested.contains(&(source, brand_id)) {
            return Ok(false);
        }
        Ok(state.leases.insert((source, brand_id)))
    }

    async fn release_lease(&self, source: SourceKind, brand_id: Uuid) -> Result<(), IngestError> {
        self.state.lock().unwrap().leases.remove(&(source, brand_id));
        Ok(())
    }
}

pub fn settings(batch_size: u32, api_call_limit_per_brand: u32) -> IngestSettings {
    IngestSettings {
        batch_size,
        lease_ttl_secs: 900,
        api_call_limit_per_brand,
    }
}
