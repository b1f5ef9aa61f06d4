use chrono::{DateTime, Utc};

use super::quota::QuotaBudget;
use super::{PlaylistItem, VideoFetcher};
use crate::error::IngestError;
use crate::types::PagingStop;

/// Everything retrieved for one playlist in one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Harvest {
    pub items: Vec<PlaylistItem>,
    pub api_calls: u32,
    pub stop: PagingStop,
}

impl Harvest {
    /// Latest `published_at` among retrieved items.
    #[must_use]
    pub fn latest_published_at(&self) -> Option<DateTime<Utc>> {
        self.items.iter().filter_map(|i| i.published_at).max()
    }

    /// Where the checkpoint should move after this harvest.
    ///
    /// The latest retrieved publish time wins. With nothing retrieved, a
    /// listing read to the end moves to `now`; a listing cut short by the
    /// cap or a throttle leaves the checkpoint alone.
    #[must_use]
    pub fn checkpoint_target(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.latest_published_at() {
            Some(latest) => Some(latest),
            None if self.stop == PagingStop::Exhausted => Some(now),
            None => None,
        }
    }
}

/// Pages through `playlist_id` in listing order until it runs out, the
/// budget is spent, or the API throttles.
///
/// # Errors
///
/// Returns any fetch error other than quota exhaustion or rate limiting.
/// Items already retrieved are dropped in that case.
pub async fn harvest_uploads<F>(
    fetcher: &F,
    playlist_id: &str,
    published_after: DateTime<Utc>,
    budget: &mut QuotaBudget,
) -> Result<Harvest, IngestError>
where
    F: VideoFetcher + ?Sized,
{
    let mut items = Vec::new();
    let mut page_token: Option<String> = None;

    let stop = loop {
        if !budget.try_spend() {
            tracing::warn!(
                playlist_id,
                limit = budget.limit(),
                "reached API call limit; continuing next invocation"
            );
            break PagingStop::CallCap;
        }

        match fetcher
            .fetch_page(playlist_id, published_after, page_token.as_deref())
            .await
        {
            Ok(page) => {
                tracing::debug!(playlist_id, items = page.items.len(), "fetched playlist page");
                items.extend(page.items);
                match page.next_page_token {
                    Some(token) if !token.is_empty() => page_token = Some(token),
                    _ => break PagingStop::Exhausted,
                }
            }
            Err(e) if e.is_throttle() => {
                tracing::warn!(playlist_id, error = %e, "stopping paging for this brand");
                break PagingStop::Throttled;
            }
            Err(e) => return Err(e),
        }
    };

    Ok(Harvest {
        items,
        api_calls: budget.used(),
        stop,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::video::PlaylistPage;

    struct ScriptedFetcher {
        responses: Mutex<VecDeque<Result<PlaylistPage, IngestError>>>,
        tokens_seen: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedFetcher {
        fn new(responses: Vec<Result<PlaylistPage, IngestError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                tokens_seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl VideoFetcher for ScriptedFetcher {
        async fn fetch_page(
            &self,
            _playlist_id: &str,
            _published_after: DateTime<Utc>,
            page_token: Option<&str>,
        ) -> Result<PlaylistPage, IngestError> {
            self.tokens_seen
                .lock()
                .unwrap()
                .push(page_token.map(ToOwned::to_owned));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(PlaylistPage::default()))
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    fn page(start: i64, count: i64, next: Option<&str>) -> PlaylistPage {
        PlaylistPage {
            items: (start..start + count)
                .map(|i| PlaylistItem {
                    video_id: format!("v{i}"),
                    title: format!("Solar video {i}"),
                    description: String::new(),
                    published_at: Some(t0() + Duration::hours(i)),
                    thumbnail_url: None,
                })
                .collect(),
            next_page_token: next.map(ToOwned::to_owned),
        }
    }

    #[tokio::test]
    async fn follows_page_tokens_in_order() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok(page(0, 2, Some("p2"))),
            Ok(page(2, 2, None)),
        ]);
        let mut budget = QuotaBudget::new(15);

        let harvest = harvest_uploads(&fetcher, "UUx", t0(), &mut budget).await.unwrap();

        assert_eq!(harvest.items.len(), 4);
        assert_eq!(harvest.api_calls, 2);
        assert_eq!(harvest.stop, PagingStop::Exhausted);
        assert_eq!(
            *fetcher.tokens_seen.lock().unwrap(),
            vec![None, Some("p2".to_string())]
        );
    }

    #[tokio::test]
    async fn call_cap_stops_paging() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok(page(0, 50, Some("p2"))),
            Ok(page(50, 50, Some("p3"))),
            Ok(page(100, 50, None)),
        ]);
        let mut budget = QuotaBudget::new(2);

        let harvest = harvest_uploads(&fetcher, "UUx", t0(), &mut budget).await.unwrap();

        assert_eq!(harvest.api_calls, 2);
        assert_eq!(fetcher.tokens_seen.lock().unwrap().len(), 2);
        assert_eq!(harvest.items.len(), 100);
        assert_eq!(harvest.stop, PagingStop::CallCap);
        assert_eq!(
            harvest.checkpoint_target(Utc::now()),
            Some(t0() + Duration::hours(99))
        );
    }

    #[tokio::test]
    async fn quota_error_keeps_partial_results() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok(page(0, 3, Some("p2"))),
            Err(IngestError::QuotaExceeded("quota".to_string())),
        ]);
        let mut budget = QuotaBudget::new(15);

        let harvest = harvest_uploads(&fetcher, "UUx", t0(), &mut budget).await.unwrap();

        assert_eq!(harvest.items.len(), 3);
        assert_eq!(harvest.stop, PagingStop::Throttled);
    }

    #[tokio::test]
    async fn throttle_before_any_item_leaves_checkpoint_alone() {
        let fetcher =
            ScriptedFetcher::new(vec![Err(IngestError::QuotaExceeded("quota".to_string()))]);
        let mut budget = QuotaBudget::new(15);

        let harvest = harvest_uploads(&fetcher, "UUx", t0(), &mut budget).await.unwrap();

        assert!(harvest.items.is_empty());
        assert_eq!(harvest.checkpoint_target(Utc::now()), None);
    }

    #[tokio::test]
    async fn empty_listing_moves_checkpoint_to_now() {
        let fetcher = ScriptedFetcher::new(vec![Ok(PlaylistPage::default())]);
        let mut budget = QuotaBudget::new(15);
        let now = Utc::now();

        let harvest = harvest_uploads(&fetcher, "UUx", t0(), &mut budget).await.unwrap();

        assert_eq!(harvest.checkpoint_target(now), Some(now));
    }

    #[tokio::test]
    async fn other_api_errors_propagate() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok(page(0, 3, Some("p2"))),
            Err(IngestError::YoutubeApi("playlistNotFound".to_string())),
        ]);
        let mut budget = QuotaBudget::new(15);

        let result = harvest_uploads(&fetcher, "UUx", t0(), &mut budget).await;

        assert!(matches!(result, Err(IngestError::YoutubeApi(_))));
    }
}
