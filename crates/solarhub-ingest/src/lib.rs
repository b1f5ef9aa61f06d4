//! Periodic content ingestion for solar brands.
//!
//! Two jobs share one pipeline shape: select the stalest brands, fetch from
//! the upstream source, normalize and de-duplicate, persist, then move the
//! brand's per-source checkpoint. News comes from a search feed; video comes
//! from a quota-metered uploads listing.

pub mod dedup;
pub mod error;
pub mod http;
pub mod jobs;
pub mod news;
pub mod pipeline;
pub mod relevance;
pub(crate) mod retry;
pub mod store;
pub(crate) mod text;
pub mod types;
pub mod video;

pub use dedup::ExistingUrls;
pub use error::IngestError;
pub use http::HttpSettings;
pub use jobs::{preview_batch, run_news_job, run_video_job};
pub use news::{GoogleNewsClient, NewsFetch, NewsFetcher, NewsParser, ParsedArticle};
pub use pipeline::{run_news_batch, run_video_batch, select_batch};
pub use relevance::RelevanceFilter;
pub use store::{ContentStore, PgContentStore};
pub use types::{BatchReport, BrandOutcome, BrandReport, BrandTarget, IngestSettings, PagingStop};
pub use video::{PlaylistItem, PlaylistPage, VideoFetcher, YoutubeClient};
