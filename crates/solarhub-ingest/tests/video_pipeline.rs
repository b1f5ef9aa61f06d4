//! End-to-end tests for `run_video_batch` against a mocked uploads listing.

mod common;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{settings, MemoryStore};
use solarhub_core::SourceKind;
use solarhub_ingest::{
    run_video_batch, BrandOutcome, HttpSettings, PagingStop, RelevanceFilter, YoutubeClient,
};

const CHANNEL: &str = "UCsolar123";
const PLAYLIST: &str = "UUsolar123";

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

fn video(id: i64, title: &str) -> Value {
    json!({
        "snippet": {
            "publishedAt": (t0() + Duration::hours(id)).to_rfc3339(),
            "title": title,
            "description": "",
            "thumbnails": {"high": {"url": format!("https://i.ytimg.com/vi/v{id}/hqdefault.jpg")}},
            "resourceId": {"kind": "youtube#video", "videoId": format!("v{id}")}
        }
    })
}

fn page(start: i64, count: i64, next: Option<&str>) -> Value {
    let items: Vec<Value> = (start..start + count)
        .map(|i| video(i, &format!("Solar module update {i}")))
        .collect();
    match next {
        Some(token) => json!({"items": items, "nextPageToken": token}),
        None => json!({"items": items}),
    }
}

fn youtube_client(server: &MockServer) -> YoutubeClient {
    YoutubeClient::with_base_url("test-key", 50, &HttpSettings::default(), &server.uri())
        .expect("failed to build test YouTube client")
}

async fn mount_first_page(server: &MockServer, body: Value, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("playlistId", PLAYLIST))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, token: &str, body: Value, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("pageToken", token))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Quota cap
// ---------------------------------------------------------------------------

#[tokio::test]
async fn call_cap_stops_after_two_pages_and_checkpoints_latest_item() {
    let server = MockServer::start().await;
    mount_first_page(&server, page(0, 50, Some("p2")), 1).await;
    mount_page(&server, "p2", page(50, 50, Some("p3")), 1).await;
    mount_page(&server, "p3", page(100, 50, None), 0).await;

    let store = MemoryStore::new();
    let brand_id = store.add_brand("Acme Solar", Some(CHANNEL), None);

    let report = run_video_batch(
        &store,
        &youtube_client(&server),
        &RelevanceFilter::default(),
        &settings(5, 2),
    )
    .await
    .expect("batch should succeed");

    match &report.brands[0].outcome {
        BrandOutcome::Persisted {
            fetched,
            inserted,
            api_calls,
            paging,
            checkpoint,
            ..
        } => {
            assert_eq!(*fetched, 100);
            assert_eq!(*inserted, 100);
            assert_eq!(*api_calls, 2);
            assert_eq!(*paging, Some(PagingStop::CallCap));
            assert_eq!(*checkpoint, Some(t0() + Duration::hours(99)));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(
        store.brand(brand_id).video_checkpoint,
        Some(t0() + Duration::hours(99))
    );
    assert_eq!(store.media().len(), 100);
}

#[tokio::test]
async fn rerun_after_cap_inserts_no_duplicates_and_never_rewinds() {
    let server = MockServer::start().await;
    mount_first_page(&server, page(0, 3, None), 2).await;

    let store = MemoryStore::new();
    let brand_id = store.add_brand("Acme Solar", Some(CHANNEL), None);
    let client = youtube_client(&server);
    let filter = RelevanceFilter::default();

    let first = run_video_batch(&store, &client, &filter, &settings(5, 15))
        .await
        .unwrap();
    let after_first = store.brand(brand_id).video_checkpoint;
    let second = run_video_batch(&store, &client, &filter, &settings(5, 15))
        .await
        .unwrap();

    assert_eq!(first.total_inserted(), 3);
    assert_eq!(second.total_inserted(), 0);
    assert_eq!(store.media().len(), 3);
    assert_eq!(store.brand(brand_id).video_checkpoint, after_first);
}

// ---------------------------------------------------------------------------
// Relevance
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unrelated_videos_are_dropped_but_still_move_the_checkpoint() {
    let server = MockServer::start().await;
    mount_first_page(
        &server,
        json!({"items": [
            video(1, "Inverter teardown"),
            video(2, "Company picnic highlights"),
            video(3, "Meet our new CFO"),
        ]}),
        1,
    )
    .await;

    let store = MemoryStore::new();
    let brand_id = store.add_brand("Acme Solar", Some(CHANNEL), None);

    let report = run_video_batch(
        &store,
        &youtube_client(&server),
        &RelevanceFilter::default(),
        &settings(5, 15),
    )
    .await
    .unwrap();

    let media = store.media();
    assert_eq!(media.len(), 1);
    assert_eq!(media[0].youtube_id, "v1");
    assert_eq!(media[0].full_url, "https://www.youtube.com/watch?v=v1");
    match &report.brands[0].outcome {
        BrandOutcome::Persisted { discarded, .. } => assert_eq!(*discarded, 2),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(
        store.brand(brand_id).video_checkpoint,
        Some(t0() + Duration::hours(3))
    );
}

// ---------------------------------------------------------------------------
// Skips and empty listings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn brand_without_channel_is_skipped_and_rotated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(0)
        .mount(&server)
        .await;

    let store = MemoryStore::new();
    let brand_id = store.add_brand("No Channel Co", None, None);
    let before = Utc::now();

    let report = run_video_batch(
        &store,
        &youtube_client(&server),
        &RelevanceFilter::default(),
        &settings(5, 15),
    )
    .await
    .unwrap();

    assert!(matches!(
        report.brands[0].outcome,
        BrandOutcome::SkippedNoChannel { checkpoint: Some(_) }
    ));
    assert!(store
        .brand(brand_id)
        .video_checkpoint
        .is_some_and(|cp| cp >= before));
}

#[tokio::test]
async fn empty_listing_moves_checkpoint_to_now() {
    let server = MockServer::start().await;
    mount_first_page(&server, json!({"items": []}), 1).await;

    let store = MemoryStore::new();
    let stale = Utc::now() - Duration::days(5);
    let brand_id = store.add_brand("Acme Solar", Some(CHANNEL), Some(stale));

    run_video_batch(
        &store,
        &youtube_client(&server),
        &RelevanceFilter::default(),
        &settings(5, 15),
    )
    .await
    .unwrap();

    assert!(store.brand(brand_id).video_checkpoint > Some(stale));
}

// ---------------------------------------------------------------------------
// Upstream errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn quota_error_on_first_page_leaves_checkpoint_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "message": "The request cannot be completed because you have exceeded your quota.",
                "errors": [{"reason": "quotaExceeded"}]
            }
        })))
        .mount(&server)
        .await;

    let store = MemoryStore::new();
    let stale = Utc::now() - Duration::days(2);
    let brand_id = store.add_brand("Acme Solar", Some(CHANNEL), Some(stale));

    let report = run_video_batch(
        &store,
        &youtube_client(&server),
        &RelevanceFilter::default(),
        &settings(5, 15),
    )
    .await
    .unwrap();

    match &report.brands[0].outcome {
        BrandOutcome::Persisted {
            paging, checkpoint, ..
        } => {
            assert_eq!(*paging, Some(PagingStop::Throttled));
            assert_eq!(*checkpoint, None);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(store.brand(brand_id).video_checkpoint, Some(stale));
}

#[tokio::test]
async fn playlist_error_fails_brand_without_touching_checkpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {
                "code": 404,
                "message": "The playlist identified with the request's playlistId parameter cannot be found.",
                "errors": [{"reason": "playlistNotFound"}]
            }
        })))
        .mount(&server)
        .await;

    let store = MemoryStore::new();
    let brand_id = store.add_brand("Acme Solar", Some(CHANNEL), None);

    let report = run_video_batch(
        &store,
        &youtube_client(&server),
        &RelevanceFilter::default(),
        &settings(5, 15),
    )
    .await
    .unwrap();

    assert!(matches!(
        report.brands[0].outcome,
        BrandOutcome::FetchFailed { .. }
    ));
    assert_eq!(report.failed(), 1);
    assert_eq!(store.brand(brand_id).video_checkpoint, None);
    assert!(!store.lease_held(SourceKind::Video, brand_id));
}

#[tokio::test]
async fn insert_failure_does_not_move_video_checkpoint() {
    let server = MockServer::start().await;
    mount_first_page(&server, page(0, 2, None), 1).await;

    let store = MemoryStore::new();
    let brand_id = store.add_brand("Acme Solar", Some(CHANNEL), None);
    store.fail_inserts();

    let report = run_video_batch(
        &store,
        &youtube_client(&server),
        &RelevanceFilter::default(),
        &settings(5, 15),
    )
    .await
    .unwrap();

    assert!(matches!(
        report.brands[0].outcome,
        BrandOutcome::PersistFailed {
            checkpoint: None,
            ..
        }
    ));
    assert_eq!(store.brand(brand_id).video_checkpoint, None);
}

#[tokio::test]
async fn transport_failure_does_not_expose_api_key() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        listener.local_addr().expect("local addr").port()
    };
    let client = YoutubeClient::with_base_url(
        "SECRET-YT-KEY",
        50,
        &HttpSettings::default(),
        &format!("http://127.0.0.1:{port}/youtube/v3"),
    )
    .expect("failed to build test YouTube client");

    let store = MemoryStore::new();
    let brand_id = store.add_brand("Acme Solar", Some(CHANNEL), None);

    let report = run_video_batch(&store, &client, &RelevanceFilter::default(), &settings(5, 15))
        .await
        .unwrap();

    match &report.brands[0].outcome {
        BrandOutcome::FetchFailed { error } => assert!(!error.contains("SECRET-YT-KEY")),
        other => panic!("unexpected outcome: {other:?}"),
    }
    let serialized = serde_json::to_string(&report).expect("report serializes");
    assert!(!serialized.contains("SECRET-YT-KEY"));
    assert_eq!(store.brand(brand_id).video_checkpoint, None);
}
