//! End-to-end session tests against the live mock server.
//!
//! # Design
//! Each test starts the mock server on a random port with its own dex
//! configuration, then drives a `Session` over real HTTP through
//! `UreqTransport`. The server's request counters show how many round trips
//! an operation actually made.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use mock_server::{DexConfig, Stats};
use pokedex_core::{ApiError, Config, Session, StaticReachability, UreqTransport};

/// Start the mock server and return its API base URL and request counters.
async fn start(dex: DexConfig) -> (String, Arc<Stats>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let stats = Arc::new(Stats::default());
    tokio::spawn(mock_server::serve(listener, dex, stats.clone()));
    (format!("http://{addr}/api/v2/"), stats)
}

fn session(base_url: &str, online: bool) -> Session {
    let config = Config::default().with_base_url(base_url);
    Session::spawn(
        &config,
        UreqTransport::new(&config),
        Arc::new(StaticReachability::new(online)),
    )
}

#[tokio::test(flavor = "multi_thread")]
async fn pages_accumulate_until_exhausted() {
    let (base_url, stats) = start(DexConfig::default()).await;
    let session = Session::connect(&Config::default().with_base_url(&base_url));

    session.load_first_page().await.unwrap();
    let first = session.snapshot().await.unwrap();
    assert_eq!(first.len(), 20);
    assert_eq!(first.total_count, Some(60));
    assert_eq!(first.hydrated_count(), 20);
    assert_eq!(first.items[0].name, "bulbasaur");

    session.load_next_page().await.unwrap();
    let second = session.snapshot().await.unwrap();
    assert!(second.len() > first.len());
    assert_ne!(second.next_cursor, first.next_cursor);
    assert_eq!(second.items[20].name, "spearow");
    assert_eq!(second.hydrated_count(), 40);

    session.load_next_page().await.unwrap();
    let third = session.snapshot().await.unwrap();
    assert_eq!(third.len(), 60);
    assert_eq!(third.next_cursor, None);

    assert_eq!(session.load_next_page().await.unwrap_err(), ApiError::NoMorePages);
    assert_eq!(session.snapshot().await.unwrap(), third);
    assert_eq!(stats.list_requests(), 3);
    assert_eq!(stats.detail_requests(), 60);
}

#[tokio::test(flavor = "multi_thread")]
async fn overlapping_next_page_is_rejected() {
    let (base_url, stats) = start(DexConfig {
        page_delay: Duration::from_millis(300),
        ..DexConfig::default()
    })
    .await;
    let session = session(&base_url, true);
    session.load_first_page().await.unwrap();

    let (first, second) = tokio::join!(session.load_next_page(), session.load_next_page());
    assert_eq!(first, Ok(()));
    assert_eq!(second, Err(ApiError::AlreadyFetching));

    let snapshot = session.snapshot().await.unwrap();
    assert_eq!(snapshot.len(), 40);
    assert_eq!(stats.list_requests(), 2);

    // The flag is released once the page has loaded.
    session.load_next_page().await.unwrap();
    assert_eq!(session.snapshot().await.unwrap().len(), 60);
}

#[tokio::test(flavor = "multi_thread")]
async fn failing_detail_leaves_one_item_unhydrated() {
    let (base_url, _) = start(DexConfig {
        failing_details: HashSet::from(["ivysaur".to_string()]),
        ..DexConfig::default()
    })
    .await;
    let session = session(&base_url, true);

    session.load_first_page().await.unwrap();
    let snapshot = session.snapshot().await.unwrap();
    assert_eq!(snapshot.len(), 20);
    assert_eq!(snapshot.hydrated_count(), 19);
    assert!(snapshot.get("ivysaur").unwrap().detail.is_none());
    assert_eq!(snapshot.get("venusaur").unwrap().detail.as_ref().unwrap().id, 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn search_replaces_or_reports_not_found() {
    let (base_url, _) = start(DexConfig::default()).await;
    let session = session(&base_url, true);
    session.load_first_page().await.unwrap();

    assert_eq!(session.search("").await.unwrap_err(), ApiError::InvalidQuery);
    assert_eq!(session.search("doesnotexist").await.unwrap_err(), ApiError::NotFound);
    assert_eq!(session.snapshot().await.unwrap().len(), 20);

    session.search("Bulbasaur").await.unwrap();
    let snapshot = session.snapshot().await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.items[0].name.to_lowercase(), "bulbasaur");
    let detail = snapshot.items[0].detail.as_ref().unwrap();
    assert_eq!(
        detail.default_image_url(),
        Some("https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/1.png")
    );
    assert_eq!(session.load_next_page().await.unwrap_err(), ApiError::NoMorePages);

    // Clearing the search goes back to the first page.
    session.load_first_page().await.unwrap();
    assert_eq!(session.snapshot().await.unwrap().len(), 20);
}

#[tokio::test(flavor = "multi_thread")]
async fn offline_fails_without_a_round_trip() {
    let (base_url, stats) = start(DexConfig::default()).await;
    let session = session(&base_url, false);

    let err = session.load_first_page().await.unwrap_err();
    assert_eq!(err, ApiError::NoConnectivity);
    assert_eq!(err.alert(), Some(pokedex_core::Alert::NoInternetConnection));
    assert_eq!(session.search("pikachu").await.unwrap_err(), ApiError::NoConnectivity);
    assert_eq!(stats.list_requests(), 0);
    assert_eq!(stats.detail_requests(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn first_page_supersedes_slow_next_page() {
    let (base_url, _) = start(DexConfig {
        page_delay: Duration::from_millis(800),
        ..DexConfig::default()
    })
    .await;
    let session = session(&base_url, true);
    session.load_first_page().await.unwrap();
    let first_cursor = session.snapshot().await.unwrap().next_cursor;

    let pending = {
        let session = session.clone();
        tokio::spawn(async move { session.load_next_page().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    session.load_first_page().await.unwrap();
    assert_eq!(pending.await.unwrap(), Err(ApiError::Superseded));

    let snapshot = session.snapshot().await.unwrap();
    assert_eq!(snapshot.len(), 20);
    assert_eq!(snapshot.next_cursor, first_cursor);

    session.load_next_page().await.unwrap();
    assert_eq!(session.snapshot().await.unwrap().len(), 40);
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_first_page_keeps_hydrating_next_page() {
    let (base_url, _) = start(DexConfig {
        detail_delay: Duration::from_millis(600),
        ..DexConfig::default()
    })
    .await;
    let config = Config::default().with_base_url(&base_url);
    let reachability = Arc::new(StaticReachability::new(true));
    let session = Session::spawn(&config, UreqTransport::new(&config), reachability.clone());
    session.load_first_page().await.unwrap();

    let pending = {
        let session = session.clone();
        tokio::spawn(async move { session.load_next_page().await })
    };
    // The next page is appended and its detail requests are in flight.
    tokio::time::sleep(Duration::from_millis(200)).await;

    reachability.set_online(false);
    assert_eq!(session.load_first_page().await, Err(ApiError::NoConnectivity));
    reachability.set_online(true);

    assert_eq!(pending.await.unwrap(), Ok(()));
    let snapshot = session.snapshot().await.unwrap();
    assert_eq!(snapshot.len(), 40);
    assert_eq!(snapshot.hydrated_count(), 40);
    assert_eq!(snapshot.items[20].name, "spearow");
}

#[tokio::test(flavor = "multi_thread")]
async fn search_supersedes_slow_next_page() {
    let (base_url, _) = start(DexConfig {
        page_delay: Duration::from_millis(800),
        ..DexConfig::default()
    })
    .await;
    let session = session(&base_url, true);
    session.load_first_page().await.unwrap();

    let pending = {
        let session = session.clone();
        tokio::spawn(async move { session.load_next_page().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    session.search("pikachu").await.unwrap();
    assert_eq!(pending.await.unwrap(), Err(ApiError::Superseded));

    let snapshot = session.snapshot().await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.items[0].name, "pikachu");
    assert_eq!(session.load_next_page().await, Err(ApiError::NoMorePages));
}

#[tokio::test(flavor = "multi_thread")]
async fn only_newest_search_applies() {
    let (base_url, _) = start(DexConfig {
        detail_delay: Duration::from_millis(300),
        ..DexConfig::default()
    })
    .await;
    let session = session(&base_url, true);

    let (older, newer) = tokio::join!(session.search("bulbasaur"), session.search("pikachu"));
    assert_eq!(older, Err(ApiError::Superseded));
    assert_eq!(newer, Ok(()));

    let snapshot = session.snapshot().await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.items[0].name, "pikachu");
    assert_eq!(snapshot.items[0].detail.as_ref().unwrap().id, 25);
}
