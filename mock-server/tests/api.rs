use std::{collections::HashSet, sync::Arc};

use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, DexConfig, PageResponse, PokemonResponse, Stats};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header(http::header::HOST, "dex.test")
        .body(String::new())
        .unwrap()
}

// --- list ---

#[tokio::test]
async fn first_page_has_next_and_no_previous() {
    let resp = app().oneshot(get("/api/v2/pokemon/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: PageResponse = body_json(resp).await;
    assert_eq!(page.count, 60);
    assert_eq!(page.results.len(), 20);
    assert_eq!(page.results[0].name, "bulbasaur");
    assert_eq!(page.results[0].url, "http://dex.test/api/v2/pokemon/1/");
    assert_eq!(
        page.next.as_deref(),
        Some("http://dex.test/api/v2/pokemon?offset=20&limit=20")
    );
    assert!(page.previous.is_none());
}

#[tokio::test]
async fn last_page_has_no_next() {
    let resp = app()
        .oneshot(get("/api/v2/pokemon?offset=40&limit=20"))
        .await
        .unwrap();

    let page: PageResponse = body_json(resp).await;
    assert_eq!(page.results.len(), 20);
    assert_eq!(page.results[19].name, "poliwag");
    assert!(page.next.is_none());
    assert_eq!(
        page.previous.as_deref(),
        Some("http://dex.test/api/v2/pokemon?offset=20&limit=20")
    );
}

#[tokio::test]
async fn offset_past_the_end_is_empty() {
    let resp = app()
        .oneshot(get("/api/v2/pokemon?offset=500"))
        .await
        .unwrap();

    let page: PageResponse = body_json(resp).await;
    assert!(page.results.is_empty());
    assert!(page.next.is_none());
}

#[tokio::test]
async fn huge_limit_returns_the_rest() {
    let resp = app()
        .oneshot(get(&format!("/api/v2/pokemon?offset=10&limit={}", usize::MAX)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: PageResponse = body_json(resp).await;
    assert_eq!(page.results.len(), 50);
    assert_eq!(page.results[0].name, "metapod");
    assert!(page.next.is_none());
}

#[tokio::test]
async fn list_counts_requests() {
    let stats = Arc::new(Stats::default());
    let app = app_with(DexConfig::default(), stats.clone());
    app.oneshot(get("/api/v2/pokemon/")).await.unwrap();
    assert_eq!(stats.list_requests(), 1);
    assert_eq!(stats.detail_requests(), 0);
}

// --- detail ---

#[tokio::test]
async fn detail_by_id_with_trailing_slash() {
    let resp = app().oneshot(get("/api/v2/pokemon/25/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let pokemon: PokemonResponse = body_json(resp).await;
    assert_eq!(pokemon.name, "pikachu");
    assert_eq!(pokemon.types.len(), 1);
    assert_eq!(pokemon.types[0].kind.name, "electric");
}

#[tokio::test]
async fn detail_by_name() {
    let resp = app().oneshot(get("/api/v2/pokemon/bulbasaur")).await.unwrap();

    let pokemon: PokemonResponse = body_json(resp).await;
    assert_eq!(pokemon.id, 1);
    assert_eq!(
        pokemon.sprites.front_default.as_deref(),
        Some("https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/1.png")
    );
}

#[tokio::test]
async fn unknown_name_returns_404() {
    let resp = app()
        .oneshot(get("/api/v2/pokemon/doesnotexist"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(&body_bytes(resp).await[..], b"Not Found");
}

#[tokio::test]
async fn names_are_case_sensitive() {
    let resp = app().oneshot(get("/api/v2/pokemon/Bulbasaur")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn id_outside_dex_returns_404() {
    let config = DexConfig {
        size: 5,
        ..DexConfig::default()
    };
    let resp = app_with(config, Arc::new(Stats::default()))
        .oneshot(get("/api/v2/pokemon/6/"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn failing_detail_returns_500() {
    let config = DexConfig {
        failing_details: HashSet::from(["ivysaur".to_string()]),
        ..DexConfig::default()
    };
    let resp = app_with(config, Arc::new(Stats::default()))
        .oneshot(get("/api/v2/pokemon/2/"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
