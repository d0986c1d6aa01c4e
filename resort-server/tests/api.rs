use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use resort_core::config::SearchConfig;
use resort_core::seed::seed_if_empty;
use resort_core::store::Store;
use resort_server::routing::Catalog;
use resort_server::search::SearchClient;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const JPEG_MAGIC: &[u8] = &[0xff, 0xd8, 0xff, 0xe0];

/// Seeded app backed by the local store. The search endpoint is a dead
/// address; nothing in these tests issues an outbound request.
fn build_app(use_search: bool) -> (Router, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = Store::open(dir.path()).unwrap();
    seed_if_empty(&store).unwrap();
    store.set_photo(1, JPEG_MAGIC).unwrap();

    let config = SearchConfig {
        endpoint: "http://127.0.0.1:9".into(),
        api_key: "test-key".into(),
        index: "restaurants".into(),
        use_search,
    };
    let search = SearchClient::new(config).unwrap();
    let app = resort_server::build_app(Arc::new(Catalog::new(store, search, use_search)));
    (app, dir)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Bytes) {
    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

#[tokio::test]
async fn restaurant_by_id_roundtrips_fields() {
    let (app, _dir) = build_app(false);
    let (status, body) = get(app, "/restaurants/1").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["id"], 1);
    assert_eq!(json["name"], "Summit Cafe");
    assert_eq!(json["latitude"], 40.7218);
    assert_eq!(json["longitude"], -111.5043);
    assert_eq!(json["food_type"], "American");
    assert_eq!(json["noise"], "Loud");
    assert_eq!(json["price"], "Low");
    assert_eq!(json["take_away"], true);
}

#[tokio::test]
async fn missing_restaurant_is_404() {
    let (app, _dir) = build_app(false);
    let (status, _) = get(app, "/restaurants/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn nearby_returns_at_most_ten() {
    let (app, _dir) = build_app(false);
    let (status, body) =
        get(app, "/restaurants/nearby?latitude=40.7218&longitude=-111.5043").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).unwrap();
    let restaurants = json.as_array().unwrap();
    assert!(restaurants.len() <= 10);
    assert!(!restaurants.is_empty());
    // Store-side ordering is nearest first; the query point sits on the
    // seeded Summit Cafe.
    assert_eq!(restaurants[0]["name"], "Summit Cafe");
}

#[tokio::test]
async fn nearby_requires_coordinates() {
    let (app, _dir) = build_app(false);
    let (status, _) = get(app, "/restaurants/nearby?latitude=40.7").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn local_backend_has_no_recommendations() {
    let (app, _dir) = build_app(false);
    let (status, body) = get(app, "/restaurants/recommendations/42").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn search_backend_rejects_non_numeric_recommendation_text() {
    let (app, _dir) = build_app(true);
    let (status, _) = get(app, "/restaurants/recommendations/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn photo_carries_content_type_and_cache_header() {
    let (app, _dir) = build_app(false);
    let response = app
        .oneshot(Request::get("/restaurants/photo/1").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/jpeg");
    assert_eq!(response.headers()["cache-control"], "max-age=180");
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], JPEG_MAGIC);
}

#[tokio::test]
async fn missing_photo_is_404() {
    let (app, _dir) = build_app(false);
    let (status, _) = get(app, "/restaurants/photo/2").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
