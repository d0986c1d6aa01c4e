use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, AllowOrigin, CorsLayer};

pub mod error;
pub mod routing;
pub mod search;

use error::ApiError;
use resort_core::RestaurantId;
use routing::Catalog;

/// How long clients may cache a photo response, in seconds.
const PHOTO_CACHE_SECS: u32 = 180;

pub fn build_app(catalog: Arc<Catalog>) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods(Any)
                    .allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/restaurants/nearby", get(nearby_handler))
        .route("/restaurants/recommendations/:searchtext", get(recommendations_handler))
        .route("/restaurants/photo/:id", get(photo_handler))
        .route("/restaurants/:id", get(restaurant_handler))
        .with_state(catalog)
        .layer(cors)
}

async fn restaurant_handler(
    State(catalog): State<Arc<Catalog>>,
    Path(id): Path<RestaurantId>,
) -> Result<impl IntoResponse, ApiError> {
    let restaurant = catalog.by_id(id)?;
    Ok(Json(restaurant))
}

#[derive(Deserialize)]
struct NearbyParams {
    latitude: f64,
    longitude: f64,
}

async fn nearby_handler(
    State(catalog): State<Arc<Catalog>>,
    Query(params): Query<NearbyParams>,
) -> Result<impl IntoResponse, ApiError> {
    let restaurants = catalog.nearby(params.latitude, params.longitude).await?;
    Ok(Json(restaurants))
}

async fn recommendations_handler(
    State(catalog): State<Arc<Catalog>>,
    Path(searchtext): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let ids = catalog.recommendations(&searchtext).await?;
    Ok(Json(ids))
}

async fn photo_handler(
    State(catalog): State<Arc<Catalog>>,
    Path(id): Path<RestaurantId>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = catalog.photo(id)?;
    Ok((
        [
            (header::CONTENT_TYPE, "image/jpeg".to_string()),
            (header::CACHE_CONTROL, format!("max-age={}", PHOTO_CACHE_SECS)),
        ],
        bytes,
    ))
}
