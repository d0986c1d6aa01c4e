//! Client for the external search index. The index holds a denormalized copy
//! of the restaurant records (PascalCase document fields, string ids) plus
//! the precomputed recommendation lists written by the indexing job. One
//! pooled reqwest client with a request timeout is shared across calls.

use reqwest::StatusCode;
use resort_core::config::SearchConfig;
use resort_core::{document_key, FoodType, NoiseLevel, PriceLevel, Restaurant, RestaurantId};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const QUERY_API_VERSION: &str = "2016-09-01";
const LOOKUP_API_VERSION: &str = "2015-02-28";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed search backend response: {0}")]
    Malformed(String),
}

#[derive(Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    config: SearchConfig,
}

impl SearchClient {
    pub fn new(config: SearchConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, config })
    }

    /// Geo-scored proximity query: at most `count` restaurants, scored by the
    /// index's `nearrestaurants` profile around the caller's position.
    pub async fn nearby(
        &self,
        count: usize,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<Restaurant>, SearchError> {
        let url = format!(
            "{}/indexes/{}/docs?api-version={}&$top={}&scoringProfile=nearrestaurants&scoringParameter=currentLocation:{},{}",
            self.config.endpoint, self.config.index, QUERY_API_VERSION, count, latitude, longitude
        );
        let body = self
            .http
            .get(&url)
            .header("api-key", &self.config.api_key)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let docs: DocsResponse =
            serde_json::from_str(&body).map_err(|e| SearchError::Malformed(e.to_string()))?;
        docs.into_restaurants(count)
    }

    /// Looks up the recommendation list indexed for `id`. A missing document
    /// or an absent `RecommendedIds` field means no recommendations exist
    /// yet, which is an empty result rather than an error.
    pub async fn recommendations(
        &self,
        id: RestaurantId,
        count: usize,
    ) -> Result<Vec<RestaurantId>, SearchError> {
        let url = format!(
            "{}/indexes/{}/docs/{}?api-version={}",
            self.config.endpoint,
            self.config.index,
            document_key(id),
            LOOKUP_API_VERSION
        );
        let response = self
            .http
            .get(&url)
            .header("api-key", &self.config.api_key)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        let body = response.error_for_status()?.text().await?;
        let doc: RecommendationDoc =
            serde_json::from_str(&body).map_err(|e| SearchError::Malformed(e.to_string()))?;
        let mut ids = doc.recommended_ids()?;
        ids.truncate(count);
        Ok(ids)
    }
}

#[derive(Debug, Deserialize)]
struct DocsResponse {
    value: Vec<RestaurantDoc>,
}

impl DocsResponse {
    /// Maps the documents into domain records, keeping at most `count`.
    /// `$top` already asks the index for that many, but the cap holds here
    /// even if the backend over-returns.
    fn into_restaurants(self, count: usize) -> Result<Vec<Restaurant>, SearchError> {
        let mut restaurants: Vec<Restaurant> = self
            .value
            .into_iter()
            .map(RestaurantDoc::into_restaurant)
            .collect::<Result<_, _>>()?;
        restaurants.truncate(count);
        Ok(restaurants)
    }
}

/// A restaurant as the search index stores it. Ids travel as the two-digit
/// string keys the indexer writes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RestaurantDoc {
    restaurant_id: String,
    name: String,
    description: String,
    address: String,
    latitude: f64,
    longitude: f64,
    food_type: FoodType,
    noise: NoiseLevel,
    price: PriceLevel,
    family_friendly: bool,
    take_away: bool,
    rating: f32,
    phone: String,
}

impl RestaurantDoc {
    fn into_restaurant(self) -> Result<Restaurant, SearchError> {
        let id = parse_doc_id(&self.restaurant_id)?;
        Ok(Restaurant {
            id,
            name: self.name,
            description: self.description,
            address: self.address,
            latitude: self.latitude,
            longitude: self.longitude,
            food_type: self.food_type,
            noise: self.noise,
            price: self.price,
            family_friendly: self.family_friendly,
            take_away: self.take_away,
            rating: self.rating,
            phone: self.phone,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RecommendationDoc {
    #[serde(rename = "RecommendedIds", default)]
    recommended_ids: Option<Vec<String>>,
}

impl RecommendationDoc {
    fn recommended_ids(self) -> Result<Vec<RestaurantId>, SearchError> {
        self.recommended_ids
            .unwrap_or_default()
            .iter()
            .map(|s| parse_doc_id(s))
            .collect()
    }
}

fn parse_doc_id(raw: &str) -> Result<RestaurantId, SearchError> {
    raw.trim()
        .parse()
        .map_err(|_| SearchError::Malformed(format!("bad document id {:?}", raw)))
}
