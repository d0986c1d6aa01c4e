//! Per-request dispatch between the local store and the external search
//! backend. The toggle is fixed at startup; there is no other state here, so
//! every call routes independently with no locking.

use crate::error::ApiError;
use crate::search::SearchClient;
use resort_core::store::Store;
use resort_core::{Restaurant, RestaurantId, NEARBY_COUNT, RECOMMENDATIONS_COUNT};

pub struct Catalog {
    store: Store,
    search: SearchClient,
    use_search: bool,
}

impl Catalog {
    pub fn new(store: Store, search: SearchClient, use_search: bool) -> Self {
        Self { store, search, use_search }
    }

    /// Point lookups always come from the canonical store; the search copy
    /// is eventually consistent and has no say here.
    pub fn by_id(&self, id: RestaurantId) -> Result<Restaurant, ApiError> {
        self.store.get(id)?.ok_or(ApiError::NotFound)
    }

    pub async fn nearby(&self, latitude: f64, longitude: f64) -> Result<Vec<Restaurant>, ApiError> {
        if self.use_search {
            Ok(self.search.nearby(NEARBY_COUNT, latitude, longitude).await?)
        } else {
            Ok(self.store.nearby(latitude, longitude, NEARBY_COUNT)?)
        }
    }

    /// Recommendations only exist in the search index. With the backend
    /// toggled off there is nothing local to fall back on, so the answer is
    /// an empty list rather than an error.
    pub async fn recommendations(&self, text: &str) -> Result<Vec<RestaurantId>, ApiError> {
        if !self.use_search {
            return Ok(Vec::new());
        }
        let id: RestaurantId = text
            .parse()
            .map_err(|_| ApiError::Validation(format!("{:?} is not a restaurant id", text)))?;
        Ok(self.search.recommendations(id, RECOMMENDATIONS_COUNT).await?)
    }

    /// Photos are never indexed, so this path has no fallback branch. A
    /// restaurant without a photo is a 404, matching the rest of the API.
    pub fn photo(&self, id: RestaurantId) -> Result<Vec<u8>, ApiError> {
        self.store.photo(id)?.ok_or(ApiError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resort_core::config::SearchConfig;
    use resort_core::seed::seed_if_empty;
    use tempfile::tempdir;

    fn catalog(dir: &std::path::Path, use_search: bool) -> Catalog {
        let store = Store::open(dir).unwrap();
        seed_if_empty(&store).unwrap();
        let config = SearchConfig {
            // Never contacted by these tests: validation and local routing
            // both short-circuit before any request is issued.
            endpoint: "http://127.0.0.1:9".into(),
            api_key: "test-key".into(),
            index: "restaurants".into(),
            use_search,
        };
        Catalog::new(store, SearchClient::new(config).unwrap(), use_search)
    }

    #[tokio::test]
    async fn local_recommendations_are_empty() {
        let dir = tempdir().unwrap();
        let catalog = catalog(dir.path(), false);
        assert!(catalog.recommendations("42").await.unwrap().is_empty());
        // Without the external backend even junk text routes to the empty
        // local answer instead of a validation error.
        assert!(catalog.recommendations("abc").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_recommendations_validate_the_id() {
        let dir = tempdir().unwrap();
        let catalog = catalog(dir.path(), true);
        assert!(matches!(
            catalog.recommendations("abc").await,
            Err(ApiError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn by_id_misses_are_not_found() {
        let dir = tempdir().unwrap();
        let catalog = catalog(dir.path(), false);
        assert!(matches!(catalog.by_id(999), Err(ApiError::NotFound)));
    }

    #[tokio::test]
    async fn store_nearby_is_capped() {
        let dir = tempdir().unwrap();
        let catalog = catalog(dir.path(), false);
        let got = catalog.nearby(40.7218, -111.5043).await.unwrap();
        assert!(got.len() <= NEARBY_COUNT);
    }
}
