//! Environment-sourced configuration for the external services. Loaded once
//! at process start; nothing re-reads the environment afterwards.

use std::env;

/// Connection settings for the external search index, plus the toggle that
/// selects it over the local store for geo and recommendation queries.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Base URL of the search service, e.g. `https://resort.search.example.net`.
    pub endpoint: String,
    pub api_key: String,
    /// Index (collection) name holding the restaurant documents.
    pub index: String,
    /// When false, geo queries hit the store and recommendations are empty.
    pub use_search: bool,
}

impl SearchConfig {
    pub fn from_env() -> Self {
        Self {
            endpoint: env::var("SEARCH_ENDPOINT").unwrap_or_default(),
            api_key: env::var("SEARCH_API_KEY").unwrap_or_default(),
            index: env::var("SEARCH_INDEX").unwrap_or_else(|_| "restaurants".into()),
            use_search: flag("USE_SEARCH_BACKEND"),
        }
    }
}

/// Connection settings for the offline recommendation-model service used by
/// the indexing job.
#[derive(Debug, Clone)]
pub struct RecoConfig {
    pub url: String,
    pub user: String,
    pub key: String,
    pub model_id: String,
}

impl RecoConfig {
    pub fn from_env() -> Self {
        Self {
            url: env::var("RECO_URL").unwrap_or_default(),
            user: env::var("RECO_USER").unwrap_or_default(),
            key: env::var("RECO_KEY").unwrap_or_default(),
            model_id: env::var("RECO_MODEL_ID").unwrap_or_default(),
        }
    }
}

fn flag(key: &str) -> bool {
    env::var(key)
        .ok()
        .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "True"))
        .unwrap_or(false)
}
