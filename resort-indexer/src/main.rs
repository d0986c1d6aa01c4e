//! Offline refresh of the search index's recommendation data. One run pulls
//! a capped set of restaurant ids from the store, asks the recommendation
//! model for near-neighbors of each, and submits a single merge-upsert batch
//! to the search index. Each action is a merge, so repeated runs (and even
//! overlapping ones) are idempotent per document.
//!
//! Partial batch failures are logged by key and swallowed; the job still
//! exits 0. Rejected documents are picked up by the next scheduled run.

use anyhow::{Context, Result};
use clap::Parser;
use resort_core::config::{RecoConfig, SearchConfig};
use resort_core::store::Store;
use resort_core::{document_key, RecommendationEntry, RestaurantId, RECOMMENDATIONS_COUNT};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

const BATCH_API_VERSION: &str = "2016-09-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Upper bound on restaurants per run. Keeps the batch far below the search
/// index's per-batch action limit, so no pagination is needed.
const MAX_RESTAURANTS: usize = 20;

#[derive(Parser)]
#[command(name = "resort-indexer")]
#[command(about = "Refresh restaurant recommendations in the search index", long_about = None)]
struct Cli {
    /// Restaurant store directory
    #[arg(long, default_value = "./data")]
    data_dir: String,
    /// Write empty recommendation lists instead of querying the model
    /// (wipes stale data)
    #[arg(long, default_value_t = false)]
    clear: bool,
}

#[derive(Debug, Serialize, PartialEq)]
struct MergeAction {
    #[serde(rename = "@search.action")]
    action: &'static str,
    #[serde(rename = "RestaurantId")]
    restaurant_id: String,
    #[serde(rename = "RecommendedIds")]
    recommended_ids: Vec<String>,
}

#[derive(Serialize)]
struct IndexBatch {
    value: Vec<MergeAction>,
}

#[derive(Debug, Deserialize)]
struct IndexBatchResponse {
    value: Vec<IndexingResult>,
}

#[derive(Debug, Deserialize)]
struct IndexingResult {
    key: String,
    status: bool,
    #[serde(rename = "errorMessage", default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecoResponse {
    #[serde(rename = "ItemSet", default)]
    item_set: Vec<RecoItem>,
}

#[derive(Debug, Deserialize)]
struct RecoItem {
    #[serde(rename = "Id")]
    id: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let store = Store::open(&cli.data_dir)
        .with_context(|| format!("opening restaurant store at {}", cli.data_dir))?;
    let ids = store.ids(MAX_RESTAURANTS)?;
    info!(count = ids.len(), clear = cli.clear, "fetched restaurant ids");

    let search = SearchConfig::from_env();
    let reco = RecoConfig::from_env();
    let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

    let mut entries = Vec::with_capacity(ids.len());
    for &id in &ids {
        let recommended_ids = if cli.clear {
            Vec::new()
        } else {
            fetch_recommendations(&http, &reco, id, RECOMMENDATIONS_COUNT)
                .await
                .with_context(|| format!("recommendation lookup for restaurant {}", id))?
        };
        entries.push(RecommendationEntry { restaurant_id: id, recommended_ids });
    }

    let actions = build_actions(&entries);
    if actions.is_empty() {
        info!("store is empty, nothing to index");
        return Ok(());
    }

    let results = submit_batch(&http, &search, actions).await?;
    let (succeeded, failed_keys) = summarize(&results);
    if failed_keys.is_empty() {
        info!(items = results.len(), succeeded, "index batch complete");
    } else {
        // No retry here: merges are idempotent and the next run resubmits.
        warn!(
            items = results.len(),
            succeeded,
            failed = %failed_keys.join(", "),
            "index batch completed with failures"
        );
    }
    Ok(())
}

/// One GET to the recommendation model: up to `count` near-neighbor ids for
/// `id`, most relevant first. The model answers with string item ids, which
/// are validated into numeric restaurant ids here.
async fn fetch_recommendations(
    http: &reqwest::Client,
    reco: &RecoConfig,
    id: RestaurantId,
    count: usize,
) -> Result<Vec<RestaurantId>> {
    let url = format!(
        "{}/models/{}/recommend?itemId={}&count={}",
        reco.url, reco.model_id, id, count
    );
    let response: RecoResponse = http
        .get(&url)
        .basic_auth(&reco.user, Some(&reco.key))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    response
        .item_set
        .into_iter()
        .map(|item| {
            item.id
                .trim()
                .parse()
                .with_context(|| format!("model returned non-numeric item id {:?}", item.id))
        })
        .collect()
}

/// One merge action per entry. Every id is rendered with the index's
/// two-digit key convention.
fn build_actions(entries: &[RecommendationEntry]) -> Vec<MergeAction> {
    entries
        .iter()
        .map(|entry| MergeAction {
            action: "merge",
            restaurant_id: document_key(entry.restaurant_id),
            recommended_ids: entry.recommended_ids.iter().map(|&id| document_key(id)).collect(),
        })
        .collect()
}

async fn submit_batch(
    http: &reqwest::Client,
    search: &SearchConfig,
    actions: Vec<MergeAction>,
) -> Result<Vec<IndexingResult>> {
    let url = format!(
        "{}/indexes/{}/docs/index?api-version={}",
        search.endpoint, search.index, BATCH_API_VERSION
    );
    // A partial failure comes back as 207 with per-key statuses, which
    // error_for_status treats as success; only a wholly failed request
    // aborts the run.
    let response: IndexBatchResponse = http
        .post(&url)
        .header("api-key", &search.api_key)
        .json(&IndexBatch { value: actions })
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(response.value)
}

fn summarize(results: &[IndexingResult]) -> (usize, Vec<String>) {
    let succeeded = results.iter().filter(|r| r.status).count();
    let failed_keys = results
        .iter()
        .filter(|r| !r.status)
        .map(|r| r.key.clone())
        .collect();
    (succeeded, failed_keys)
}
