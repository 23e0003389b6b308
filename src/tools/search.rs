//! Ranked search over the documentation corpus.

use crate::corpus::Category;
use crate::format;
use crate::worker::DocState;
use rmcp::schemars;
use serde::Deserialize;
use std::sync::Arc;

/// Upper bound on requested results.
const MAX_LIMIT: usize = 50;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchRequest {
    /// Search query, e.g. "tracked properties" or "route model hook"
    pub query: String,
    /// Restrict results to one category: "api", "guides", "community" or "all" (default)
    #[serde(default)]
    pub category: Option<String>,
    /// Maximum number of results to return (default: 5)
    #[serde(default = "default_limit")]
    pub limit: Option<usize>,
}

fn default_limit() -> Option<usize> {
    Some(5)
}

/// Execute a hybrid keyword/semantic search.
pub async fn handle_search(
    state: &Arc<DocState>,
    request: SearchRequest,
) -> Result<String, String> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err("Search query must not be empty".to_string());
    }

    let filter = Category::parse_filter(request.category.as_deref()).map_err(|unknown| {
        format!(
            "Unknown category '{}'; expected one of: api, guides, community, all",
            unknown
        )
    })?;
    let limit = request.limit.unwrap_or(5).clamp(1, MAX_LIMIT);

    let index = state.index().await.map_err(|e| e.to_string())?;
    let results = index
        .search(query, filter, limit)
        .await
        .map_err(|e| e.to_string())?;

    tracing::debug!(
        "search {:?} (category {:?}) returned {} result(s)",
        query,
        filter,
        results.len()
    );
    Ok(format::search_results(query, &results))
}
