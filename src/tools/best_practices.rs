//! Best-practice guidance for a topic.

use crate::format;
use crate::worker::DocState;
use rmcp::schemars;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct BestPracticesRequest {
    /// Topic to get guidance on, e.g. "component state" or "testing services"
    pub topic: String,
}

pub async fn handle_best_practices(
    state: &Arc<DocState>,
    request: BestPracticesRequest,
) -> Result<String, String> {
    let topic = request.topic.trim();
    if topic.is_empty() {
        return Err("Topic must not be empty".to_string());
    }

    let index = state.index().await.map_err(|e| e.to_string())?;
    let practices = index.best_practices(topic);
    Ok(format::practices(topic, &practices))
}
