//! Direct API reference lookup.

use crate::format;
use crate::index::ApiLookup;
use crate::worker::DocState;
use rmcp::schemars;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ApiReferenceRequest {
    /// API name such as "Component", "Ember.Component" or "@ember/object"
    pub name: String,
    /// Optional kind to prefer when several entries share a name: "class", "module", ...
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

pub async fn handle_api_reference(
    state: &Arc<DocState>,
    request: ApiReferenceRequest,
) -> Result<String, String> {
    if request.name.trim().is_empty() {
        return Err("API name must not be empty".to_string());
    }

    let index = state.index().await.map_err(|e| e.to_string())?;
    match index.api_reference(&request.name, request.kind.as_deref()) {
        ApiLookup::Found { entry, deprecation } => {
            Ok(format::api_entry(&entry, deprecation.as_ref()))
        }
        ApiLookup::NotFound { query, suggestions } => {
            Ok(format::api_not_found(&query, &suggestions))
        }
    }
}
