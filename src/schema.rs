//! JSON schemas for tool inputs.

use rmcp::model::JsonObject;
use rmcp::schemars::{self, JsonSchema, generate::SchemaSettings};
use std::sync::Arc;

/// Generate an inline JSON schema for MCP tools
///
/// Unlike rmcp's default `schema_for_type()`, this sets `inline_subschemas = true` so nested
/// definitions are emitted in place instead of as `$ref`s, which some MCP clients can't follow.
pub fn inline_schema_for_type<T: JsonSchema>() -> Arc<JsonObject> {
    let mut settings = SchemaSettings::draft07();
    settings.transforms = vec![Box::new(schemars::transform::AddNullable::default())];
    settings.inline_subschemas = true;

    let schema = settings.into_generator().into_root_schema_for::<T>();
    let object = match serde_json::to_value(schema) {
        Ok(serde_json::Value::Object(object)) => object,
        other => {
            tracing::error!(
                "Schema for {} did not serialize to an object: {:?}",
                std::any::type_name::<T>(),
                other
            );
            JsonObject::new()
        }
    };

    Arc::new(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::SearchRequest;
    use assert2::{check, let_assert};

    #[test]
    fn test_search_schema_is_inline() {
        let schema = inline_schema_for_type::<SearchRequest>();
        let_assert!(Some(serde_json::Value::Object(properties)) = schema.get("properties"));
        check!(properties.contains_key("query"));
        check!(properties.contains_key("category"));
        check!(!schema.contains_key("definitions"));
    }
}
