//! API entry extraction from the `api-docs` section.
//!
//! Each API item embeds a JSON record (optionally wrapped in `{"data": ...}`) after some
//! free text. Records are decoded best-effort: anything that fails to decode, or lacks a
//! name or an `attributes` object, is skipped without aborting the indexing pass.

use super::Item;
use crate::deprecation::DeprecationRegistry;
use ahash::AHashMap;
use serde::Deserialize;
use std::sync::Arc;

/// One documented API element (class, module, namespace...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEntry {
    pub name: String,
    /// Type tag such as `class` or `module`.
    pub kind: String,
    pub module: Option<String>,
    pub description: String,
    pub file: Option<String>,
    pub line: Option<u64>,
    /// Name of the parent class, not a live link.
    pub extends: Option<String>,
    pub methods: Vec<MethodDoc>,
    pub properties: Vec<PropertyDoc>,
}

impl ApiEntry {
    /// Last `.`-separated segment of the name (`Component` for `Ember.Component`).
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Canonical API documentation URL.
    pub fn url(&self) -> String {
        if self.kind.eq_ignore_ascii_case("module") {
            let module = self.module.as_deref().unwrap_or(&self.name);
            format!("https://api.emberjs.com/ember/release/modules/{}", module)
        } else {
            format!("https://api.emberjs.com/ember/release/classes/{}", self.name)
        }
    }

    pub fn kind_matches(&self, hint: &str) -> bool {
        self.kind.eq_ignore_ascii_case(hint.trim())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MethodDoc {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub params: Vec<ParamDoc>,
    #[serde(default, rename = "return")]
    pub returns: Option<ReturnDoc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ParamDoc {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReturnDoc {
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PropertyDoc {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Record envelope: either `{"data": {...}}` or the body itself.
#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    data: Option<RawRecord>,
    #[serde(flatten)]
    inline: RawRecord,
}

#[derive(Debug, Default, Deserialize)]
struct RawRecord {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    attributes: Option<RawAttributes>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAttributes {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    shortname: Option<String>,
    #[serde(default)]
    module: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    line: Option<serde_json::Value>,
    #[serde(default)]
    extends: Option<String>,
    #[serde(default)]
    itemtype: Option<String>,
    #[serde(default)]
    methods: Option<Vec<MethodDoc>>,
    #[serde(default)]
    properties: Option<Vec<PropertyDoc>>,
}

/// Carve the `{ ... }` span out of an item's text: first `{` through last `}`.
pub fn record_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Why an item produced no entry. Only used for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSkip {
    NoRecord,
    Malformed(String),
    MissingAttributes,
    MissingName,
}

/// Decode an item's embedded record into an [`ApiEntry`].
pub fn decode_entry(text: &str) -> Result<ApiEntry, RecordSkip> {
    let span = record_span(text).ok_or(RecordSkip::NoRecord)?;
    let envelope: RawEnvelope =
        serde_json::from_str(span).map_err(|e| RecordSkip::Malformed(e.to_string()))?;

    let record = envelope.data.unwrap_or(envelope.inline);
    let attributes = record.attributes.ok_or(RecordSkip::MissingAttributes)?;

    let name = attributes
        .name
        .filter(|n| !n.trim().is_empty())
        .or_else(|| attributes.shortname.filter(|n| !n.trim().is_empty()))
        .ok_or(RecordSkip::MissingName)?;

    let line = attributes.line.as_ref().and_then(|value| match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    });

    Ok(ApiEntry {
        name: name.trim().to_string(),
        kind: record
            .kind
            .or(attributes.itemtype)
            .unwrap_or_else(|| "class".to_string()),
        module: attributes.module.filter(|m| !m.trim().is_empty()),
        description: attributes.description.unwrap_or_default(),
        file: attributes.file,
        line,
        extends: attributes.extends,
        methods: attributes.methods.unwrap_or_default(),
        properties: attributes.properties.unwrap_or_default(),
    })
}

/// Lookup keys for an entry: lower-cased name, module path, and last name segment.
pub fn lookup_keys(entry: &ApiEntry) -> Vec<String> {
    let mut keys = vec![entry.name.to_lowercase()];
    if let Some(module) = &entry.module {
        keys.push(module.to_lowercase());
    }
    if entry.name.contains('.') {
        keys.push(entry.short_name().to_lowercase());
    }
    keys.dedup();
    keys
}

/// Name-keyed API entries. Read-only once built; entries are shared between keys.
#[derive(Debug, Clone, Default)]
pub struct ApiIndex {
    keys: AHashMap<String, Arc<ApiEntry>>,
    /// Distinct entries in source order.
    entries: Vec<Arc<ApiEntry>>,
    /// Entry decoded from each API-section item, aligned with the section's items.
    by_item: Vec<Option<Arc<ApiEntry>>>,
}

impl ApiIndex {
    /// Index the API section's items, forwarding each entry to the deprecation registry.
    pub fn build(items: &[Item], deprecations: &mut DeprecationRegistry) -> Self {
        let mut index = Self::default();
        let mut skipped = 0usize;

        for (idx, item) in items.iter().enumerate() {
            match decode_entry(&item.content) {
                Ok(entry) => {
                    deprecations.record(&entry.name, &entry.description);
                    let entry = Arc::new(entry);
                    // Last write wins on colliding keys
                    for key in lookup_keys(&entry) {
                        index.keys.insert(key, entry.clone());
                    }
                    index.entries.push(entry.clone());
                    index.by_item.push(Some(entry));
                }
                Err(reason) => {
                    tracing::debug!(
                        "Skipping API item {} (line {}): {:?}",
                        idx,
                        item.start_line,
                        reason
                    );
                    skipped += 1;
                    index.by_item.push(None);
                }
            }
        }

        tracing::debug!(
            "Indexed {} API entries under {} keys ({} items skipped)",
            index.entries.len(),
            index.keys.len(),
            skipped
        );

        index
    }

    /// Exact lookup by key (case-insensitive).
    pub fn get(&self, key: &str) -> Option<&Arc<ApiEntry>> {
        self.keys.get(&key.trim().to_lowercase())
    }

    /// Entry decoded from the `idx`-th API item, if any.
    pub fn entry_for_item(&self, idx: usize) -> Option<&Arc<ApiEntry>> {
        self.by_item.get(idx).and_then(Option::as_ref)
    }

    pub fn entries(&self) -> &[Arc<ApiEntry>] {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }
}
