//! Parsed documentation corpus: named sections of items, plus the API entry index.

pub mod api;
pub mod parser;

use ahash::AHashMap;
use rmcp::schemars;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use api::{ApiEntry, ApiIndex, MethodDoc, ParamDoc, PropertyDoc, ReturnDoc};
pub use parser::parse_corpus;

/// Section holding the structured API records.
pub const API_SECTION: &str = "api-docs";

/// One discrete unit of content within a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub content: String,
    /// 1-based line of the item's first line in the source text. Metadata only.
    pub start_line: usize,
}

/// A named, ordered group of items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub items: Vec<Item>,
}

impl Section {
    pub fn category(&self) -> Category {
        Category::for_section(&self.name)
    }
}

/// Sections in first-appearance order with a name lookup.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    sections: Vec<Section>,
    by_name: AHashMap<String, usize>,
}

/// The name lookup is derived from `sections`, so equality is structural over sections.
impl PartialEq for Corpus {
    fn eq(&self, other: &Self) -> bool {
        self.sections == other.sections
    }
}

impl Eq for Corpus {}

impl Corpus {
    /// Parse raw corpus text. Equivalent to [`parse_corpus`].
    pub fn parse(text: &str) -> Self {
        parse_corpus(text)
    }

    /// Index of the section named `name`, creating it if needed.
    pub(crate) fn section_slot(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.by_name.get(name) {
            return idx;
        }
        let idx = self.sections.len();
        self.sections.push(Section {
            name: name.to_string(),
            items: Vec::new(),
        });
        self.by_name.insert(name.to_string(), idx);
        idx
    }

    pub(crate) fn push_item(&mut self, section: usize, item: Item) {
        self.sections[section].items.push(item);
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.by_name.get(name).map(|&idx| &self.sections[idx])
    }

    pub fn section_at(&self, idx: usize) -> Option<&Section> {
        self.sections.get(idx)
    }

    /// Sections in discovery order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Every item paired with its section, in section order then item order.
    pub fn items(&self) -> impl Iterator<Item = (&Section, &Item)> {
        self.sections
            .iter()
            .flat_map(|section| section.items.iter().map(move |item| (section, item)))
    }
}

/// Result category. A closed set derived from section names.
///
/// DO NOT add doc comments to individual variants - this causes schemars to generate
/// `oneOf` schemas instead of simple `enum` arrays, breaking MCP client enum handling.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Api,
    Guides,
    Community,
}

impl Category {
    pub fn for_section(name: &str) -> Self {
        if name == API_SECTION {
            Self::Api
        } else if name.starts_with("community") {
            Self::Community
        } else {
            Self::Guides
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Guides => "guides",
            Self::Community => "community",
        }
    }

    /// Parse a category filter. `all`, empty or absent mean "no filter"; any other
    /// unrecognized value is returned as the error.
    pub fn parse_filter(value: Option<&str>) -> Result<Option<Self>, String> {
        let Some(raw) = value.map(str::trim) else {
            return Ok(None);
        };
        match raw.to_ascii_lowercase().as_str() {
            "" | "all" => Ok(None),
            "api" => Ok(Some(Self::Api)),
            "guides" | "guide" => Ok(Some(Self::Guides)),
            "community" => Ok(Some(Self::Community)),
            _ => Err(raw.to_string()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
