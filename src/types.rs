use crate::corpus::Category;
use std::fmt;

/// Which ranker(s) produced a search result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    Keyword,
    Semantic,
    Hybrid,
}

impl MatchSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Semantic => "semantic",
            Self::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for MatchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub category: Category,
    pub excerpt: String,
    pub score: f64,
    pub url: String,
    pub api_link: Option<String>,
    pub source: MatchSource,
    /// Deprecation summary for API items that are tagged as deprecated.
    pub deprecation: Option<String>,
}

impl SearchResult {
    /// Identity used when merging ranked lists.
    pub fn key(&self) -> (String, String) {
        (self.title.clone(), self.url.clone())
    }
}

/// A best-practice item extracted for a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeResult {
    pub title: String,
    pub section: String,
    pub category: Category,
    pub url: String,
    pub score: u32,
    /// Up to 50 lines starting at the first line that mentions the topic.
    pub content: String,
    pub code_examples: Vec<String>,
    pub anti_patterns: Vec<String>,
}
