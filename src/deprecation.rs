//! Deprecation tracking for API entries.
//!
//! Entries are recorded once while the API index is built; afterwards the registry is only
//! read, so every reference to an entry sees the same tagging.

use ahash::AHashMap;
use regex::Regex;
use std::sync::LazyLock;

static DEPRECATED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bdeprecated\b").expect("valid regex"));

static SINCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)deprecated\s+(?:since|in|as of)\s+(?:ember\s+)?v?(\d+(?:\.\d+)*)")
        .expect("valid regex")
});

static REPLACEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\buse\s+`?([\w.@/-]+)`?\s+instead").expect("valid regex")
});

/// What is known about a deprecated API element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecationInfo {
    pub since: Option<String>,
    pub replacement: Option<String>,
}

impl DeprecationInfo {
    /// One-line human summary, e.g. `Deprecated since 3.27, use @ember/helper instead`.
    pub fn summary(&self) -> String {
        let mut out = String::from("Deprecated");
        if let Some(since) = &self.since {
            out.push_str(" since ");
            out.push_str(since);
        }
        if let Some(replacement) = &self.replacement {
            out.push_str(", use ");
            out.push_str(replacement);
            out.push_str(" instead");
        }
        out
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeprecationRegistry {
    entries: AHashMap<String, DeprecationInfo>,
}

impl DeprecationRegistry {
    /// Inspect an entry's description and tag it if it reads as deprecated.
    pub fn record(&mut self, name: &str, description: &str) {
        if !DEPRECATED.is_match(description) {
            return;
        }

        let since = SINCE.captures(description).map(|c| c[1].to_string());
        let replacement = REPLACEMENT
            .captures(description)
            .map(|c| c[1].trim_end_matches('.').to_string());

        tracing::trace!("Tagged {} as deprecated", name);
        self.entries
            .insert(name.to_lowercase(), DeprecationInfo { since, replacement });
    }

    pub fn lookup(&self, name: &str) -> Option<&DeprecationInfo> {
        self.entries.get(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
