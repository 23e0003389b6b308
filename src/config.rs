//! Server configuration: defaults, an optional TOML file, then environment overrides.

use crate::error::Result;
use anyhow::Context;
use serde::Deserialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Aggregated documentation corpus served by default.
pub const DEFAULT_DOCS_URL: &str =
    "https://nullvoxpopuli.github.io/ember-ai-information-aggregation/llms-full.txt";
pub const DEFAULT_NPM_REGISTRY_URL: &str = "https://registry.npmjs.org";
pub const DEFAULT_RELEASES_URL: &str = "https://api.github.com/repos/emberjs/ember.js/releases";

const CONFIG_ENV: &str = "EMBER_DOCS_MCP_CONFIG";
const DOCS_URL_ENV: &str = "EMBER_DOCS_URL";
const EMBEDDINGS_ENV: &str = "EMBER_DOCS_EMBEDDINGS";
const EMBEDDING_MODEL_ENV: &str = "EMBER_DOCS_EMBEDDING_MODEL";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub docs_url: String,
    pub npm_registry_url: String,
    pub releases_url: String,
    pub request_timeout_secs: u64,
    pub embedding: EmbeddingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            docs_url: DEFAULT_DOCS_URL.to_string(),
            npm_registry_url: DEFAULT_NPM_REGISTRY_URL.to_string(),
            releases_url: DEFAULT_RELEASES_URL.to_string(),
            request_timeout_secs: 30,
            embedding: EmbeddingConfig::default(),
        }
    }
}

/// Which embedding backend (if any) feeds the semantic ranker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    Disabled,
    #[default]
    Hashing,
    Local,
}

impl EmbeddingProvider {
    /// Parse a provider name; unknown names disable embeddings rather than failing startup.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "hashing" => Self::Hashing,
            "local" => Self::Local,
            "disabled" | "none" | "off" => Self::Disabled,
            other => {
                tracing::warn!("Unknown embedding provider '{}', semantic search disabled", other);
                Self::Disabled
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    /// Model name for the `local` provider.
    pub model: String,
    /// Vector size for the `hashing` provider.
    pub dims: usize,
    /// Number of memoized embeddings kept in memory.
    pub cache_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Hashing,
            model: "all-minilm-l6-v2".to_string(),
            dims: 384,
            cache_size: 1024,
        }
    }
}

impl Config {
    /// Load configuration from the config file (if any) and the environment.
    pub fn load() -> Result<Self> {
        let mut config = match config_file_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a TOML config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment overrides through `lookup` so tests don't touch process state.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(DOCS_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.docs_url = url;
        }
        if let Some(provider) = lookup(EMBEDDINGS_ENV) {
            self.embedding.provider = EmbeddingProvider::parse_lenient(&provider);
        }
        if let Some(model) = lookup(EMBEDDING_MODEL_ENV).filter(|v| !v.trim().is_empty()) {
            self.embedding.model = model;
        }
    }
}

/// Resolve the config file location: `$EMBER_DOCS_MCP_CONFIG`, else the user config dir.
fn config_file_path() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(expand_tilde(&explicit).into_owned()));
    }
    dirs::config_dir().map(|dir| dir.join("ember-docs-mcp").join("config.toml"))
}

/// Expands tilde (`~`) in a path to the user's home directory.
///
/// - `~/foo` becomes `/home/user/foo`
/// - `~` becomes `/home/user`
/// - Other paths are returned unchanged
pub fn expand_tilde(path: &str) -> Cow<'_, str> {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped).display().to_string());
        }
    } else if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Cow::Owned(home.display().to_string());
    }
    Cow::Borrowed(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        check!(config.docs_url == DEFAULT_DOCS_URL);
        check!(config.embedding.provider == EmbeddingProvider::Hashing);
        check!(config.embedding.dims == 384);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            docs_url = "http://localhost:8080/llms-full.txt"

            [embedding]
            provider = "disabled"
            "#,
        )
        .unwrap();

        check!(config.docs_url == "http://localhost:8080/llms-full.txt");
        check!(config.embedding.provider == EmbeddingProvider::Disabled);
        check!(config.embedding.cache_size == 1024);
        check!(config.npm_registry_url == DEFAULT_NPM_REGISTRY_URL);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            "EMBER_DOCS_URL" => Some("http://example.test/docs.txt".to_string()),
            "EMBER_DOCS_EMBEDDINGS" => Some("local".to_string()),
            _ => None,
        });

        check!(config.docs_url == "http://example.test/docs.txt");
        check!(config.embedding.provider == EmbeddingProvider::Local);
        check!(config.embedding.model == "all-minilm-l6-v2");
    }

    #[rstest]
    #[case("hashing", EmbeddingProvider::Hashing)]
    #[case("LOCAL", EmbeddingProvider::Local)]
    #[case("off", EmbeddingProvider::Disabled)]
    #[case("quantum", EmbeddingProvider::Disabled)]
    fn test_parse_provider(#[case] input: &str, #[case] expected: EmbeddingProvider) {
        check!(EmbeddingProvider::parse_lenient(input) == expected);
    }

    #[test]
    fn test_expand_tilde_passthrough() {
        check!(expand_tilde("/etc/config.toml") == "/etc/config.toml");
    }
}
