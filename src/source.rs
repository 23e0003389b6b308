//! Where the corpus text comes from.
//!
//! The index only needs one UTF-8 blob per load. A fetch failure fails that load; the caller
//! retries by loading again.

use crate::config::expand_tilde;
use crate::error::{DocsError, Result};
use anyhow::Context;
use futures::future::BoxFuture;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub(crate) const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A supplier of raw corpus text.
pub trait CorpusSource: Send + Sync {
    /// Human-readable location, used in logs and load errors.
    fn location(&self) -> &str;

    fn fetch(&self) -> BoxFuture<'_, Result<String, DocsError>>;
}

/// HTTP client shared by the remote collaborators.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")
}

/// Fetches the corpus over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            url: url.into(),
            client: http_client(timeout)?,
        })
    }

    async fn fetch_text(&self) -> Result<String, reqwest::Error> {
        self.client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

impl CorpusSource for HttpSource {
    fn location(&self) -> &str {
        &self.url
    }

    fn fetch(&self) -> BoxFuture<'_, Result<String, DocsError>> {
        Box::pin(async move {
            tracing::info!("Fetching documentation from {}", self.url);
            self.fetch_text().await.map_err(|e| DocsError::Load {
                source_url: self.url.clone(),
                message: e.to_string(),
            })
        })
    }
}

/// Reads the corpus from a local file (`file://` URLs or plain paths).
#[derive(Debug, Clone)]
pub struct FileSource {
    location: String,
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: &str) -> Self {
        let path = path.strip_prefix("file://").unwrap_or(path);
        Self {
            location: path.to_string(),
            path: PathBuf::from(expand_tilde(path).into_owned()),
        }
    }
}

impl CorpusSource for FileSource {
    fn location(&self) -> &str {
        &self.location
    }

    fn fetch(&self) -> BoxFuture<'_, Result<String, DocsError>> {
        Box::pin(async move {
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|e| DocsError::Load {
                    source_url: self.location.clone(),
                    message: e.to_string(),
                })
        })
    }
}

/// An in-memory corpus.
#[derive(Debug, Clone)]
pub struct StaticSource {
    text: String,
}

impl StaticSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl CorpusSource for StaticSource {
    fn location(&self) -> &str {
        "memory"
    }

    fn fetch(&self) -> BoxFuture<'_, Result<String, DocsError>> {
        let text = self.text.clone();
        Box::pin(async move { Ok(text) })
    }
}

/// Pick a source for a configured location: HTTP(S) URLs are fetched, anything else is read
/// from disk.
pub fn source_for(location: &str, timeout: Duration) -> Result<Arc<dyn CorpusSource>> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Arc::new(HttpSource::new(location, timeout)?))
    } else {
        Ok(Arc::new(FileSource::new(location)))
    }
}
