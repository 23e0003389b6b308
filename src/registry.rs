//! npm registry and Ember release-list clients.

use crate::config::Config;
use crate::error::{DocsError, Result};
use crate::source::http_client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Versions listed in package info, newest first.
const MAX_RECENT_VERSIONS: usize = 10;
/// Release tags listed in version info, newest first.
const MAX_RECENT_RELEASES: usize = 5;

/// Package the release list belongs to, used in error reports.
const EMBER_PACKAGE: &str = "ember-source";

/// Raw npm "packument" (the registry's package document).
#[derive(Debug, Deserialize)]
struct Packument {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, rename = "dist-tags")]
    dist_tags: BTreeMap<String, String>,
    /// Version → publish time, plus `created`, `modified` and, for unpublished packages, an
    /// `unpublished` object.
    #[serde(default)]
    time: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    homepage: Option<String>,
    /// Either a URL string or `{ "type": "git", "url": ... }`.
    #[serde(default)]
    repository: Option<serde_json::Value>,
    /// Either an SPDX string or `{ "type": ... }`.
    #[serde(default)]
    license: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageVersion {
    pub version: String,
    pub published: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub name: String,
    pub latest: Option<String>,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub repository: Option<String>,
    pub license: Option<String>,
    pub recent_versions: Vec<PackageVersion>,
}

fn string_or_field(value: Option<serde_json::Value>, field: &str) -> Option<String> {
    match value? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Object(map) => map.get(field)?.as_str().map(str::to_string),
        _ => None,
    }
}

impl PackageInfo {
    /// Decode a packument body.
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        let raw: Packument = serde_json::from_str(body)?;

        let mut recent_versions: Vec<PackageVersion> = raw
            .time
            .into_iter()
            .filter(|(version, _)| version != "created" && version != "modified")
            .filter_map(|(version, published)| match published {
                serde_json::Value::String(published) => Some(PackageVersion { version, published }),
                _ => None,
            })
            .collect();
        // ISO-8601 timestamps order lexically
        recent_versions.sort_by(|a, b| b.published.cmp(&a.published));
        recent_versions.truncate(MAX_RECENT_VERSIONS);

        Ok(Self {
            name: raw.name,
            latest: raw.dist_tags.get("latest").cloned(),
            description: raw.description.filter(|d| !d.trim().is_empty()),
            homepage: raw.homepage,
            repository: string_or_field(raw.repository, "url").map(|url| clean_repository_url(&url)),
            license: string_or_field(raw.license, "type"),
            recent_versions,
        })
    }
}

/// `git+https://github.com/x/y.git` → `https://github.com/x/y`.
fn clean_repository_url(url: &str) -> String {
    let url = url.strip_prefix("git+").unwrap_or(url);
    let url = url.strip_suffix(".git").unwrap_or(url);
    url.replace("git://", "https://")
}

/// Registry path segment for a package; scoped names keep the `@` and escape the `/`.
pub fn encode_package_name(package: &str) -> String {
    package.trim().replace('/', "%2F")
}

/// One entry of the GitHub release list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub draft: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    /// Newest published, non-prerelease release.
    pub latest_stable: Option<Release>,
    /// Newest published release tags (prereleases included).
    pub recent: Vec<String>,
}

impl VersionInfo {
    pub fn from_releases(mut releases: Vec<Release>) -> Self {
        releases.retain(|release| !release.draft);
        releases.sort_by(|a, b| b.published_at.cmp(&a.published_at));

        let latest_stable = releases.iter().find(|release| !release.prerelease).cloned();
        let recent = releases
            .iter()
            .take(MAX_RECENT_RELEASES)
            .map(|release| release.tag_name.clone())
            .collect();

        Self {
            latest_stable,
            recent,
        }
    }
}

/// HTTP client for the npm registry and the release list.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: reqwest::Client,
    npm_registry_url: String,
    releases_url: String,
}

impl RegistryClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: http_client(Duration::from_secs(config.request_timeout_secs))?,
            npm_registry_url: config.npm_registry_url.trim_end_matches('/').to_string(),
            releases_url: config.releases_url.clone(),
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, reqwest::Error> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }

    pub async fn package_info(&self, package: &str) -> Result<PackageInfo, DocsError> {
        let registry_error = |message: String| DocsError::Registry {
            package: package.to_string(),
            message,
        };

        if package.trim().is_empty() {
            return Err(registry_error("package name is empty".to_string()));
        }

        let url = format!("{}/{}", self.npm_registry_url, encode_package_name(package));
        tracing::debug!("Fetching package info from {}", url);

        let body = self.get_text(&url).await.map_err(|e| {
            if e.status() == Some(reqwest::StatusCode::NOT_FOUND) {
                registry_error("package not found".to_string())
            } else {
                registry_error(e.to_string())
            }
        })?;

        PackageInfo::from_json(&body).map_err(|e| registry_error(format!("invalid response: {}", e)))
    }

    pub async fn version_info(&self) -> Result<VersionInfo, DocsError> {
        let registry_error = |message: String| DocsError::Registry {
            package: EMBER_PACKAGE.to_string(),
            message,
        };

        let body = self
            .get_text(&self.releases_url)
            .await
            .map_err(|e| registry_error(e.to_string()))?;
        let releases: Vec<Release> = serde_json::from_str(&body)
            .map_err(|e| registry_error(format!("invalid response: {}", e)))?;

        Ok(VersionInfo::from_releases(releases))
    }
}
