//! npm package information with a package-manager-aware install command.

use crate::config::expand_tilde;
use crate::detection::{PackageManager, detect_package_manager};
use crate::format;
use crate::registry::RegistryClient;
use rmcp::schemars;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct NpmPackageRequest {
    /// npm package name, e.g. "ember-concurrency" or "@ember/test-helpers"
    pub package: String,
    /// Project directory used to detect the package manager (npm when omitted)
    #[serde(default)]
    pub project_path: Option<String>,
}

/// Package manager for an optional project path. Detection touches the filesystem, so it runs
/// on the blocking pool.
async fn resolve_package_manager(project_path: Option<&str>) -> PackageManager {
    let Some(path) = project_path.map(str::trim).filter(|p| !p.is_empty()) else {
        return PackageManager::default();
    };
    let path = PathBuf::from(expand_tilde(path).into_owned());

    tokio::task::spawn_blocking(move || detect_package_manager(&path))
        .await
        .unwrap_or_default()
}

pub async fn handle_npm_package(
    registry: &RegistryClient,
    request: NpmPackageRequest,
) -> Result<String, String> {
    let manager = resolve_package_manager(request.project_path.as_deref()).await;
    let info = registry
        .package_info(request.package.trim())
        .await
        .map_err(|e| e.to_string())?;
    Ok(format::package_info(&info, manager))
}
