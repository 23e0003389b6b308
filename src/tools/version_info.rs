//! Latest Ember release information.

use crate::format;
use crate::registry::RegistryClient;

pub async fn handle_version_info(registry: &RegistryClient) -> Result<String, String> {
    let info = registry.version_info().await.map_err(|e| e.to_string())?;
    Ok(format::version_info(&info))
}
