use ember_docs_mcp::embedding::EmbeddingCapability;
use ember_docs_mcp::registry::RegistryClient;
use ember_docs_mcp::source::source_for;
use ember_docs_mcp::worker::spawn_initial_load;
use ember_docs_mcp::{Config, DocState, DocsServer};
use rmcp::{ServiceExt, transport::stdio};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ember_docs_mcp::tracing::init();
    tracing::info!("Starting ember-docs-mcp MCP server");

    let config = Config::load()?;
    tracing::debug!("Configuration: {:?}", config);

    // Model initialization can download and load weights
    let embedding_config = config.embedding.clone();
    let embedder =
        tokio::task::spawn_blocking(move || EmbeddingCapability::initialize(&embedding_config))
            .await?;

    let source = source_for(
        &config.docs_url,
        Duration::from_secs(config.request_timeout_secs),
    )?;
    let state = Arc::new(DocState::new(source, embedder));
    let registry = Arc::new(RegistryClient::new(&config)?);

    spawn_initial_load(Arc::clone(&state));

    let server = DocsServer::new(state, registry);
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("Error serving MCP server: {:?}", e);
    })?;

    service.waiting().await?;

    Ok(())
}
