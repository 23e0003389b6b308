//! MCP server exposing the documentation tools over rmcp.

use crate::registry::RegistryClient;
use crate::schema::inline_schema_for_type;
use crate::tools::{
    ApiReferenceRequest, BestPracticesRequest, NpmPackageRequest, SearchRequest,
    handle_api_reference, handle_best_practices, handle_npm_package, handle_search,
    handle_version_info,
};
use crate::worker::DocState;
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

/// MCP server for Ember documentation queries
#[derive(Clone)]
pub struct DocsServer {
    /// Shared documentation state (current index, in-flight load)
    state: Arc<DocState>,

    /// npm registry and release-list client
    registry: Arc<RegistryClient>,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for DocsServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocsServer")
            .field("state", &self.state)
            .field("registry", &self.registry)
            .finish()
    }
}

#[tool_router]
impl DocsServer {
    pub fn new(state: Arc<DocState>, registry: Arc<RegistryClient>) -> Self {
        Self {
            state,
            registry,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Search the Ember.js documentation (API reference, guides and community articles). Combines keyword ranking with semantic similarity and returns titled excerpts with links. Filter with category: api, guides, community or all.",
        input_schema = inline_schema_for_type::<SearchRequest>()
    )]
    async fn search_ember_docs(
        &self,
        Parameters(request): Parameters<SearchRequest>,
    ) -> std::result::Result<String, String> {
        handle_search(&self.state, request).await
    }

    #[tool(
        description = "Get the API reference for an Ember class, module or namespace, e.g. 'Component', 'Ember.Component' or 'RouterService'. Returns module, inheritance, methods, properties and deprecation status. Suggests close names when nothing matches.",
        input_schema = inline_schema_for_type::<ApiReferenceRequest>()
    )]
    async fn get_api_reference(
        &self,
        Parameters(request): Parameters<ApiReferenceRequest>,
    ) -> std::result::Result<String, String> {
        handle_api_reference(&self.state, request).await
    }

    #[tool(
        description = "Get Ember best practices for a topic, with recommended code examples and anti-patterns to avoid, drawn from the guides and community articles.",
        input_schema = inline_schema_for_type::<BestPracticesRequest>()
    )]
    async fn get_best_practices(
        &self,
        Parameters(request): Parameters<BestPracticesRequest>,
    ) -> std::result::Result<String, String> {
        handle_best_practices(&self.state, request).await
    }

    #[tool(
        description = "Get the latest stable Ember.js release with its publish date and link, plus the most recent release tags."
    )]
    async fn get_ember_version_info(&self) -> std::result::Result<String, String> {
        handle_version_info(&self.registry).await
    }

    #[tool(
        description = "Get npm package information (latest version, description, repository, license, recent versions) and an install command for the package manager used by the project at project_path.",
        input_schema = inline_schema_for_type::<NpmPackageRequest>()
    )]
    async fn get_npm_package_info(
        &self,
        Parameters(request): Parameters<NpmPackageRequest>,
    ) -> std::result::Result<String, String> {
        handle_npm_package(&self.registry, request).await
    }
}

#[tool_handler]
impl ServerHandler for DocsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "ember-docs-mcp: Ember.js documentation search. \
                 The documentation corpus loads in the background on startup. \
                 Use search_ember_docs for open questions, get_api_reference for a known API name \
                 and get_best_practices for guidance on a topic."
                    .to_string(),
            )
    }
}
