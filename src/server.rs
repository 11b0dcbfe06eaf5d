//! MCP server exposing the search pipeline as tools.

use crate::franchise::FranchiseTable;
use crate::search::SearchPipeline;
use crate::tools::list_franchises::{ListFranchisesRequest, handle_list_franchises};
use crate::tools::search::{SearchGamesRequest, handle_search_games};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars::{self, JsonSchema, generate::SchemaSettings},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

/// MCP server for game search queries
#[derive(Clone)]
pub struct GameSearchServer {
    pipeline: Arc<SearchPipeline>,
    franchises: Arc<FranchiseTable>,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for GameSearchServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSearchServer")
            .field("pipeline", &self.pipeline)
            .field("franchises", &self.franchises.franchises().len())
            .finish()
    }
}

#[tool_router]
impl GameSearchServer {
    pub fn new(pipeline: Arc<SearchPipeline>, franchises: Arc<FranchiseTable>) -> Self {
        Self {
            pipeline,
            franchises,
            tool_router: Self::tool_router(),
        }
    }

    pub fn pipeline(&self) -> &Arc<SearchPipeline> {
        &self.pipeline
    }

    #[tool(
        description = "Search for video games by title, franchise or abbreviation. Combines the local catalog with the external metadata provider, hides fan-made and micro-content entries, and ranks canonical franchise entries first. Returns a numbered list with scores and ranking reasons.",
        input_schema = inline_schema_for_type::<SearchGamesRequest>()
    )]
    async fn search_games(
        &self,
        Parameters(request): Parameters<SearchGamesRequest>,
    ) -> std::result::Result<String, String> {
        handle_search_games(&self.pipeline, request).await
    }

    #[tool(
        description = "List known game franchises, or show one franchise's flagship entries with their significance, release year and platforms.",
        input_schema = inline_schema_for_type::<ListFranchisesRequest>()
    )]
    async fn list_franchises(
        &self,
        Parameters(request): Parameters<ListFranchisesRequest>,
    ) -> std::result::Result<String, String> {
        handle_list_franchises(&self.franchises, request)
    }
}

#[tool_handler]
impl ServerHandler for GameSearchServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "game-search: ranked video game search. \
                 Use search_games with a title, franchise or abbreviation (e.g. 'zelda', 'gta 5'). \
                 Use list_franchises to see which franchises get flagship-aware ranking.",
            )
    }
}

/// Generate an inline JSON schema for MCP tools
///
/// Unlike rmcp's default `schema_for_type()`, this sets `inline_subschemas = true`
/// so nested types are emitted inline instead of as `$ref` patterns.
pub fn inline_schema_for_type<T: JsonSchema>() -> Arc<JsonObject> {
    let mut settings = SchemaSettings::draft07();
    settings.transforms = vec![Box::new(schemars::transform::AddNullable::default())];
    settings.inline_subschemas = true;

    let generator = settings.into_generator();
    let schema = generator.into_root_schema_for::<T>();
    let object = match serde_json::to_value(schema) {
        Ok(serde_json::Value::Object(object)) => object,
        _ => {
            tracing::error!("Schema serialization produced a non-object value");
            JsonObject::new()
        }
    };

    Arc::new(object)
}
