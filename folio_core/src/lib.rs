// src/lib.rs
pub mod config;
pub mod connectors;
pub mod error;
pub mod mcp_server;
pub mod transport;
pub mod utils;

use std::collections::HashMap;
use std::sync::Arc;

// Re-export types from rmcp that users of the library need
pub use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, InitializeRequestParam,
    InitializeResult, ListToolsResult, PaginatedRequestParam, ProtocolVersion, RawContent,
    ServerCapabilities, TextContent, Tool,
};

use crate::config::NotesConfig;
pub use crate::error::ConnectorError;
use async_trait::async_trait;

#[async_trait]
pub trait Connector: Send + Sync {
    /// Returns the unique name of the connector.
    fn name(&self) -> &'static str;

    /// Returns a description of the connector.
    fn description(&self) -> &'static str;

    /// Returns the MCP capabilities of this connector.
    async fn capabilities(&self) -> ServerCapabilities;

    async fn initialize(
        &self,
        request: InitializeRequestParam,
    ) -> Result<InitializeResult, ConnectorError>;
    async fn list_tools(
        &self,
        request: Option<PaginatedRequestParam>,
    ) -> Result<ListToolsResult, ConnectorError>;
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, ConnectorError>;
}

/// Connectors by name. Built once at startup and handed to the server.
pub struct ProviderRegistry {
    pub providers: HashMap<String, Arc<dyn Connector>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        ProviderRegistry {
            providers: HashMap::new(),
        }
    }

    pub fn register_provider(&mut self, provider: Box<dyn Connector>) {
        self.providers
            .insert(provider.name().to_string(), Arc::from(provider));
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the registry the server runs with.
pub fn build_registry(config: &NotesConfig) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    registry.register_provider(Box::new(
        connectors::apple_notes::AppleNotesConnector::new(config),
    ));
    registry
}
