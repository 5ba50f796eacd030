use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{Connector, ConnectorError, ProviderRegistry};
use rmcp::model::*;

/// MCP Server implementation that wraps the ProviderRegistry.
///
/// Tool routing is fixed at construction: every connector's `list_tools` is
/// read once and each tool name is bound to the connector that declared it.
pub struct McpServer {
    registry: Arc<ProviderRegistry>,
    tools: Vec<Tool>,
    tool_index: HashMap<String, Arc<dyn Connector>>,
}

impl McpServer {
    pub async fn build(registry: ProviderRegistry) -> Result<Self, ConnectorError> {
        let mut tools = Vec::new();
        let mut tool_index: HashMap<String, Arc<dyn Connector>> = HashMap::new();

        let mut names: Vec<&String> = registry.providers.keys().collect();
        names.sort();
        for name in names {
            let connector = &registry.providers[name];
            let listed = connector.list_tools(None).await?;
            for tool in listed.tools {
                let tool_name = tool.name.to_string();
                if tool_index.contains_key(&tool_name) {
                    warn!(
                        tool = %tool_name,
                        connector = %name,
                        "duplicate tool name, keeping the first registration"
                    );
                    continue;
                }
                tool_index.insert(tool_name, connector.clone());
                tools.push(tool);
            }
        }

        info!(tools = tools.len(), "tool index built");
        Ok(Self {
            registry: Arc::new(registry),
            tools,
            tool_index,
        })
    }

    /// Get aggregated capabilities from all connectors
    pub async fn get_capabilities(&self) -> ServerCapabilities {
        let mut capabilities = ServerCapabilities::default();
        for connector in self.registry.providers.values() {
            let conn_caps = connector.capabilities().await;
            if conn_caps.tools.is_some() {
                capabilities.tools = conn_caps.tools;
            }
        }
        capabilities
    }

    pub async fn handle_initialize(
        &self,
        _request: InitializeRequestParam,
    ) -> Result<InitializeResult, ConnectorError> {
        info!("MCP Server initializing");

        Ok(InitializeResult {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: self.get_capabilities().await,
            server_info: Implementation {
                name: "folio".to_string(),
                title: Some("Folio".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Apple Notes tools: list, read, create and update notes as Markdown or HTML. Requires macOS with Notes.app automation permission."
                    .to_string(),
            ),
        })
    }

    pub async fn handle_list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
    ) -> Result<ListToolsResult, ConnectorError> {
        Ok(ListToolsResult {
            tools: self.tools.clone(),
            next_cursor: None,
        })
    }

    /// Route a call to the connector that owns the tool.
    pub async fn handle_call_tool(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, ConnectorError> {
        let connector = self
            .tool_index
            .get(request.name.as_ref())
            .ok_or(ConnectorError::ToolNotFound)?;
        debug!(tool = %request.name, connector = connector.name(), "routing tool call");
        connector.call_tool(request).await
    }
}

/// JSON-RPC handler for MCP protocol
pub struct JsonRpcHandler {
    server: McpServer,
}

fn to_result_value<T: serde::Serialize>(
    result: Result<T, ConnectorError>,
) -> Result<Value, Value> {
    result
        .and_then(|r| serde_json::to_value(r).map_err(ConnectorError::SerdeJson))
        .map_err(|e| e.to_jsonrpc_error())
}

impl JsonRpcHandler {
    pub fn new(server: McpServer) -> Self {
        Self { server }
    }

    /// Process a JSON-RPC message. Notifications (no `id`) are executed but
    /// produce no response.
    pub async fn handle_request(&self, request: Value) -> Option<Value> {
        let id = request.get("id").cloned();
        let method = request.get("method").and_then(|m| m.as_str()).unwrap_or("");
        let params = request.get("params").cloned().unwrap_or(json!({}));
        debug!(method, "handling JSON-RPC message");

        let result = match method {
            "initialize" => match serde_json::from_value::<InitializeRequestParam>(params) {
                Ok(req) => to_result_value(self.server.handle_initialize(req).await),
                Err(e) => Err(ConnectorError::InvalidParams(e.to_string()).to_jsonrpc_error()),
            },
            "ping" => Ok(json!({})),
            "tools/list" => match serde_json::from_value::<Option<PaginatedRequestParam>>(params) {
                Ok(req) => to_result_value(self.server.handle_list_tools(req).await),
                Err(e) => Err(ConnectorError::InvalidParams(e.to_string()).to_jsonrpc_error()),
            },
            "tools/call" => match serde_json::from_value::<CallToolRequestParam>(params) {
                Ok(req) => to_result_value(self.server.handle_call_tool(req).await),
                Err(e) => Err(ConnectorError::InvalidParams(e.to_string()).to_jsonrpc_error()),
            },
            _ => Err(ConnectorError::MethodNotFound.to_jsonrpc_error()),
        };

        let Some(id) = id else {
            debug!(method, "notification, no response");
            return None;
        };

        Some(match result {
            Ok(result) => json!({
                "jsonrpc": "2.0",
                "result": result,
                "id": id,
            }),
            Err(error) => json!({
                "jsonrpc": "2.0",
                "error": error,
                "id": id,
            }),
        })
    }
}
