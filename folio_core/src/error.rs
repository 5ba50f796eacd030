// src/error.rs
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Tool not found")]
    ToolNotFound,

    #[error("Method not found")]
    MethodNotFound,

    #[error("Parse error")]
    ParseError,

    /// The interpreter exited non-zero; carries its diagnostic text verbatim.
    #[error("AppleScript error: {0}")]
    Script(String),

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl ConnectorError {
    pub fn code_str(&self) -> &'static str {
        match self {
            ConnectorError::InvalidParams(_) => "invalid_params",
            ConnectorError::ToolNotFound => "tool_not_found",
            ConnectorError::MethodNotFound => "method_not_found",
            ConnectorError::ParseError => "parse_error",
            ConnectorError::Script(_) => "script_error",
            ConnectorError::NoteNotFound(_) | ConnectorError::FolderNotFound(_) => "not_found",
            ConnectorError::Config(_) => "config_error",
            _ => "internal_error",
        }
    }

    pub fn to_jsonrpc_error(&self) -> serde_json::Value {
        let (code, message) = match self {
            ConnectorError::ToolNotFound => (-32602, "Tool not found".to_string()),
            ConnectorError::InvalidParams(msg) => (-32602, msg.to_string()),
            ConnectorError::MethodNotFound => (-32601, "Method not found".to_string()),
            ConnectorError::ParseError => (-32700, "Parse error".to_string()),
            ConnectorError::Other(msg) => (-32603, msg.to_string()),
            err => (-32603, err.to_string()),
        };

        json!({
            "code": code,
            "message": message,
            "data": { "kind": self.code_str() },
        })
    }
}
