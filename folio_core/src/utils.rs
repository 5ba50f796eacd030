use crate::error::ConnectorError;
use rmcp::model::{CallToolResult, Content};
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::sync::Arc;

/// Wrap plain text as a successful tool result.
pub fn text_result(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

/// Turn a `json!` literal into a tool input schema. Non-object values yield
/// an empty schema.
pub fn object_schema(value: JsonValue) -> Arc<JsonMap<String, JsonValue>> {
    match value {
        JsonValue::Object(map) => Arc::new(map),
        _ => Arc::new(JsonMap::new()),
    }
}

pub fn required_str<'a>(
    args: &'a JsonMap<String, JsonValue>,
    key: &str,
) -> Result<&'a str, ConnectorError> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ConnectorError::InvalidParams(format!("Missing '{}'", key)))
}

/// Optional string argument; empty or whitespace-only values count as absent.
pub fn optional_str<'a>(args: &'a JsonMap<String, JsonValue>, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
}
