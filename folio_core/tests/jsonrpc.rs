use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use folio_core::config::NotesConfig;
use folio_core::connectors::apple_common::{ScriptResult, ScriptRunner};
use folio_core::connectors::apple_notes::AppleNotesConnector;
use folio_core::mcp_server::{JsonRpcHandler, McpServer};
use folio_core::{ConnectorError, ProviderRegistry};

/// Stands in for osascript: records scripts, answers with a canned result.
struct FakeInterpreter {
    scripts: Mutex<Vec<String>>,
    result: ScriptResult,
}

impl FakeInterpreter {
    fn new(stdout: &str, stderr: &str, exit_code: i32) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(Vec::new()),
            result: ScriptResult {
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
                exit_code,
            },
        })
    }

    fn last_script(&self) -> String {
        self.scripts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ScriptRunner for FakeInterpreter {
    async fn run(&self, script: &str) -> Result<ScriptResult, ConnectorError> {
        self.scripts.lock().unwrap().push(script.to_string());
        Ok(self.result.clone())
    }
}

async fn handler_with(runner: Arc<FakeInterpreter>) -> JsonRpcHandler {
    let mut registry = ProviderRegistry::new();
    registry.register_provider(Box::new(AppleNotesConnector::with_runner(
        runner,
        &NotesConfig::default(),
    )));
    JsonRpcHandler::new(McpServer::build(registry).await.unwrap())
}

async fn call(handler: &JsonRpcHandler, tool: &str, arguments: Value) -> Value {
    handler
        .handle_request(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {"name": tool, "arguments": arguments}
        }))
        .await
        .expect("request with id gets a response")
}

fn text(response: &Value) -> &str {
    response["result"]["content"][0]["text"]
        .as_str()
        .unwrap_or_default()
}

#[tokio::test]
async fn tools_list_exposes_bare_names() {
    let handler = handler_with(FakeInterpreter::new("", "", 0)).await;
    let response = handler
        .handle_request(json!({"jsonrpc": "2.0", "id": 7, "method": "tools/list"}))
        .await
        .unwrap();
    let names: Vec<&str> = response["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["name"].as_str())
        .collect();
    assert_eq!(names.len(), 7);
    assert!(names.contains(&"list_notes"));
    assert!(names.contains(&"update_note_html"));
    assert!(names.iter().all(|n| !n.contains('.')));
    assert!(response["result"]["tools"][0]["inputSchema"].is_object());
}

#[tokio::test]
async fn list_notes_in_folder() {
    let runner = FakeInterpreter::new("A\nB", "", 0);
    let handler = handler_with(runner.clone()).await;
    let response = call(&handler, "list_notes", json!({"folder": "Work"})).await;
    assert_eq!(text(&response), "A\nB");
    assert!(runner.last_script().contains(r#"folder "Work""#));
}

#[tokio::test]
async fn read_missing_note_is_jsonrpc_error() {
    let runner = FakeInterpreter::new(
        "",
        "120:180: execution error: Note not found: NoSuchNote (-2700)",
        1,
    );
    let handler = handler_with(runner).await;
    let response = call(&handler, "read_note", json!({"name": "NoSuchNote"})).await;
    assert!(response.get("result").is_none());
    assert!(response["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Note not found: NoSuchNote"));
    assert_eq!(response["error"]["data"]["kind"], "not_found");
}

#[tokio::test]
async fn missing_folder_is_reported() {
    let runner = FakeInterpreter::new(
        "",
        "88:140: execution error: Folder not found: Archive (-2700)",
        1,
    );
    let handler = handler_with(runner).await;
    let response = call(
        &handler,
        "read_note_html",
        json!({"name": "x", "folder": "Archive"}),
    )
    .await;
    assert_eq!(response["error"]["message"], "Folder not found: Archive");
}

#[tokio::test]
async fn quoted_folder_is_escaped_in_script() {
    let runner = FakeInterpreter::new("OK", "", 0);
    let handler = handler_with(runner.clone()).await;
    let response = call(
        &handler,
        "update_note",
        json!({"name": "Plan", "content": "# Plan\n- [ ] ship", "folder": "My \"Folder\""}),
    )
    .await;
    assert_eq!(text(&response), "Updated note: Plan");
    let script = runner.last_script();
    assert!(script.contains(r#"folder "My \"Folder\"""#));
    assert!(script.contains("<ul><li>ship</li></ul>"));
}

#[tokio::test]
async fn create_note_reports_generated_name() {
    let runner = FakeInterpreter::new("Weekly Review", "", 0);
    let handler = handler_with(runner.clone()).await;
    let response = call(&handler, "create_note", json!({"body": "# Weekly Review"})).await;
    assert_eq!(text(&response), "Created note: Weekly Review");
    assert!(runner.last_script().contains(r#"folder "Notes""#));
}

#[tokio::test]
async fn missing_argument_is_invalid_params() {
    let runner = FakeInterpreter::new("", "", 0);
    let handler = handler_with(runner.clone()).await;
    let response = call(&handler, "read_note", json!({})).await;
    assert_eq!(response["error"]["code"], -32602);
    assert_eq!(response["error"]["message"], "Missing 'name'");
    assert!(runner.scripts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn generic_script_failure_keeps_stderr() {
    let runner = FakeInterpreter::new(
        "",
        "execution error: Not authorized to send Apple events to Notes. (-1743)",
        1,
    );
    let handler = handler_with(runner).await;
    let response = call(&handler, "list_notes", json!({})).await;
    assert_eq!(response["error"]["code"], -32603);
    assert_eq!(response["error"]["data"]["kind"], "script_error");
    assert!(response["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("AppleScript error: execution error: Not authorized"));
}

/// Full path through `OsascriptRunner` with a shell script standing in for
/// the interpreter.
#[cfg(unix)]
#[tokio::test]
async fn configured_interpreter_is_used() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let program = dir.path().join("fake-osascript");
    std::fs::write(&program, "#!/bin/sh\ncat > /dev/null\nprintf 'Inbox note\\nOther\\n'\n").unwrap();
    std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();

    let config = NotesConfig {
        osascript_path: program,
        ..NotesConfig::default()
    };
    let handler = JsonRpcHandler::new(
        McpServer::build(folio_core::build_registry(&config))
            .await
            .unwrap(),
    );
    let response = call(&handler, "list_notes", json!({})).await;
    assert_eq!(text(&response), "Inbox note\nOther");
}
