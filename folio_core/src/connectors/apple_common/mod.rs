// Apple Common - Shared infrastructure for Apple ecosystem connectors
// Provides AppleScript string escaping and execution through osascript

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use std::process::Stdio;
use tracing::{debug, warn};

use crate::error::ConnectorError;

pub const DEFAULT_OSASCRIPT: &str = "/usr/bin/osascript";

/// Result of running an AppleScript
#[derive(Debug, Clone)]
pub struct ScriptResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ScriptResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout on success, otherwise the failure mapped into a `ConnectorError`.
    pub fn into_output(self) -> Result<String, ConnectorError> {
        if self.success() {
            Ok(self.stdout)
        } else {
            Err(classify_failure(&self.stderr))
        }
    }
}

/// Executes AppleScript source text. One call is one interpreter process.
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    async fn run(&self, script: &str) -> Result<ScriptResult, ConnectorError>;

    /// Execute and return stdout, or error if the interpreter failed
    async fn run_output(&self, script: &str) -> Result<String, ConnectorError> {
        self.run(script).await?.into_output()
    }
}

/// Runs scripts through `osascript`, feeding the source on stdin so that
/// script size is not bounded by argv limits.
#[derive(Debug, Clone)]
pub struct OsascriptRunner {
    program: PathBuf,
}

impl OsascriptRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for OsascriptRunner {
    fn default() -> Self {
        Self::new(DEFAULT_OSASCRIPT)
    }
}

#[async_trait]
impl ScriptRunner for OsascriptRunner {
    async fn run(&self, script: &str) -> Result<ScriptResult, ConnectorError> {
        use tokio::io::AsyncWriteExt;
        use tokio::process::Command;

        debug!(program = %self.program.display(), bytes = script.len(), "running script");

        let mut cmd = Command::new(&self.program);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            ConnectorError::Other(format!(
                "Failed to spawn {}: {}",
                self.program.display(),
                e
            ))
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(script.as_bytes())
                .await
                .map_err(|e| ConnectorError::Other(format!("Failed to write script: {}", e)))?;
            // Dropping stdin closes the pipe so the interpreter sees EOF.
        }

        let output = child.wait_with_output().await.map_err(|e| {
            ConnectorError::Other(format!("Failed to wait for osascript: {}", e))
        })?;

        let result = ScriptResult {
            stdout: String::from_utf8_lossy(&output.stdout).trim_end().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            exit_code: output.status.code().unwrap_or(-1),
        };
        if !result.success() {
            warn!(exit_code = result.exit_code, stderr = %result.stderr, "script failed");
        }
        Ok(result)
    }
}

/// Escape a string for use inside an AppleScript double-quoted literal.
///
/// Backslashes are doubled before quotes are escaped; the reverse order would
/// double the backslashes introduced for the quotes. Newlines and control
/// characters pass through, since AppleScript literals accept them verbatim.
pub fn escape_applescript_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Message prefixes raised by our own scripts via `error "..."`.
pub const NOTE_NOT_FOUND: &str = "Note not found: ";
pub const FOLDER_NOT_FOUND: &str = "Folder not found: ";

static NOT_FOUND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)(Note|Folder) not found: (.*?)(?: \(-?\d+\))?$")
        .expect("not-found pattern is valid")
});

/// Map interpreter stderr to an error. osascript reports a script-raised
/// error as `<range>: execution error: <message> (<number>)`.
pub fn classify_failure(stderr: &str) -> ConnectorError {
    if let Some(caps) = NOT_FOUND_RE.captures(stderr) {
        let subject = caps[2].to_string();
        return match &caps[1] {
            "Note" => ConnectorError::NoteNotFound(subject),
            _ => ConnectorError::FolderNotFound(subject),
        };
    }
    ConnectorError::Script(stderr.to_string())
}

/// Standard connector capabilities for Apple connectors
pub fn apple_connector_capabilities() -> rmcp::model::ServerCapabilities {
    rmcp::model::ServerCapabilities {
        tools: Some(rmcp::model::ToolsCapability { list_changed: None }),
        ..Default::default()
    }
}
