// Apple Notes Connector - Notes.app integration via AppleScript
// macOS only at runtime; scripts are built and dispatched through a `ScriptRunner`.
//
// Bodies travel as Notes HTML. The Markdown variants of read/update/create
// transcode through `markup`; the `_html` variants pass HTML through untouched.

pub mod markup;
pub mod scripts;

use async_trait::async_trait;
use rmcp::model::*;
use serde_json::{json, Map as JsonMap, Value as JsonValue};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::NotesConfig;
use crate::connectors::apple_common::{apple_connector_capabilities, OsascriptRunner, ScriptRunner};
use crate::error::ConnectorError;
use crate::utils::{object_schema, optional_str, required_str, text_result};

use self::markup::{html_to_markdown, markdown_to_html};
use self::scripts::{
    script_create_note, script_list_notes, script_read_note, script_update_note, NoteLocator,
};

/// How a note body crosses the tool boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Markdown,
    Html,
}

impl BodyFormat {
    fn to_html(self, content: &str) -> String {
        match self {
            BodyFormat::Markdown => markdown_to_html(content),
            BodyFormat::Html => content.to_string(),
        }
    }

    fn present(self, html: String) -> String {
        match self {
            BodyFormat::Markdown => html_to_markdown(&html),
            BodyFormat::Html => html,
        }
    }
}

/// The tools this connector answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotesTool {
    ListNotes,
    ReadNote,
    ReadNoteHtml,
    UpdateNote,
    UpdateNoteHtml,
    CreateNote,
    CreateNoteHtml,
}

impl NotesTool {
    pub const ALL: [NotesTool; 7] = [
        NotesTool::ListNotes,
        NotesTool::ReadNote,
        NotesTool::ReadNoteHtml,
        NotesTool::UpdateNote,
        NotesTool::UpdateNoteHtml,
        NotesTool::CreateNote,
        NotesTool::CreateNoteHtml,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NotesTool::ListNotes => "list_notes",
            NotesTool::ReadNote => "read_note",
            NotesTool::ReadNoteHtml => "read_note_html",
            NotesTool::UpdateNote => "update_note",
            NotesTool::UpdateNoteHtml => "update_note_html",
            NotesTool::CreateNote => "create_note",
            NotesTool::CreateNoteHtml => "create_note_html",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Tool definition advertising the configured default and trash folders.
    fn definition(self, default_folder: &str, trash_folder: &str) -> Tool {
        let folder_lookup = json!({
            "type": "string",
            "description": format!(
                "Folder containing the note. If omitted, every folder except {} is searched and the first match wins.",
                trash_folder
            )
        });
        let folder_default = json!({
            "type": "string",
            "description": format!("Folder name. Default: \"{}\".", default_folder),
            "default": default_folder
        });
        let name = json!({
            "type": "string",
            "description": "Exact name of the note. Required."
        });

        let (title, description, schema) = match self {
            NotesTool::ListNotes => (
                "List Notes",
                "List the names of all notes in a folder, one per line, in Notes.app order.",
                json!({
                    "type": "object",
                    "properties": { "folder": folder_default }
                }),
            ),
            NotesTool::ReadNote => (
                "Read Note",
                "Read a note as Markdown (headings, checklists, bold/italic/strikethrough).",
                json!({
                    "type": "object",
                    "properties": { "name": name, "folder": folder_lookup },
                    "required": ["name"]
                }),
            ),
            NotesTool::ReadNoteHtml => (
                "Read Note (HTML)",
                "Read the raw HTML body of a note.",
                json!({
                    "type": "object",
                    "properties": { "name": name, "folder": folder_lookup },
                    "required": ["name"]
                }),
            ),
            NotesTool::UpdateNote => (
                "Update Note",
                "Replace the body of an existing note with Markdown content. Supports '# ' headings, '- [ ] '/'- [x] ' checklists, '- ' bullets, **bold**, *italic*, ~~strikethrough~~.",
                json!({
                    "type": "object",
                    "properties": {
                        "name": name,
                        "content": {
                            "type": "string",
                            "description": "New note body in Markdown. Replaces the entire body. Required."
                        },
                        "folder": folder_lookup
                    },
                    "required": ["name", "content"]
                }),
            ),
            NotesTool::UpdateNoteHtml => (
                "Update Note (HTML)",
                "Replace the body of an existing note with raw HTML.",
                json!({
                    "type": "object",
                    "properties": {
                        "name": name,
                        "html_content": {
                            "type": "string",
                            "description": "New note body in HTML. Replaces the entire body. Required."
                        },
                        "folder": folder_lookup
                    },
                    "required": ["name", "html_content"]
                }),
            ),
            NotesTool::CreateNote => (
                "Create Note",
                "Create a note from Markdown. Notes.app derives the note name from the first line, so start with a '# Title' line.",
                json!({
                    "type": "object",
                    "properties": {
                        "body": {
                            "type": "string",
                            "description": "Note content in Markdown. Required."
                        },
                        "folder": folder_default
                    },
                    "required": ["body"]
                }),
            ),
            NotesTool::CreateNoteHtml => (
                "Create Note (HTML)",
                "Create a note from raw HTML. The name is derived from the first line; use a title div such as <div><b>Title</b></div>.",
                json!({
                    "type": "object",
                    "properties": {
                        "body": {
                            "type": "string",
                            "description": "Note content in HTML. Required."
                        },
                        "folder": folder_default
                    },
                    "required": ["body"]
                }),
            ),
        };

        Tool {
            name: Cow::Borrowed(self.name()),
            title: Some(title.to_string()),
            description: Some(Cow::Borrowed(description)),
            input_schema: object_schema(schema),
            output_schema: None,
            annotations: None,
            icons: None,
        }
    }
}

/// Apple Notes connector - read, create and update notes in Notes.app.
/// Nothing here deletes notes.
pub struct AppleNotesConnector {
    runner: Arc<dyn ScriptRunner>,
    default_folder: String,
    trash_folder: String,
}

impl AppleNotesConnector {
    pub fn new(config: &NotesConfig) -> Self {
        Self::with_runner(
            Arc::new(OsascriptRunner::new(config.osascript_path.clone())),
            config,
        )
    }

    pub fn with_runner(runner: Arc<dyn ScriptRunner>, config: &NotesConfig) -> Self {
        Self {
            runner,
            default_folder: config.default_folder.clone(),
            trash_folder: config.trash_folder.clone(),
        }
    }

    fn locator(&self, folder: Option<&str>) -> NoteLocator {
        NoteLocator::new(folder, &self.trash_folder)
    }

    /// Names of every note in `folder` (default folder if `None`), newline-joined.
    pub async fn list_notes(&self, folder: Option<&str>) -> Result<String, ConnectorError> {
        let folder = folder.unwrap_or(&self.default_folder);
        self.runner.run_output(&script_list_notes(folder)).await
    }

    pub async fn read_note(
        &self,
        name: &str,
        folder: Option<&str>,
        format: BodyFormat,
    ) -> Result<String, ConnectorError> {
        let html = self
            .runner
            .run_output(&script_read_note(name, &self.locator(folder)))
            .await?;
        Ok(format.present(html))
    }

    pub async fn update_note(
        &self,
        name: &str,
        content: &str,
        folder: Option<&str>,
        format: BodyFormat,
    ) -> Result<String, ConnectorError> {
        let html = format.to_html(content);
        debug!(note = name, html = %html, "updating note body");
        self.runner
            .run_output(&script_update_note(name, &html, &self.locator(folder)))
            .await?;
        Ok(format!("Updated note: {}", name))
    }

    pub async fn create_note(
        &self,
        body: &str,
        folder: Option<&str>,
        format: BodyFormat,
    ) -> Result<String, ConnectorError> {
        let folder = folder.unwrap_or(&self.default_folder);
        let html = format.to_html(body);
        debug!(folder, html = %html, "creating note");
        let note_name = self
            .runner
            .run_output(&script_create_note(&html, folder))
            .await?;
        Ok(format!("Created note: {}", note_name))
    }

    async fn dispatch(
        &self,
        tool: NotesTool,
        args: &JsonMap<String, JsonValue>,
    ) -> Result<String, ConnectorError> {
        let folder = optional_str(args, "folder");
        match tool {
            NotesTool::ListNotes => self.list_notes(folder).await,
            NotesTool::ReadNote => {
                self.read_note(required_str(args, "name")?, folder, BodyFormat::Markdown)
                    .await
            }
            NotesTool::ReadNoteHtml => {
                self.read_note(required_str(args, "name")?, folder, BodyFormat::Html)
                    .await
            }
            NotesTool::UpdateNote => {
                let name = required_str(args, "name")?;
                let content = required_str(args, "content")?;
                self.update_note(name, content, folder, BodyFormat::Markdown)
                    .await
            }
            NotesTool::UpdateNoteHtml => {
                let name = required_str(args, "name")?;
                let html = required_str(args, "html_content")?;
                self.update_note(name, html, folder, BodyFormat::Html).await
            }
            NotesTool::CreateNote => {
                self.create_note(required_str(args, "body")?, folder, BodyFormat::Markdown)
                    .await
            }
            NotesTool::CreateNoteHtml => {
                self.create_note(required_str(args, "body")?, folder, BodyFormat::Html)
                    .await
            }
        }
    }
}

#[async_trait]
impl crate::Connector for AppleNotesConnector {
    fn name(&self) -> &'static str {
        "apple-notes"
    }

    fn description(&self) -> &'static str {
        "Apple Notes.app connector for macOS. List, read, create and update notes as Markdown or raw HTML. No destructive operations."
    }

    async fn capabilities(&self) -> ServerCapabilities {
        apple_connector_capabilities()
    }

    async fn initialize(
        &self,
        _request: InitializeRequestParam,
    ) -> Result<InitializeResult, ConnectorError> {
        Ok(InitializeResult {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: self.capabilities().await,
            server_info: Implementation {
                name: self.name().to_string(),
                title: Some("Apple Notes".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Native Notes.app integration. First use may trigger a macOS automation permission prompt."
                    .to_string(),
            ),
        })
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
    ) -> Result<ListToolsResult, ConnectorError> {
        Ok(ListToolsResult {
            tools: NotesTool::ALL
                .iter()
                .map(|t| t.definition(&self.default_folder, &self.trash_folder))
                .collect(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, ConnectorError> {
        let tool = NotesTool::from_name(request.name.as_ref()).ok_or(ConnectorError::ToolNotFound)?;
        let args = request.arguments.unwrap_or_default();
        info!(tool = tool.name(), "calling notes tool");
        let text = self.dispatch(tool, &args).await?;
        Ok(text_result(text))
    }
}
