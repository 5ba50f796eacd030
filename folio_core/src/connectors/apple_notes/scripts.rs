// AppleScript generators for Notes.app.
//
// Every value interpolated below passes through `escape_applescript_string`.

use crate::connectors::apple_common::{escape_applescript_string, FOLDER_NOT_FOUND, NOTE_NOT_FOUND};

/// Where to look for a note by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteLocator {
    /// Only the named folder. Fails if the folder does not exist.
    InFolder(String),
    /// Every folder in enumeration order except the trash folder.
    /// The first folder holding a match wins.
    AnyFolder { exclude: String },
}

impl NoteLocator {
    pub fn new(folder: Option<&str>, trash_folder: &str) -> Self {
        match folder {
            Some(f) => NoteLocator::InFolder(f.to_string()),
            None => NoteLocator::AnyFolder {
                exclude: trash_folder.to_string(),
            },
        }
    }
}

/// Script fragment binding `targetFolder`, or raising a folder-not-found error.
fn resolve_folder(folder: &str) -> String {
    let folder = escape_applescript_string(folder);
    format!(
        r#"    try
        set targetFolder to folder "{folder}"
    on error
        error "{folder_missing}{folder}"
    end try
"#,
        folder = folder,
        folder_missing = FOLDER_NOT_FOUND,
    )
}

/// Script fragment binding `targetNote`, or raising a not-found error.
fn resolve_note(name: &str, locator: &NoteLocator) -> String {
    let name = escape_applescript_string(name);
    match locator {
        NoteLocator::InFolder(folder) => format!(
            r#"{resolve}    set matches to (notes of targetFolder whose name is "{name}")
    if (count of matches) is 0 then error "{note_missing}{name}"
    set targetNote to item 1 of matches
"#,
            resolve = resolve_folder(folder),
            name = name,
            note_missing = NOTE_NOT_FOUND,
        ),
        NoteLocator::AnyFolder { exclude } => format!(
            r#"    set targetNote to missing value
    repeat with aFolder in folders
        if name of aFolder is not "{exclude}" then
            set matches to (notes of aFolder whose name is "{name}")
            if (count of matches) > 0 then
                set targetNote to item 1 of matches
                exit repeat
            end if
        end if
    end repeat
    if targetNote is missing value then error "{note_missing}{name}"
"#,
            exclude = escape_applescript_string(exclude),
            name = name,
            note_missing = NOTE_NOT_FOUND,
        ),
    }
}

pub fn script_list_notes(folder: &str) -> String {
    format!(
        r#"
tell application "Notes"
    set noteNames to {{}}
{resolve}    repeat with aNote in notes of targetFolder
        set end of noteNames to name of aNote
    end repeat
    set AppleScript's text item delimiters to linefeed
    return noteNames as text
end tell
"#,
        resolve = resolve_folder(folder)
    )
}

pub fn script_read_note(name: &str, locator: &NoteLocator) -> String {
    format!(
        r#"
tell application "Notes"
{resolve}    return body of targetNote
end tell
"#,
        resolve = resolve_note(name, locator)
    )
}

pub fn script_update_note(name: &str, html: &str, locator: &NoteLocator) -> String {
    format!(
        r#"
tell application "Notes"
{resolve}    set body of targetNote to "{body}"
    return "OK"
end tell
"#,
        resolve = resolve_note(name, locator),
        body = escape_applescript_string(html)
    )
}

pub fn script_create_note(html: &str, folder: &str) -> String {
    format!(
        r#"
tell application "Notes"
{resolve}    set newNote to make new note at targetFolder with properties {{body:"{body}"}}
    return name of newNote
end tell
"#,
        resolve = resolve_folder(folder),
        body = escape_applescript_string(html)
    )
}
