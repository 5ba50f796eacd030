// Apple ecosystem connectors. Both compile everywhere; Notes.app is only
// reachable on macOS, where osascript exists.
pub mod apple_common;
pub mod apple_notes;
