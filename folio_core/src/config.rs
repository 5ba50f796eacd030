use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::connectors::apple_common::DEFAULT_OSASCRIPT;
use crate::error::ConnectorError;

pub const CONFIG_ENV: &str = "FOLIO_CONFIG";
pub const DEFAULT_FOLDER_ENV: &str = "FOLIO_DEFAULT_FOLDER";
pub const TRASH_FOLDER_ENV: &str = "FOLIO_TRASH_FOLDER";
pub const OSASCRIPT_ENV: &str = "FOLIO_OSASCRIPT";

/// Settings for the Notes connector, read from `config.toml`.
///
/// ```toml
/// default_folder = "Notes"
/// trash_folder = "Recently Deleted"
/// osascript_path = "/usr/bin/osascript"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotesConfig {
    /// Folder used by list/create when the caller names none.
    pub default_folder: String,
    /// Folder skipped when searching every folder for a note.
    pub trash_folder: String,
    pub osascript_path: PathBuf,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            default_folder: "Notes".to_string(),
            trash_folder: "Recently Deleted".to_string(),
            osascript_path: PathBuf::from(DEFAULT_OSASCRIPT),
        }
    }
}

impl NotesConfig {
    /// `~/.config/folio/config.toml` on Unix, the platform config dir elsewhere.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|p| p.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("folio")
            .join("config.toml")
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConnectorError> {
        toml::from_str(content).map_err(|e| ConnectorError::Config(e.to_string()))
    }

    /// Missing file yields defaults; an unreadable or malformed file is an error.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConnectorError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => {
                info!("Loaded config from {}", path.display());
                Self::from_toml_str(&content).map_err(|e| match e {
                    ConnectorError::Config(msg) => {
                        ConnectorError::Config(format!("{}: {}", path.display(), msg))
                    }
                    other => other,
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(ConnectorError::Config(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// File from `FOLIO_CONFIG` or the default path, then env overrides.
    pub fn load_default() -> Result<Self, ConnectorError> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_path);
        let mut config = Self::load_from_path(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `FOLIO_*` overrides. `lookup` is the environment in production.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = non_empty(DEFAULT_FOLDER_ENV) {
            self.default_folder = v;
        }
        if let Some(v) = non_empty(TRASH_FOLDER_ENV) {
            self.trash_folder = v;
        }
        if let Some(v) = non_empty(OSASCRIPT_ENV) {
            self.osascript_path = PathBuf::from(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = NotesConfig::default();
        assert_eq!(config.default_folder, "Notes");
        assert_eq!(config.trash_folder, "Recently Deleted");
        assert_eq!(config.osascript_path, PathBuf::from("/usr/bin/osascript"));
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = NotesConfig::from_toml_str(r#"default_folder = "Inbox""#).unwrap();
        assert_eq!(config.default_folder, "Inbox");
        assert_eq!(config.trash_folder, "Recently Deleted");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = NotesConfig::from_toml_str("trash = \"Bin\"").unwrap_err();
        assert_eq!(err.code_str(), "config_error");
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = NotesConfig::load_from_path(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, NotesConfig::default());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "trash_folder = \"Papierkorb\"").unwrap();
        writeln!(file, "osascript_path = \"/opt/bin/osascript\"").unwrap();
        let config = NotesConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.trash_folder, "Papierkorb");
        assert_eq!(config.osascript_path, PathBuf::from("/opt/bin/osascript"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_folder = [").unwrap();
        let err = NotesConfig::load_from_path(file.path()).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Configuration error: "));
        assert!(message.contains(&file.path().display().to_string()));
        assert_eq!(message.matches("Configuration error").count(), 1);
    }

    #[test]
    fn overrides_win_and_ignore_blank_values() {
        let mut config = NotesConfig::default();
        config.apply_overrides(|key| match key {
            DEFAULT_FOLDER_ENV => Some("Work".to_string()),
            TRASH_FOLDER_ENV => Some(" ".to_string()),
            _ => None,
        });
        assert_eq!(config.default_folder, "Work");
        assert_eq!(config.trash_folder, "Recently Deleted");
    }
}
