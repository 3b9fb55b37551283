use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::BoardConfig;

/// Name of the configuration file at the vault root
pub const CONFIG_FILE: &str = "boardwalk.toml";

/// Written by `bw init`
pub const DEFAULT_CONFIG: &str = r#"[board]
# Column dimension: status, status.name, priority, path, folder, filename, tags, due
group_by = "status"
# Optional swim lanes, same choices as group_by
# lanes_by = "folder"
# Column order for status boards; empty means Todo, In-Progress, Done, Cancelled
column_order = []

[filter]
tags = []
paths = []
include_done = true

[refresh]
debounce_ms = 300
settle_ms = 1000

# Custom statuses replace the built-in table:
# [[statuses]]
# marker = "/"
# name = "Doing"
# type = "IN_PROGRESS"
"#;

/// Error type for configuration I/O
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse boardwalk.toml: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("could not parse boardwalk.toml for editing: {0}")]
    EditError(#[from] toml_edit::TomlError),
}

/// Walk up from `start` looking for a directory holding boardwalk.toml.
/// Returns `start` itself when none is found: a plain directory of notes is
/// a valid vault with default settings.
pub fn discover_root(start: &Path) -> PathBuf {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).is_file() {
            return current;
        }
        if !current.pop() {
            return start.to_path_buf();
        }
    }
}

/// Load the configuration, or defaults when the file is absent
pub fn load_config(root: &Path) -> Result<BoardConfig, ConfigError> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(BoardConfig::default());
    }
    let text = fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Read the configuration as a toml_edit document for format-preserving
/// edits. An absent file yields an empty document.
pub fn read_config_doc(root: &Path) -> Result<toml_edit::DocumentMut, ConfigError> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(toml_edit::DocumentMut::new());
    }
    let text = fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    // Validate against the typed model before accepting edits
    toml::from_str::<BoardConfig>(&text)?;
    Ok(text.parse()?)
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config_doc(root: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ConfigError> {
    let path = root.join(CONFIG_FILE);
    fs::write(&path, doc.to_string()).map_err(|e| ConfigError::WriteError { path, source: e })
}

/// Set `board.column_order`
pub fn set_column_order(doc: &mut toml_edit::DocumentMut, keys: &[String]) {
    if !doc.contains_key("board") {
        doc["board"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    let mut array = toml_edit::Array::new();
    for key in keys {
        array.push(key.as_str());
    }
    doc["board"]["column_order"] = toml_edit::value(array);
}

/// Clear `board.column_order`, restoring workflow order
pub fn reset_column_order(doc: &mut toml_edit::DocumentMut) {
    if let Some(board) = doc.get_mut("board").and_then(|b| b.as_table_like_mut()) {
        board.remove("column_order");
    }
}
