//! Session Store for tabtree.
//!
//! Exports the tab tree as [`SessionData`] and rebuilds a tree from it.
//! JSON is the only format; the store validates everything it reads, so an
//! imported tree obeys the same rules as one built through the engine.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::info;

use crate::managers::tab_manager::TabManager;
use crate::managers::tab_tree::TabTree;
use crate::platform;
use crate::types::errors::{SessionError, TabError};
use crate::types::session::{SessionData, SESSION_VERSION};

/// File name used inside the platform data directory.
pub const SESSION_FILE: &str = "session.json";

/// Default location of the session file.
pub fn default_session_path() -> PathBuf {
    platform::get_data_dir().join(SESSION_FILE)
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Captures the whole tree.
pub fn export(tree: &TabTree) -> SessionData {
    SessionData {
        version: SESSION_VERSION,
        nodes: tree.nodes().to_vec(),
        selected_tab_id: tree.selected_tab_id(),
        exported_at: now(),
    }
}

/// Rebuilds a tree, rejecting data that breaks any structural rule.
pub fn import(data: SessionData) -> Result<TabTree, SessionError> {
    if data.version != SESSION_VERSION {
        return Err(SessionError::UnsupportedVersion(data.version));
    }
    let selected = data.selected_tab_id;
    let tree = TabTree::from_nodes(data.nodes)?;
    if tree.selected_tab_id() != selected {
        return Err(SessionError::Invalid(TabError::InvariantViolation(format!(
            "selected_tab_id {:?} does not match the selected tab",
            selected.map(|id| id.to_string())
        ))));
    }
    Ok(tree)
}

pub fn to_json(data: &SessionData) -> Result<String, SessionError> {
    serde_json::to_string_pretty(data).map_err(|e| SessionError::Serialization(e.to_string()))
}

pub fn from_json(json: &str) -> Result<SessionData, SessionError> {
    serde_json::from_str(json).map_err(|e| SessionError::Serialization(e.to_string()))
}

/// Writes the manager's current tree to `path`, creating parent directories.
pub fn save_to_file(manager: &TabManager, path: &Path) -> Result<(), SessionError> {
    let json = to_json(&export(manager.tree()))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| SessionError::Io(e.to_string()))?;
    }
    fs::write(path, json).map_err(|e| SessionError::Io(e.to_string()))?;
    info!(path = %path.display(), tabs = manager.tree().tab_count(), "session saved");
    Ok(())
}

/// Reads a session file and installs it into `manager`.
///
/// Returns `Ok(false)` when there is no file. On any error the manager keeps
/// its current tree.
pub fn load_from_file(manager: &mut TabManager, path: &Path) -> Result<bool, SessionError> {
    if !path.exists() {
        return Ok(false);
    }
    let json = fs::read_to_string(path).map_err(|e| SessionError::Io(e.to_string()))?;
    let tree = import(from_json(&json)?)?;
    info!(path = %path.display(), tabs = tree.tab_count(), "session restored");
    manager.restore(tree)?;
    Ok(true)
}
