use serde::{Deserialize, Serialize};

use super::ids::TabId;
use super::node::Node;

/// Current layout version written by the session store.
pub const SESSION_VERSION: u32 = 1;

/// Serialized form of a whole tab tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub version: u32,
    /// Top-level sequence in display order, groups carrying their members.
    pub nodes: Vec<Node>,
    /// Mirrors the single tab whose `is_selected` flag is set.
    pub selected_tab_id: Option<TabId>,
    /// Unix seconds at export time.
    pub exported_at: i64,
}

impl SessionData {
    /// Compares the tree content (ids, order, every field), ignoring the export timestamp.
    pub fn same_content(&self, other: &SessionData) -> bool {
        self.version == other.version
            && self.selected_tab_id == other.selected_tab_id
            && self.nodes.len() == other.nodes.len()
            && self
                .nodes
                .iter()
                .zip(&other.nodes)
                .all(|(a, b)| a.same_content(b))
    }
}
