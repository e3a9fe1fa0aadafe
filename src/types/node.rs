use serde::{Deserialize, Serialize};

use super::group::TabGroup;
use super::ids::TabId;
use super::tab::Tab;

/// An entry in the top-level sequence: a single tab or a whole group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Tab(Tab),
    Group(TabGroup),
}

/// Variant discriminant of a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Tab,
    Group,
}

impl Node {
    pub fn id(&self) -> &TabId {
        match self {
            Node::Tab(tab) => &tab.id,
            Node::Group(group) => &group.id,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Tab(_) => NodeKind::Tab,
            Node::Group(_) => NodeKind::Group,
        }
    }

    pub fn as_tab(&self) -> Option<&Tab> {
        match self {
            Node::Tab(tab) => Some(tab),
            Node::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&TabGroup> {
        match self {
            Node::Group(group) => Some(group),
            Node::Tab(_) => None,
        }
    }

    /// Number of tabs this node contributes to the display.
    pub fn tab_count(&self) -> usize {
        match self {
            Node::Tab(_) => 1,
            Node::Group(group) => group.tabs.len(),
        }
    }

    pub fn same_content(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Tab(a), Node::Tab(b)) => a.same_content(b),
            (Node::Group(a), Node::Group(b)) => a.same_content(b),
            _ => false,
        }
    }
}

/// Where a tab currently lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Owning group, or `None` for the top-level sequence.
    pub group: Option<TabId>,
    /// Index inside that sequence.
    pub index: usize,
}

impl Location {
    pub fn top_level(index: usize) -> Self {
        Self { group: None, index }
    }

    pub fn in_group(group: TabId, index: usize) -> Self {
        Self {
            group: Some(group),
            index,
        }
    }

    pub fn is_grouped(&self) -> bool {
        self.group.is_some()
    }
}
