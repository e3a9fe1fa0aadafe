use serde::{Deserialize, Serialize};

use super::group::{GroupColor, GroupDisposition};
use super::ids::TabId;

/// Change notification delivered to observers after a mutation is published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TabEvent {
    TabCreated { tab_id: TabId, group: Option<TabId> },
    TabClosed { tab_id: TabId },
    TabsClosed { tab_ids: Vec<TabId> },
    TabUpdated { tab_id: TabId },
    /// A tab joined or left a group.
    TabMoved { tab_id: TabId, group: Option<TabId>, index: usize },
    /// A tab or group moved within its own sequence; `container` is `None` for the top level.
    NodeMoved { node_id: TabId, container: Option<TabId>, index: usize },
    SelectionChanged { previous: Option<TabId>, current: Option<TabId> },
    GroupCreated { group_id: TabId },
    GroupDeleted { group_id: TabId, disposition: GroupDisposition },
    GroupsMerged { source: TabId, target: TabId },
    GroupCollapsed { group_id: TabId, collapsed: bool },
    GroupRenamed { group_id: TabId, name: String },
    GroupRecolored { group_id: TabId, color: GroupColor },
    Restored,
}
