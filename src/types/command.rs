use serde::{Deserialize, Serialize};

use super::group::{GroupColor, GroupDisposition};
use super::ids::TabId;
use super::image::ImageHandle;
use super::tab::TabSpec;

/// A single mutation request, as queued by a UI or adapter layer.
///
/// Commands are plain data so they can cross a thread or process boundary as
/// JSON before `TabManager::apply` runs them one at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TabCommand {
    CreateTab {
        spec: TabSpec,
    },
    CloseTab {
        tab_id: TabId,
    },
    CloseAllTabs,
    CloseOtherTabs {
        tab_id: TabId,
    },
    DuplicateTab {
        tab_id: TabId,
    },
    CreateGroup {
        name: String,
        /// Falls back to the configured default color.
        #[serde(default)]
        color: Option<GroupColor>,
        #[serde(default)]
        tabs: Vec<TabId>,
    },
    AddTabToGroup {
        tab_id: TabId,
        group_id: TabId,
        position: usize,
    },
    RemoveTabFromGroup {
        tab_id: TabId,
    },
    DeleteGroup {
        group_id: TabId,
        disposition: GroupDisposition,
    },
    MergeGroups {
        source: TabId,
        target: TabId,
    },
    SetCollapsed {
        group_id: TabId,
        collapsed: bool,
    },
    RenameGroup {
        group_id: TabId,
        name: String,
    },
    RecolorGroup {
        group_id: TabId,
        color: GroupColor,
    },
    SelectTab {
        tab_id: TabId,
    },
    ClearSelection,
    Reorder {
        #[serde(default)]
        container: Option<TabId>,
        node_id: TabId,
        position: usize,
    },
    UpdateTitle {
        tab_id: TabId,
        title: String,
    },
    UpdateUrl {
        tab_id: TabId,
        url: String,
    },
    SetFavicon {
        tab_id: TabId,
        favicon: Option<ImageHandle>,
    },
    SetThumbnail {
        tab_id: TabId,
        thumbnail: Option<ImageHandle>,
    },
}

/// Result of a successfully applied [`TabCommand`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// A tab or group was created.
    Created { id: TabId },
    /// These tabs were closed.
    Closed { tab_ids: Vec<TabId> },
    Done,
}
