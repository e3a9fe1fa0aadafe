use std::fmt;

use serde::{Deserialize, Serialize};

use super::ids::TabId;
use super::tab::Tab;

/// Integer color token of a group. Interpreting it is up to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupColor(pub u32);

impl fmt::Display for GroupColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

impl From<u32> for GroupColor {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// A named, colored group of tabs.
///
/// `tabs` is in display order. Member tabs share one incognito status.
/// `collapsed` is a presentation hint only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabGroup {
    pub(crate) id: TabId,
    pub name: String,
    pub color: GroupColor,
    pub(crate) tabs: Vec<Tab>,
    pub collapsed: bool,
}

impl TabGroup {
    pub(crate) fn new(id: TabId, name: String, color: GroupColor) -> Self {
        Self {
            id,
            name,
            color,
            tabs: Vec::new(),
            collapsed: false,
        }
    }

    pub fn id(&self) -> &TabId {
        &self.id
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn tab_ids(&self) -> Vec<TabId> {
        self.tabs.iter().map(|t| t.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Incognito status shared by the members, `None` for an empty group.
    pub fn incognito(&self) -> Option<bool> {
        self.tabs.first().map(|t| t.is_incognito)
    }

    /// Whether a tab with the given incognito flag may join this group.
    pub fn accepts(&self, incognito: bool) -> bool {
        self.incognito().map_or(true, |flag| flag == incognito)
    }

    pub(crate) fn position_of(&self, tab_id: &TabId) -> Option<usize> {
        self.tabs.iter().position(|t| &t.id == tab_id)
    }

    /// Field-by-field comparison, members included.
    pub fn same_content(&self, other: &TabGroup) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.color == other.color
            && self.collapsed == other.collapsed
            && self.tabs.len() == other.tabs.len()
            && self
                .tabs
                .iter()
                .zip(&other.tabs)
                .all(|(a, b)| a.same_content(b))
    }
}

impl PartialEq for TabGroup {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TabGroup {}

/// What happens to member tabs when a group is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupDisposition {
    /// Members move to the top level, in order, at the group's former position.
    UngroupTabs,
    /// Members are closed along with the group.
    CloseTabs,
}
