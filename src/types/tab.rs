use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::ids::TabId;
use super::image::ImageHandle;

/// A browser tab.
///
/// Equality and hashing look at the id only: two values with the same id are
/// the same logical tab, even when the title or url differ. Use
/// [`Tab::same_content`] to compare every field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tab {
    pub(crate) id: TabId,
    pub title: String,
    pub url: String,
    pub favicon: Option<ImageHandle>,
    pub thumbnail: Option<ImageHandle>,
    pub(crate) is_incognito: bool,
    pub(crate) is_selected: bool,
}

impl Tab {
    pub(crate) fn new(id: TabId, title: String, url: String, is_incognito: bool) -> Self {
        Self {
            id,
            title,
            url,
            favicon: None,
            thumbnail: None,
            is_incognito,
            is_selected: false,
        }
    }

    pub fn id(&self) -> &TabId {
        &self.id
    }

    pub fn is_incognito(&self) -> bool {
        self.is_incognito
    }

    /// Selection is owned by the engine; see `TabTree::select_tab`.
    pub fn is_selected(&self) -> bool {
        self.is_selected
    }

    /// Field-by-field comparison, including the id.
    pub fn same_content(&self, other: &Tab) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.url == other.url
            && self.favicon == other.favicon
            && self.thumbnail == other.thumbnail
            && self.is_incognito == other.is_incognito
            && self.is_selected == other.is_selected
    }
}

impl PartialEq for Tab {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Tab {}

impl Hash for Tab {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Request to open a new tab.
///
/// Empty `title`/`url` are filled from the engine settings by `TabManager`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabSpec {
    /// Caller-supplied id; normally `None` so the engine generates one.
    #[serde(default)]
    pub id: Option<TabId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub incognito: bool,
    /// Target group; `None` appends to the top-level sequence.
    #[serde(default)]
    pub group: Option<TabId>,
    /// Select the new tab as part of the same operation.
    #[serde(default)]
    pub select: bool,
    #[serde(default)]
    pub favicon: Option<ImageHandle>,
}

impl TabSpec {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<TabId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn incognito(mut self, incognito: bool) -> Self {
        self.incognito = incognito;
        self
    }

    pub fn in_group(mut self, group: impl Into<TabId>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn selected(mut self) -> Self {
        self.select = true;
        self
    }

    pub fn with_favicon(mut self, favicon: ImageHandle) -> Self {
        self.favicon = Some(favicon);
        self
    }
}
