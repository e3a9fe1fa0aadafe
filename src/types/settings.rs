use serde::{Deserialize, Serialize};

use super::group::GroupColor;

/// Engine configuration, persisted as JSON by the settings engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    pub tabs: TabDefaults,
    pub groups: GroupDefaults,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tabs: TabDefaults::default(),
            groups: GroupDefaults::default(),
        }
    }
}

/// Values used for blank fields of a new tab.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TabDefaults {
    pub new_tab_url: String,
    pub new_tab_title: String,
    /// Select every newly created tab, as if `TabSpec::select` were set.
    pub select_new_tabs: bool,
}

impl Default for TabDefaults {
    fn default() -> Self {
        Self {
            new_tab_url: "about:blank".to_string(),
            new_tab_title: "New Tab".to_string(),
            select_new_tabs: false,
        }
    }
}

/// Values used for new groups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GroupDefaults {
    pub default_name: String,
    pub default_color: GroupColor,
}

impl Default for GroupDefaults {
    fn default() -> Self {
        Self {
            default_name: String::new(),
            default_color: GroupColor(0),
        }
    }
}
