//! Tab Manager: the single writer in front of a [`TabTree`].
//!
//! Every mutation runs against a private copy of the current tree. Only when
//! the operation succeeds is the copy published as a new [`Snapshot`], so
//! readers and observers never see a half-applied change and a failed call
//! leaves no trace.

use std::fmt;
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::managers::tab_tree::TabTree;
use crate::types::command::{CommandOutcome, TabCommand};
use crate::types::errors::TabError;
use crate::types::event::TabEvent;
use crate::types::group::{GroupColor, GroupDisposition};
use crate::types::ids::{IdGenerator, TabId, UuidGenerator};
use crate::types::image::ImageHandle;
use crate::types::settings::EngineSettings;
use crate::types::tab::{Tab, TabSpec};

/// Trait defining the tab and group operations of the manager.
pub trait TabManagerTrait {
    fn create_tab(&mut self, spec: TabSpec) -> Result<TabId, TabError>;
    fn close_tab(&mut self, tab_id: &TabId) -> Result<Tab, TabError>;
    fn close_all_tabs(&mut self) -> Vec<TabId>;
    fn close_other_tabs(&mut self, keep: &TabId) -> Result<Vec<TabId>, TabError>;
    fn duplicate_tab(&mut self, tab_id: &TabId) -> Result<TabId, TabError>;
    fn select_tab(&mut self, tab_id: &TabId) -> Result<(), TabError>;
    fn clear_selection(&mut self) -> Option<TabId>;
    fn reorder(
        &mut self,
        container: Option<&TabId>,
        node_id: &TabId,
        position: usize,
    ) -> Result<(), TabError>;
    fn update_title(&mut self, tab_id: &TabId, title: &str) -> Result<(), TabError>;
    fn update_url(&mut self, tab_id: &TabId, url: &str) -> Result<(), TabError>;
    fn set_favicon(&mut self, tab_id: &TabId, favicon: Option<ImageHandle>)
        -> Result<(), TabError>;
    fn set_thumbnail(
        &mut self,
        tab_id: &TabId,
        thumbnail: Option<ImageHandle>,
    ) -> Result<(), TabError>;
    fn create_group(
        &mut self,
        name: &str,
        color: GroupColor,
        initial_tabs: &[TabId],
    ) -> Result<TabId, TabError>;
    fn add_tab_to_group(
        &mut self,
        tab_id: &TabId,
        group_id: &TabId,
        position: usize,
    ) -> Result<(), TabError>;
    fn remove_tab_from_group(&mut self, tab_id: &TabId) -> Result<(), TabError>;
    fn delete_group(
        &mut self,
        group_id: &TabId,
        disposition: GroupDisposition,
    ) -> Result<Vec<Tab>, TabError>;
    fn merge_groups(&mut self, source: &TabId, target: &TabId) -> Result<(), TabError>;
    fn set_collapsed(&mut self, group_id: &TabId, collapsed: bool) -> Result<(), TabError>;
    fn rename_group(&mut self, group_id: &TabId, name: &str) -> Result<(), TabError>;
    fn recolor_group(&mut self, group_id: &TabId, color: GroupColor) -> Result<(), TabError>;
}

/// A published, immutable version of the tab tree.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub tree: Arc<TabTree>,
    /// Bumped once per successful mutation.
    pub revision: u64,
}

/// Read handle that can live on another thread.
#[derive(Clone)]
pub struct SnapshotReader {
    shared: Arc<RwLock<Snapshot>>,
}

impl SnapshotReader {
    /// Returns the most recently published snapshot.
    pub fn load(&self) -> Snapshot {
        match self.shared.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// Observer callback, invoked after each publish.
pub type Observer = Box<dyn Fn(&Snapshot, &TabEvent) + Send + Sync>;

/// Handle returned by [`TabManager::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Owner of the tab tree. Callers serialize mutations by holding `&mut`.
pub struct TabManager {
    current: Snapshot,
    published: Arc<RwLock<Snapshot>>,
    ids: Box<dyn IdGenerator>,
    settings: EngineSettings,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl TabManager {
    pub fn new() -> Self {
        Self::with_parts(EngineSettings::default(), Box::new(UuidGenerator))
    }

    pub fn with_settings(settings: EngineSettings) -> Self {
        Self::with_parts(settings, Box::new(UuidGenerator))
    }

    pub fn with_id_generator(ids: Box<dyn IdGenerator>) -> Self {
        Self::with_parts(EngineSettings::default(), ids)
    }

    pub fn with_parts(settings: EngineSettings, ids: Box<dyn IdGenerator>) -> Self {
        let current = Snapshot {
            tree: Arc::new(TabTree::new()),
            revision: 0,
        };
        Self {
            published: Arc::new(RwLock::new(current.clone())),
            current,
            ids,
            settings,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    // ─── Reading ───

    /// The tree as of the last successful mutation.
    pub fn tree(&self) -> &TabTree {
        &self.current.tree
    }

    pub fn snapshot(&self) -> Snapshot {
        self.current.clone()
    }

    pub fn revision(&self) -> u64 {
        self.current.revision
    }

    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader {
            shared: Arc::clone(&self.published),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: EngineSettings) {
        self.settings = settings;
    }

    // ─── Observers ───

    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: Fn(&Snapshot, &TabEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns false when the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    /// Replaces the whole tree, e.g. with one rebuilt from a saved session.
    pub fn restore(&mut self, tree: TabTree) -> Result<(), TabError> {
        tree.check_invariants()?;
        self.publish(tree, vec![TabEvent::Restored]);
        Ok(())
    }

    // ─── Commands ───

    /// Runs one queued command.
    pub fn apply(&mut self, command: TabCommand) -> Result<CommandOutcome, TabError> {
        match command {
            TabCommand::CreateTab { spec } => {
                self.create_tab(spec).map(|id| CommandOutcome::Created { id })
            }
            TabCommand::CloseTab { tab_id } => {
                self.close_tab(&tab_id)?;
                Ok(CommandOutcome::Closed {
                    tab_ids: vec![tab_id],
                })
            }
            TabCommand::CloseAllTabs => Ok(CommandOutcome::Closed {
                tab_ids: self.close_all_tabs(),
            }),
            TabCommand::CloseOtherTabs { tab_id } => self
                .close_other_tabs(&tab_id)
                .map(|tab_ids| CommandOutcome::Closed { tab_ids }),
            TabCommand::DuplicateTab { tab_id } => self
                .duplicate_tab(&tab_id)
                .map(|id| CommandOutcome::Created { id }),
            TabCommand::CreateGroup { name, color, tabs } => {
                let color = color.unwrap_or(self.settings.groups.default_color);
                self.create_group(&name, color, &tabs)
                    .map(|id| CommandOutcome::Created { id })
            }
            TabCommand::AddTabToGroup {
                tab_id,
                group_id,
                position,
            } => self
                .add_tab_to_group(&tab_id, &group_id, position)
                .map(|_| CommandOutcome::Done),
            TabCommand::RemoveTabFromGroup { tab_id } => self
                .remove_tab_from_group(&tab_id)
                .map(|_| CommandOutcome::Done),
            TabCommand::DeleteGroup {
                group_id,
                disposition,
            } => self
                .delete_group(&group_id, disposition)
                .map(|closed| match disposition {
                    GroupDisposition::CloseTabs => CommandOutcome::Closed {
                        tab_ids: closed.iter().map(|t| t.id().clone()).collect(),
                    },
                    GroupDisposition::UngroupTabs => CommandOutcome::Done,
                }),
            TabCommand::MergeGroups { source, target } => self
                .merge_groups(&source, &target)
                .map(|_| CommandOutcome::Done),
            TabCommand::SetCollapsed {
                group_id,
                collapsed,
            } => self
                .set_collapsed(&group_id, collapsed)
                .map(|_| CommandOutcome::Done),
            TabCommand::RenameGroup { group_id, name } => self
                .rename_group(&group_id, &name)
                .map(|_| CommandOutcome::Done),
            TabCommand::RecolorGroup { group_id, color } => self
                .recolor_group(&group_id, color)
                .map(|_| CommandOutcome::Done),
            TabCommand::SelectTab { tab_id } => {
                self.select_tab(&tab_id).map(|_| CommandOutcome::Done)
            }
            TabCommand::ClearSelection => {
                self.clear_selection();
                Ok(CommandOutcome::Done)
            }
            TabCommand::Reorder {
                container,
                node_id,
                position,
            } => self
                .reorder(container.as_ref(), &node_id, position)
                .map(|_| CommandOutcome::Done),
            TabCommand::UpdateTitle { tab_id, title } => self
                .update_title(&tab_id, &title)
                .map(|_| CommandOutcome::Done),
            TabCommand::UpdateUrl { tab_id, url } => {
                self.update_url(&tab_id, &url).map(|_| CommandOutcome::Done)
            }
            TabCommand::SetFavicon { tab_id, favicon } => self
                .set_favicon(&tab_id, favicon)
                .map(|_| CommandOutcome::Done),
            TabCommand::SetThumbnail { tab_id, thumbnail } => self
                .set_thumbnail(&tab_id, thumbnail)
                .map(|_| CommandOutcome::Done),
        }
    }

    // ─── Publishing ───

    /// Runs `op` against a copy of the tree and publishes the copy on success.
    fn mutate<T, F>(&mut self, op: &'static str, f: F) -> Result<T, TabError>
    where
        F: FnOnce(&mut TabTree, &mut dyn IdGenerator) -> Result<(T, Vec<TabEvent>), TabError>,
    {
        let mut next = TabTree::clone(&self.current.tree);
        match f(&mut next, self.ids.as_mut()) {
            Ok((value, events)) => {
                self.publish(next, events);
                Ok(value)
            }
            Err(e) => {
                warn!(op, error = %e, "tab operation rejected");
                Err(e)
            }
        }
    }

    fn publish(&mut self, tree: TabTree, events: Vec<TabEvent>) {
        debug_assert!(
            tree.check_invariants().is_ok(),
            "published tree violates invariants: {:?}",
            tree.check_invariants()
        );

        let snapshot = Snapshot {
            tree: Arc::new(tree),
            revision: self.current.revision + 1,
        };
        match self.published.write() {
            Ok(mut guard) => *guard = snapshot.clone(),
            Err(poisoned) => *poisoned.into_inner() = snapshot.clone(),
        }
        self.current = snapshot;

        debug!(revision = self.current.revision, events = events.len(), "tab tree published");
        for event in &events {
            for (_, observer) in &self.observers {
                observer(&self.current, event);
            }
        }
    }
}

impl TabManagerTrait for TabManager {
    // ─── Tabs ───

    /// Opens a new tab; blank title and url come from the settings.
    fn create_tab(&mut self, mut spec: TabSpec) -> Result<TabId, TabError> {
        let defaults = &self.settings.tabs;
        if spec.title.is_empty() {
            spec.title = defaults.new_tab_title.clone();
        }
        if spec.url.is_empty() {
            spec.url = defaults.new_tab_url.clone();
        }
        spec.select |= defaults.select_new_tabs;
        let group = spec.group.clone();
        let select = spec.select;

        self.mutate("create_tab", move |tree, ids| {
            let previous = tree.selected_tab_id();
            let tab_id = tree.create_tab(spec, ids)?;
            let mut events = vec![TabEvent::TabCreated {
                tab_id: tab_id.clone(),
                group,
            }];
            if select {
                events.push(TabEvent::SelectionChanged {
                    previous,
                    current: Some(tab_id.clone()),
                });
            }
            Ok((tab_id, events))
        })
    }

    /// Closes a tab. Selection is left unset if it was the selected one;
    /// use [`TabTree::adjacent_tab`] beforehand to pick a successor.
    fn close_tab(&mut self, tab_id: &TabId) -> Result<Tab, TabError> {
        self.mutate("close_tab", |tree, _| {
            let tab = tree.close_tab(tab_id)?;
            let mut events = vec![TabEvent::TabClosed {
                tab_id: tab_id.clone(),
            }];
            if tab.is_selected() {
                events.push(TabEvent::SelectionChanged {
                    previous: Some(tab_id.clone()),
                    current: None,
                });
            }
            Ok((tab, events))
        })
    }

    fn close_all_tabs(&mut self) -> Vec<TabId> {
        self.mutate("close_all_tabs", |tree, _| {
            let previous = tree.selected_tab_id();
            let closed = tree.close_all_tabs();
            let mut events = vec![TabEvent::TabsClosed {
                tab_ids: closed.clone(),
            }];
            if previous.is_some() {
                events.push(TabEvent::SelectionChanged {
                    previous,
                    current: None,
                });
            }
            Ok((closed, events))
        })
        .unwrap_or_default()
    }

    fn close_other_tabs(&mut self, keep: &TabId) -> Result<Vec<TabId>, TabError> {
        self.mutate("close_other_tabs", |tree, _| {
            let previous = tree.selected_tab_id();
            let closed = tree.close_other_tabs(keep)?;
            let mut events = vec![TabEvent::TabsClosed {
                tab_ids: closed.clone(),
            }];
            if previous.is_some() && tree.selected_tab_id().is_none() {
                events.push(TabEvent::SelectionChanged {
                    previous,
                    current: None,
                });
            }
            Ok((closed, events))
        })
    }

    fn duplicate_tab(&mut self, tab_id: &TabId) -> Result<TabId, TabError> {
        self.mutate("duplicate_tab", |tree, ids| {
            let copy = tree.duplicate_tab(tab_id, ids)?;
            let group = tree.locate(&copy).and_then(|loc| loc.group);
            Ok((
                copy.clone(),
                vec![TabEvent::TabCreated {
                    tab_id: copy,
                    group,
                }],
            ))
        })
    }

    fn select_tab(&mut self, tab_id: &TabId) -> Result<(), TabError> {
        self.mutate("select_tab", |tree, _| {
            let previous = tree.select_tab(tab_id)?;
            Ok((
                (),
                vec![TabEvent::SelectionChanged {
                    previous,
                    current: Some(tab_id.clone()),
                }],
            ))
        })
    }

    fn clear_selection(&mut self) -> Option<TabId> {
        self.mutate("clear_selection", |tree, _| {
            let previous = tree.clear_selection();
            Ok((
                previous.clone(),
                vec![TabEvent::SelectionChanged {
                    previous,
                    current: None,
                }],
            ))
        })
        .unwrap_or_default()
    }

    fn reorder(
        &mut self,
        container: Option<&TabId>,
        node_id: &TabId,
        position: usize,
    ) -> Result<(), TabError> {
        self.mutate("reorder", |tree, _| {
            tree.reorder(container, node_id, position)?;
            Ok((
                (),
                vec![TabEvent::NodeMoved {
                    node_id: node_id.clone(),
                    container: container.cloned(),
                    index: position,
                }],
            ))
        })
    }

    fn update_title(&mut self, tab_id: &TabId, title: &str) -> Result<(), TabError> {
        self.mutate("update_title", |tree, _| {
            tree.update_title(tab_id, title)?;
            Ok(((), updated(tab_id)))
        })
    }

    fn update_url(&mut self, tab_id: &TabId, url: &str) -> Result<(), TabError> {
        self.mutate("update_url", |tree, _| {
            tree.update_url(tab_id, url)?;
            Ok(((), updated(tab_id)))
        })
    }

    fn set_favicon(
        &mut self,
        tab_id: &TabId,
        favicon: Option<ImageHandle>,
    ) -> Result<(), TabError> {
        self.mutate("set_favicon", move |tree, _| {
            tree.set_favicon(tab_id, favicon)?;
            Ok(((), updated(tab_id)))
        })
    }

    fn set_thumbnail(
        &mut self,
        tab_id: &TabId,
        thumbnail: Option<ImageHandle>,
    ) -> Result<(), TabError> {
        self.mutate("set_thumbnail", move |tree, _| {
            tree.set_thumbnail(tab_id, thumbnail)?;
            Ok(((), updated(tab_id)))
        })
    }

    // ─── Groups ───

    fn create_group(
        &mut self,
        name: &str,
        color: GroupColor,
        initial_tabs: &[TabId],
    ) -> Result<TabId, TabError> {
        let name = if name.is_empty() {
            self.settings.groups.default_name.clone()
        } else {
            name.to_string()
        };
        self.mutate("create_group", |tree, ids| {
            let group_id = tree.create_group(&name, color, initial_tabs, ids)?;
            Ok((
                group_id.clone(),
                vec![TabEvent::GroupCreated { group_id }],
            ))
        })
    }

    fn add_tab_to_group(
        &mut self,
        tab_id: &TabId,
        group_id: &TabId,
        position: usize,
    ) -> Result<(), TabError> {
        self.mutate("add_tab_to_group", |tree, _| {
            let index = tree.add_tab_to_group(tab_id, group_id, position)?;
            Ok((
                (),
                vec![TabEvent::TabMoved {
                    tab_id: tab_id.clone(),
                    group: Some(group_id.clone()),
                    index,
                }],
            ))
        })
    }

    fn remove_tab_from_group(&mut self, tab_id: &TabId) -> Result<(), TabError> {
        self.mutate("remove_tab_from_group", |tree, _| {
            let index = tree.remove_tab_from_group(tab_id)?;
            Ok((
                (),
                vec![TabEvent::TabMoved {
                    tab_id: tab_id.clone(),
                    group: None,
                    index,
                }],
            ))
        })
    }

    fn delete_group(
        &mut self,
        group_id: &TabId,
        disposition: GroupDisposition,
    ) -> Result<Vec<Tab>, TabError> {
        self.mutate("delete_group", |tree, _| {
            let previous = tree.selected_tab_id();
            let closed = tree.delete_group(group_id, disposition)?;
            let mut events = vec![TabEvent::GroupDeleted {
                group_id: group_id.clone(),
                disposition,
            }];
            if !closed.is_empty() {
                events.push(TabEvent::TabsClosed {
                    tab_ids: closed.iter().map(|t| t.id().clone()).collect(),
                });
            }
            if previous.is_some() && tree.selected_tab_id().is_none() {
                events.push(TabEvent::SelectionChanged {
                    previous,
                    current: None,
                });
            }
            Ok((closed, events))
        })
    }

    fn merge_groups(&mut self, source: &TabId, target: &TabId) -> Result<(), TabError> {
        self.mutate("merge_groups", |tree, _| {
            tree.merge_groups(source, target)?;
            Ok((
                (),
                vec![TabEvent::GroupsMerged {
                    source: source.clone(),
                    target: target.clone(),
                }],
            ))
        })
    }

    fn set_collapsed(&mut self, group_id: &TabId, collapsed: bool) -> Result<(), TabError> {
        self.mutate("set_collapsed", |tree, _| {
            tree.set_collapsed(group_id, collapsed)?;
            Ok((
                (),
                vec![TabEvent::GroupCollapsed {
                    group_id: group_id.clone(),
                    collapsed,
                }],
            ))
        })
    }

    fn rename_group(&mut self, group_id: &TabId, name: &str) -> Result<(), TabError> {
        self.mutate("rename_group", |tree, _| {
            tree.rename_group(group_id, name)?;
            Ok((
                (),
                vec![TabEvent::GroupRenamed {
                    group_id: group_id.clone(),
                    name: name.to_string(),
                }],
            ))
        })
    }

    fn recolor_group(&mut self, group_id: &TabId, color: GroupColor) -> Result<(), TabError> {
        self.mutate("recolor_group", |tree, _| {
            tree.recolor_group(group_id, color)?;
            Ok((
                (),
                vec![TabEvent::GroupRecolored {
                    group_id: group_id.clone(),
                    color,
                }],
            ))
        })
    }
}

impl Default for TabManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TabManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabManager")
            .field("revision", &self.current.revision)
            .field("tabs", &self.current.tree.tab_count())
            .field("groups", &self.current.tree.group_count())
            .field("observers", &self.observers.len())
            .finish()
    }
}

fn updated(tab_id: &TabId) -> Vec<TabEvent> {
    vec![TabEvent::TabUpdated {
        tab_id: tab_id.clone(),
    }]
}
