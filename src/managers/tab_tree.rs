//! The tab tree: top-level sequence of tabs and groups, and every operation
//! that reshapes it.
//!
//! Each operation checks all of its preconditions before it touches the
//! structure, so an `Err` return always means nothing changed.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::types::errors::TabError;
use crate::types::group::{GroupColor, GroupDisposition, TabGroup};
use crate::types::ids::{IdGenerator, TabId};
use crate::types::image::ImageHandle;
use crate::types::node::{Location, Node, NodeKind};
use crate::types::tab::{Tab, TabSpec};

/// Upper bound on generator retries before giving up on a colliding id.
const MAX_ID_ATTEMPTS: usize = 64;

/// Ordered tree of tabs and groups, at most two levels deep.
#[derive(Debug, Clone, Default)]
pub struct TabTree {
    nodes: Vec<Node>,
    /// Ids of closed tabs and removed groups. None of them is handed out again.
    retired: HashSet<TabId>,
}

impl TabTree {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            retired: HashSet::new(),
        }
    }

    /// Builds a tree from an existing top-level sequence, rejecting
    /// sequences that break any consistency rule.
    pub fn from_nodes(nodes: Vec<Node>) -> Result<Self, TabError> {
        let tree = Self {
            nodes,
            retired: HashSet::new(),
        };
        tree.check_invariants()?;
        Ok(tree)
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    // ─── Lookup ───

    /// Top-level sequence in display order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn top_level_ids(&self) -> Vec<TabId> {
        self.nodes.iter().map(|n| n.id().clone()).collect()
    }

    /// Every tab in display order, group members inlined.
    pub fn tabs(&self) -> Vec<&Tab> {
        let mut out = Vec::new();
        for node in &self.nodes {
            match node {
                Node::Tab(tab) => out.push(tab),
                Node::Group(group) => out.extend(group.tabs.iter()),
            }
        }
        out
    }

    pub fn groups(&self) -> Vec<&TabGroup> {
        self.nodes.iter().filter_map(Node::as_group).collect()
    }

    pub fn tab(&self, tab_id: &TabId) -> Option<&Tab> {
        let loc = self.locate(tab_id)?;
        self.tab_at(&loc)
    }

    pub fn group(&self, group_id: &TabId) -> Option<&TabGroup> {
        self.nodes.iter().find_map(|n| match n {
            Node::Group(g) if &g.id == group_id => Some(g),
            _ => None,
        })
    }

    /// Whether the id names a tab or a group, if it exists at all.
    pub fn kind_of(&self, id: &TabId) -> Option<NodeKind> {
        if self.group(id).is_some() {
            Some(NodeKind::Group)
        } else if self.locate(id).is_some() {
            Some(NodeKind::Tab)
        } else {
            None
        }
    }

    pub fn contains(&self, id: &TabId) -> bool {
        self.kind_of(id).is_some()
    }

    /// True for ids that belonged to a tab or group that has since gone away.
    pub fn is_retired(&self, id: &TabId) -> bool {
        self.retired.contains(id)
    }

    fn is_taken(&self, id: &TabId) -> bool {
        self.is_retired(id) || self.contains(id)
    }

    /// Where the tab with the given id lives.
    pub fn locate(&self, tab_id: &TabId) -> Option<Location> {
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Tab(tab) if &tab.id == tab_id => return Some(Location::top_level(i)),
                Node::Group(group) => {
                    if let Some(j) = group.position_of(tab_id) {
                        return Some(Location::in_group(group.id.clone(), j));
                    }
                }
                Node::Tab(_) => {}
            }
        }
        None
    }

    pub fn selected_tab(&self) -> Option<&Tab> {
        self.tabs().into_iter().find(|t| t.is_selected)
    }

    pub fn selected_tab_id(&self) -> Option<TabId> {
        self.selected_tab().map(|t| t.id.clone())
    }

    pub fn tab_count(&self) -> usize {
        self.nodes.iter().map(Node::tab_count).sum()
    }

    pub fn group_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.kind() == NodeKind::Group).count()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Deterministic reselection candidate for a tab about to close: the
    /// previous tab in display order, or the next one when it is first.
    pub fn adjacent_tab(&self, tab_id: &TabId) -> Option<TabId> {
        let tabs = self.tabs();
        let pos = tabs.iter().position(|t| &t.id == tab_id)?;
        if pos > 0 {
            Some(tabs[pos - 1].id.clone())
        } else {
            tabs.get(1).map(|t| t.id.clone())
        }
    }

    // ─── Tabs ───

    /// Opens a tab at the end of the top level, or of `spec.group`.
    pub fn create_tab(
        &mut self,
        spec: TabSpec,
        ids: &mut dyn IdGenerator,
    ) -> Result<TabId, TabError> {
        let id = match spec.id {
            Some(id) if self.is_taken(&id) => return Err(TabError::DuplicateId(id)),
            Some(id) => id,
            None => self.fresh_id(ids)?,
        };

        let group_idx = match &spec.group {
            Some(group_id) => {
                let idx = self
                    .group_index(group_id)
                    .ok_or_else(|| TabError::NotFound(group_id.clone()))?;
                if !self.group_at(idx).accepts(spec.incognito) {
                    return Err(TabError::IncognitoMismatch {
                        tab: id,
                        group: group_id.clone(),
                    });
                }
                Some(idx)
            }
            None => None,
        };

        let mut tab = Tab::new(id.clone(), spec.title, spec.url, spec.incognito);
        tab.favicon = spec.favicon;

        match group_idx {
            Some(idx) => self.group_at_mut(idx).tabs.push(tab),
            None => self.nodes.push(Node::Tab(tab)),
        }
        if spec.select {
            self.set_selection(Some(&id));
        }

        trace!(tab_id = %id, "tab created");
        Ok(id)
    }

    /// Removes a tab from whichever sequence holds it and returns it.
    ///
    /// Selection is not reassigned; a group emptied by this stays in place.
    pub fn close_tab(&mut self, tab_id: &TabId) -> Result<Tab, TabError> {
        let loc = self
            .locate(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.clone()))?;
        let tab = self.take_tab(&loc);
        self.retired.insert(tab.id.clone());
        Ok(tab)
    }

    /// Closes every tab. Groups hold nothing but tabs, so they go too.
    pub fn close_all_tabs(&mut self) -> Vec<TabId> {
        let closed: Vec<TabId> = self.tabs().iter().map(|t| t.id.clone()).collect();
        let groups: Vec<TabId> = self.groups().iter().map(|g| g.id.clone()).collect();
        self.retired.extend(closed.iter().cloned());
        self.retired.extend(groups);
        self.nodes.clear();
        closed
    }

    /// Closes every tab except `keep`. Groups stay, even if emptied.
    pub fn close_other_tabs(&mut self, keep: &TabId) -> Result<Vec<TabId>, TabError> {
        if self.locate(keep).is_none() {
            return Err(TabError::NotFound(keep.clone()));
        }
        let closed: Vec<TabId> = self
            .tabs()
            .iter()
            .filter(|t| &t.id != keep)
            .map(|t| t.id.clone())
            .collect();

        self.nodes.retain(|n| match n {
            Node::Tab(tab) => &tab.id == keep,
            Node::Group(_) => true,
        });
        for node in &mut self.nodes {
            if let Node::Group(group) = node {
                group.tabs.retain(|t| &t.id == keep);
            }
        }
        self.retired.extend(closed.iter().cloned());
        Ok(closed)
    }

    /// Opens a copy of a tab right after the original, in the same sequence.
    pub fn duplicate_tab(
        &mut self,
        tab_id: &TabId,
        ids: &mut dyn IdGenerator,
    ) -> Result<TabId, TabError> {
        let loc = self
            .locate(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.clone()))?;
        let new_id = self.fresh_id(ids)?;

        let mut copy = self
            .tab_at(&loc)
            .cloned()
            .ok_or_else(|| TabError::NotFound(tab_id.clone()))?;
        copy.id = new_id.clone();
        copy.is_selected = false;

        self.insert_tab(&loc.group, loc.index + 1, copy);
        Ok(new_id)
    }

    /// Makes `tab_id` the only selected tab and returns the previous one.
    pub fn select_tab(&mut self, tab_id: &TabId) -> Result<Option<TabId>, TabError> {
        if self.locate(tab_id).is_none() {
            return Err(TabError::NotFound(tab_id.clone()));
        }
        let previous = self.selected_tab_id();
        self.set_selection(Some(tab_id));
        Ok(previous)
    }

    /// Unselects whichever tab is selected and returns it.
    pub fn clear_selection(&mut self) -> Option<TabId> {
        let previous = self.selected_tab_id();
        self.set_selection(None);
        previous
    }

    pub fn update_title(&mut self, tab_id: &TabId, title: &str) -> Result<(), TabError> {
        self.tab_mut(tab_id)?.title = title.to_string();
        Ok(())
    }

    pub fn update_url(&mut self, tab_id: &TabId, url: &str) -> Result<(), TabError> {
        self.tab_mut(tab_id)?.url = url.to_string();
        Ok(())
    }

    /// Replaces the favicon handle wholesale (`None` clears it).
    pub fn set_favicon(
        &mut self,
        tab_id: &TabId,
        favicon: Option<ImageHandle>,
    ) -> Result<(), TabError> {
        self.tab_mut(tab_id)?.favicon = favicon;
        Ok(())
    }

    /// Replaces the thumbnail handle wholesale (`None` clears it).
    pub fn set_thumbnail(
        &mut self,
        tab_id: &TabId,
        thumbnail: Option<ImageHandle>,
    ) -> Result<(), TabError> {
        self.tab_mut(tab_id)?.thumbnail = thumbnail;
        Ok(())
    }

    /// Moves a node within its current sequence.
    ///
    /// `container` of `None` means the top level, where both tabs and groups
    /// can be moved. `position` must be a valid index of that sequence.
    pub fn reorder(
        &mut self,
        container: Option<&TabId>,
        node_id: &TabId,
        position: usize,
    ) -> Result<(), TabError> {
        match container {
            None => {
                let from = self
                    .nodes
                    .iter()
                    .position(|n| n.id() == node_id)
                    .ok_or_else(|| TabError::NotFound(node_id.clone()))?;
                check_position(position, self.nodes.len())?;
                let node = self.nodes.remove(from);
                self.nodes.insert(position, node);
            }
            Some(group_id) => {
                let idx = self
                    .group_index(group_id)
                    .ok_or_else(|| TabError::NotFound(group_id.clone()))?;
                let group = self.group_at_mut(idx);
                let from = group
                    .position_of(node_id)
                    .ok_or_else(|| TabError::NotFound(node_id.clone()))?;
                check_position(position, group.tabs.len())?;
                let tab = group.tabs.remove(from);
                group.tabs.insert(position, tab);
            }
        }
        Ok(())
    }

    // ─── Groups ───

    /// Creates a group holding `initial_tabs`, in the given order.
    ///
    /// The group takes the top-level slot of the first listed tab that was
    /// ungrouped; when every listed tab came from another group (or the list
    /// is empty) the group is appended at the end.
    pub fn create_group(
        &mut self,
        name: &str,
        color: GroupColor,
        initial_tabs: &[TabId],
        ids: &mut dyn IdGenerator,
    ) -> Result<TabId, TabError> {
        let mut seen = HashSet::new();
        let mut locations = Vec::with_capacity(initial_tabs.len());
        for tab_id in initial_tabs {
            if !seen.insert(tab_id) {
                return Err(TabError::DuplicateId(tab_id.clone()));
            }
            let loc = self
                .locate(tab_id)
                .ok_or_else(|| TabError::NotFound(tab_id.clone()))?;
            locations.push(loc);
        }

        let group_id = self.fresh_id(ids)?;

        let mut flags = initial_tabs
            .iter()
            .filter_map(|id| self.tab(id).map(|t| (id, t.is_incognito)));
        if let Some((_, first)) = flags.next() {
            if let Some((odd, _)) = flags.find(|(_, flag)| *flag != first) {
                return Err(TabError::IncognitoMismatch {
                    tab: odd.clone(),
                    group: group_id,
                });
            }
        }

        let slot = locations
            .iter()
            .find(|loc| loc.group.is_none())
            .map(|anchor| {
                let removed_before = locations
                    .iter()
                    .filter(|loc| loc.group.is_none() && loc.index < anchor.index)
                    .count();
                anchor.index - removed_before
            });

        let mut group = TabGroup::new(group_id.clone(), name.to_string(), color);
        for tab_id in initial_tabs {
            if let Some(loc) = self.locate(tab_id) {
                group.tabs.push(self.take_tab(&loc));
            }
        }

        let slot = slot.unwrap_or(self.nodes.len()).min(self.nodes.len());
        self.nodes.insert(slot, Node::Group(group));

        debug!(group_id = %group_id, members = initial_tabs.len(), "group created");
        Ok(group_id)
    }

    /// Moves a tab into a group at `position`, clamped to `[0, len]`.
    ///
    /// Returns the index the tab ended up at.
    pub fn add_tab_to_group(
        &mut self,
        tab_id: &TabId,
        group_id: &TabId,
        position: usize,
    ) -> Result<usize, TabError> {
        let loc = self
            .locate(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.clone()))?;
        let group_idx = self
            .group_index(group_id)
            .ok_or_else(|| TabError::NotFound(group_id.clone()))?;

        let already_member = loc.group.as_ref() == Some(group_id);
        let incognito = self.tab_at(&loc).map(|t| t.is_incognito).unwrap_or(false);
        if !already_member && !self.group_at(group_idx).accepts(incognito) {
            return Err(TabError::IncognitoMismatch {
                tab: tab_id.clone(),
                group: group_id.clone(),
            });
        }

        let tab = self.take_tab(&loc);
        let group_idx = self
            .group_index(group_id)
            .ok_or_else(|| TabError::NotFound(group_id.clone()))?;
        let group = self.group_at_mut(group_idx);
        let index = position.min(group.tabs.len());
        group.tabs.insert(index, tab);
        Ok(index)
    }

    /// Moves a grouped tab to the end of the top level. The group stays even
    /// when this leaves it empty.
    pub fn remove_tab_from_group(&mut self, tab_id: &TabId) -> Result<usize, TabError> {
        let loc = self
            .locate(tab_id)
            .filter(Location::is_grouped)
            .ok_or_else(|| TabError::NotFound(tab_id.clone()))?;
        let tab = self.take_tab(&loc);
        self.nodes.push(Node::Tab(tab));
        Ok(self.nodes.len() - 1)
    }

    /// Removes a group. Returns the tabs closed along with it, which is
    /// empty for [`GroupDisposition::UngroupTabs`].
    pub fn delete_group(
        &mut self,
        group_id: &TabId,
        disposition: GroupDisposition,
    ) -> Result<Vec<Tab>, TabError> {
        let idx = self
            .group_index(group_id)
            .ok_or_else(|| TabError::NotFound(group_id.clone()))?;
        let tabs = match self.nodes.remove(idx) {
            Node::Group(group) => group.tabs,
            Node::Tab(_) => unreachable!("group_index only matches groups"),
        };

        debug!(group_id = %group_id, ?disposition, members = tabs.len(), "group deleted");
        self.retired.insert(group_id.clone());
        match disposition {
            GroupDisposition::UngroupTabs => {
                let tail = self.nodes.split_off(idx);
                self.nodes.extend(tabs.into_iter().map(Node::Tab));
                self.nodes.extend(tail);
                Ok(Vec::new())
            }
            GroupDisposition::CloseTabs => {
                self.retired.extend(tabs.iter().map(|t| t.id.clone()));
                Ok(tabs)
            }
        }
    }

    /// Appends all of `source`'s tabs to `target`, then drops `source`.
    pub fn merge_groups(&mut self, source: &TabId, target: &TabId) -> Result<(), TabError> {
        if source == target {
            return Err(TabError::SelfMerge(source.clone()));
        }
        let source_idx = self
            .group_index(source)
            .ok_or_else(|| TabError::NotFound(source.clone()))?;
        let target_idx = self
            .group_index(target)
            .ok_or_else(|| TabError::NotFound(target.clone()))?;

        let source_group = self.group_at(source_idx);
        if let Some(flag) = source_group.incognito() {
            if !self.group_at(target_idx).accepts(flag) {
                return Err(TabError::IncognitoMismatch {
                    tab: source_group.tabs[0].id.clone(),
                    group: target.clone(),
                });
            }
        }

        let moved = match self.nodes.remove(source_idx) {
            Node::Group(group) => group.tabs,
            Node::Tab(_) => unreachable!("group_index only matches groups"),
        };
        let target_idx = self
            .group_index(target)
            .ok_or_else(|| TabError::NotFound(target.clone()))?;
        self.group_at_mut(target_idx).tabs.extend(moved);
        self.retired.insert(source.clone());

        debug!(source = %source, target = %target, "groups merged");
        Ok(())
    }

    pub fn set_collapsed(&mut self, group_id: &TabId, collapsed: bool) -> Result<(), TabError> {
        self.group_mut(group_id)?.collapsed = collapsed;
        Ok(())
    }

    pub fn rename_group(&mut self, group_id: &TabId, name: &str) -> Result<(), TabError> {
        self.group_mut(group_id)?.name = name.to_string();
        Ok(())
    }

    pub fn recolor_group(&mut self, group_id: &TabId, color: GroupColor) -> Result<(), TabError> {
        self.group_mut(group_id)?.color = color;
        Ok(())
    }

    // ─── Consistency ───

    /// Verifies the structural rules of the tree:
    /// unique ids across tabs and groups, at most one selected tab, and
    /// groups that never mix incognito and normal tabs.
    pub fn check_invariants(&self) -> Result<(), TabError> {
        let mut seen: HashSet<&TabId> = HashSet::new();
        let mut selected = 0usize;

        for node in &self.nodes {
            if !seen.insert(node.id()) {
                return Err(TabError::InvariantViolation(format!(
                    "id {} appears more than once",
                    node.id()
                )));
            }
            let members: &[Tab] = match node {
                Node::Tab(tab) => std::slice::from_ref(tab),
                Node::Group(group) => {
                    if group.tabs.iter().any(|t| t.is_incognito != group.tabs[0].is_incognito) {
                        return Err(TabError::InvariantViolation(format!(
                            "group {} mixes incognito and normal tabs",
                            group.id
                        )));
                    }
                    &group.tabs
                }
            };
            for tab in members {
                if matches!(node, Node::Group(_)) && !seen.insert(&tab.id) {
                    return Err(TabError::InvariantViolation(format!(
                        "id {} appears more than once",
                        tab.id
                    )));
                }
                if tab.is_selected {
                    selected += 1;
                }
            }
        }

        if selected > 1 {
            return Err(TabError::InvariantViolation(format!(
                "{} tabs are selected at once",
                selected
            )));
        }
        Ok(())
    }

    // ─── Internals ───

    fn fresh_id(&self, ids: &mut dyn IdGenerator) -> Result<TabId, TabError> {
        let mut last = None;
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = ids.next_id();
            if !self.is_taken(&id) {
                return Ok(id);
            }
            last = Some(id);
        }
        Err(TabError::DuplicateId(
            last.unwrap_or_else(|| TabId::new(String::new())),
        ))
    }

    fn group_index(&self, group_id: &TabId) -> Option<usize> {
        self.nodes
            .iter()
            .position(|n| matches!(n, Node::Group(g) if &g.id == group_id))
    }

    fn group_at(&self, idx: usize) -> &TabGroup {
        match &self.nodes[idx] {
            Node::Group(group) => group,
            Node::Tab(_) => unreachable!("index does not point at a group"),
        }
    }

    fn group_at_mut(&mut self, idx: usize) -> &mut TabGroup {
        match &mut self.nodes[idx] {
            Node::Group(group) => group,
            Node::Tab(_) => unreachable!("index does not point at a group"),
        }
    }

    fn group_mut(&mut self, group_id: &TabId) -> Result<&mut TabGroup, TabError> {
        let idx = self
            .group_index(group_id)
            .ok_or_else(|| TabError::NotFound(group_id.clone()))?;
        Ok(self.group_at_mut(idx))
    }

    fn tab_at(&self, loc: &Location) -> Option<&Tab> {
        match &loc.group {
            None => self.nodes.get(loc.index).and_then(Node::as_tab),
            Some(group_id) => self.group(group_id)?.tabs.get(loc.index),
        }
    }

    fn tab_mut(&mut self, tab_id: &TabId) -> Result<&mut Tab, TabError> {
        let not_found = || TabError::NotFound(tab_id.clone());
        let loc = self.locate(tab_id).ok_or_else(not_found)?;
        match &loc.group {
            None => match self.nodes.get_mut(loc.index) {
                Some(Node::Tab(tab)) => Ok(tab),
                _ => Err(not_found()),
            },
            Some(group_id) => {
                let idx = self.group_index(group_id).ok_or_else(not_found)?;
                self.group_at_mut(idx)
                    .tabs
                    .get_mut(loc.index)
                    .ok_or_else(not_found)
            }
        }
    }

    /// Removes the tab at a location obtained from `locate`.
    fn take_tab(&mut self, loc: &Location) -> Tab {
        match &loc.group {
            None => match self.nodes.remove(loc.index) {
                Node::Tab(tab) => tab,
                Node::Group(_) => unreachable!("location does not point at a tab"),
            },
            Some(group_id) => {
                let idx = self
                    .group_index(group_id)
                    .unwrap_or_else(|| unreachable!("location names a missing group"));
                self.group_at_mut(idx).tabs.remove(loc.index)
            }
        }
    }

    fn insert_tab(&mut self, group: &Option<TabId>, index: usize, tab: Tab) {
        match group.as_ref().and_then(|g| self.group_index(g)) {
            Some(idx) => {
                let group = self.group_at_mut(idx);
                let index = index.min(group.tabs.len());
                group.tabs.insert(index, tab);
            }
            None => {
                let index = index.min(self.nodes.len());
                self.nodes.insert(index, Node::Tab(tab));
            }
        }
    }

    fn set_selection(&mut self, selected: Option<&TabId>) {
        for node in &mut self.nodes {
            match node {
                Node::Tab(tab) => tab.is_selected = Some(&tab.id) == selected,
                Node::Group(group) => {
                    for tab in &mut group.tabs {
                        tab.is_selected = Some(&tab.id) == selected;
                    }
                }
            }
        }
    }
}

fn check_position(position: usize, len: usize) -> Result<(), TabError> {
    if position >= len {
        return Err(TabError::InvalidPosition { position, len });
    }
    Ok(())
}
