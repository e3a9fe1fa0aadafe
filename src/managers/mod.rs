// tabtree state managers
// The tab tree holds the structure and its operations; the tab manager owns it,
// publishes snapshots and notifies observers.

pub mod tab_manager;
pub mod tab_tree;
