//! TabManager publishing: snapshots, readers, observers and command dispatch.

use std::sync::{Arc, Mutex};
use std::thread;

use tabtree::managers::tab_manager::{TabManager, TabManagerTrait};
use tabtree::types::command::{CommandOutcome, TabCommand};
use tabtree::types::errors::TabError;
use tabtree::types::event::TabEvent;
use tabtree::types::group::{GroupColor, GroupDisposition};
use tabtree::types::ids::{SequentialIdGenerator, TabId};
use tabtree::types::settings::EngineSettings;
use tabtree::types::tab::TabSpec;

fn manager() -> TabManager {
    TabManager::with_id_generator(Box::new(SequentialIdGenerator::new("m")))
}

fn recorder(mgr: &mut TabManager) -> Arc<Mutex<Vec<(u64, TabEvent)>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    mgr.subscribe(move |snapshot, event| {
        sink.lock().unwrap().push((snapshot.revision, event.clone()));
    });
    log
}

#[test]
fn test_revision_counts_successful_mutations() {
    let mut mgr = manager();
    assert_eq!(mgr.revision(), 0);
    let a = mgr.create_tab(TabSpec::new("a", "")).unwrap();
    mgr.select_tab(&a).unwrap();
    assert_eq!(mgr.revision(), 2);
    let _ = mgr.select_tab(&TabId::from("missing"));
    assert_eq!(mgr.revision(), 2);
}

#[test]
fn test_reader_sees_published_snapshot() {
    let mut mgr = manager();
    let reader = mgr.reader();
    assert!(reader.load().tree.is_empty());

    let a = mgr.create_tab(TabSpec::new("a", "")).unwrap();
    let snap = reader.load();
    assert_eq!(snap.revision, 1);
    assert!(snap.tree.tab(&a).is_some());
}

#[test]
fn test_reader_on_another_thread() {
    let mut mgr = manager();
    for i in 0..5 {
        mgr.create_tab(TabSpec::new(format!("tab {}", i), "")).unwrap();
    }
    let reader = mgr.reader();
    let handle = thread::spawn(move || {
        let snap = reader.load();
        snap.tree.check_invariants().map(|_| snap.tree.tab_count())
    });
    assert_eq!(handle.join().unwrap(), Ok(5));
}

#[test]
fn test_failed_operation_is_not_visible_to_readers() {
    let mut mgr = manager();
    let a = mgr
        .create_tab(TabSpec::new("a", "").incognito(true))
        .unwrap();
    let b = mgr.create_tab(TabSpec::new("b", "")).unwrap();
    let g = mgr.create_group("g", GroupColor(0), &[b]).unwrap();
    let reader = mgr.reader();
    let before = reader.load();

    assert!(mgr.add_tab_to_group(&a, &g, 0).is_err());

    let after = reader.load();
    assert_eq!(after.revision, before.revision);
    assert!(Arc::ptr_eq(&after.tree, &before.tree));
}

#[test]
fn test_observers_get_events_in_order() {
    let mut mgr = manager();
    let log = recorder(&mut mgr);

    let a = mgr.create_tab(TabSpec::new("a", "").selected()).unwrap();
    let g = mgr.create_group("g", GroupColor(2), &[a.clone()]).unwrap();
    mgr.set_collapsed(&g, true).unwrap();

    let events = log.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            (
                1,
                TabEvent::TabCreated {
                    tab_id: a.clone(),
                    group: None
                }
            ),
            (
                1,
                TabEvent::SelectionChanged {
                    previous: None,
                    current: Some(a.clone())
                }
            ),
            (2, TabEvent::GroupCreated { group_id: g.clone() }),
            (
                3,
                TabEvent::GroupCollapsed {
                    group_id: g,
                    collapsed: true
                }
            ),
        ]
    );
}

#[test]
fn test_observers_not_called_on_failure() {
    let mut mgr = manager();
    let log = recorder(&mut mgr);
    assert!(mgr.close_tab(&TabId::from("ghost")).is_err());
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn test_closing_selected_tab_reports_selection_cleared() {
    let mut mgr = manager();
    let a = mgr.create_tab(TabSpec::new("a", "").selected()).unwrap();
    let log = recorder(&mut mgr);
    mgr.close_tab(&a).unwrap();
    let events: Vec<TabEvent> = log.lock().unwrap().iter().map(|(_, e)| e.clone()).collect();
    assert_eq!(
        events,
        vec![
            TabEvent::TabClosed { tab_id: a.clone() },
            TabEvent::SelectionChanged {
                previous: Some(a),
                current: None
            },
        ]
    );
}

#[test]
fn test_close_all_tabs_reports_selection_cleared() {
    let mut mgr = manager();
    let a = mgr.create_tab(TabSpec::new("a", "")).unwrap();
    let b = mgr.create_tab(TabSpec::new("b", "").selected()).unwrap();
    let log = recorder(&mut mgr);

    let closed = mgr.close_all_tabs();

    let events: Vec<TabEvent> = log.lock().unwrap().iter().map(|(_, e)| e.clone()).collect();
    assert_eq!(
        events,
        vec![
            TabEvent::TabsClosed {
                tab_ids: closed.clone()
            },
            TabEvent::SelectionChanged {
                previous: Some(b.clone()),
                current: None
            },
        ]
    );
    assert_eq!(closed, vec![a, b]);
}

#[test]
fn test_close_all_tabs_without_selection_sends_one_event() {
    let mut mgr = manager();
    mgr.create_tab(TabSpec::new("a", "")).unwrap();
    let log = recorder(&mut mgr);
    mgr.close_all_tabs();
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[test]
fn test_reorder_reports_moved_group_node() {
    let mut mgr = manager();
    let a = mgr.create_tab(TabSpec::new("a", "")).unwrap();
    let b = mgr.create_tab(TabSpec::new("b", "")).unwrap();
    let g = mgr.create_group("g", GroupColor(0), &[b]).unwrap();
    let log = recorder(&mut mgr);

    mgr.reorder(None, &g, 0).unwrap();

    assert_eq!(mgr.tree().top_level_ids(), vec![g.clone(), a]);
    assert_eq!(
        log.lock().unwrap().clone(),
        vec![(
            4,
            TabEvent::NodeMoved {
                node_id: g,
                container: None,
                index: 0
            }
        )]
    );
}

#[test]
fn test_closed_tab_id_cannot_be_supplied_again() {
    let mut mgr = manager();
    let x = mgr.create_tab(TabSpec::new("x", "").with_id("x")).unwrap();
    mgr.close_tab(&x).unwrap();
    let revision = mgr.revision();

    let again = mgr.create_tab(TabSpec::new("x again", "").with_id("x"));

    assert_eq!(again, Err(TabError::DuplicateId(x.clone())));
    assert!(!mgr.tree().contains(&x));
    assert_eq!(mgr.revision(), revision);
}

#[test]
fn test_observer_sees_consistent_snapshot() {
    let mut mgr = manager();
    let a = mgr.create_tab(TabSpec::new("a", "")).unwrap();
    let b = mgr.create_tab(TabSpec::new("b", "")).unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    mgr.subscribe(move |snapshot, _| {
        let selected: Vec<TabId> = snapshot
            .tree
            .tabs()
            .into_iter()
            .filter(|t| t.is_selected())
            .map(|t| t.id().clone())
            .collect();
        sink.lock().unwrap().push(selected);
    });

    mgr.select_tab(&a).unwrap();
    mgr.select_tab(&b).unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![vec![a], vec![b]]);
}

#[test]
fn test_settings_select_new_tabs() {
    let mut settings = EngineSettings::default();
    settings.tabs.select_new_tabs = true;
    settings.tabs.new_tab_url = "https://start.test".to_string();
    let mut mgr = TabManager::with_parts(settings, Box::new(SequentialIdGenerator::new("s")));

    let a = mgr.create_tab(TabSpec::default()).unwrap();
    let tab = mgr.tree().tab(&a).unwrap();
    assert!(tab.is_selected());
    assert_eq!(tab.url, "https://start.test");
}

#[test]
fn test_apply_commands_from_json() {
    let mut mgr = manager();
    let script = r#"[
        {"op": "create_tab", "spec": {"title": "Docs", "url": "https://docs.rs"}},
        {"op": "create_tab", "spec": {"title": "Crates", "url": "https://crates.io", "select": true}},
        {"op": "create_group", "name": "Rust", "tabs": ["m-1", "m-2"]},
        {"op": "set_collapsed", "group_id": "m-3", "collapsed": true},
        {"op": "reorder", "container": "m-3", "node_id": "m-2", "position": 0}
    ]"#;
    let commands: Vec<TabCommand> = serde_json::from_str(script).unwrap();

    let outcomes: Vec<CommandOutcome> = commands
        .into_iter()
        .map(|cmd| mgr.apply(cmd).unwrap())
        .collect();

    assert_eq!(
        outcomes[..3],
        [
            CommandOutcome::Created { id: TabId::from("m-1") },
            CommandOutcome::Created { id: TabId::from("m-2") },
            CommandOutcome::Created { id: TabId::from("m-3") },
        ]
    );
    let group = mgr.tree().group(&TabId::from("m-3")).unwrap();
    assert!(group.collapsed);
    assert_eq!(group.color, GroupColor(0));
    assert_eq!(group.tab_ids(), vec![TabId::from("m-2"), TabId::from("m-1")]);
    assert_eq!(mgr.tree().selected_tab_id(), Some(TabId::from("m-2")));
}

#[test]
fn test_apply_delete_group_reports_closed_tabs() {
    let mut mgr = manager();
    let a = mgr.create_tab(TabSpec::new("a", "")).unwrap();
    let g = mgr.create_group("g", GroupColor(0), &[a.clone()]).unwrap();
    let outcome = mgr
        .apply(TabCommand::DeleteGroup {
            group_id: g,
            disposition: GroupDisposition::CloseTabs,
        })
        .unwrap();
    assert_eq!(outcome, CommandOutcome::Closed { tab_ids: vec![a] });
    assert!(mgr.tree().is_empty());
}

#[test]
fn test_apply_propagates_errors() {
    let mut mgr = manager();
    let result = mgr.apply(TabCommand::MergeGroups {
        source: TabId::from("x"),
        target: TabId::from("y"),
    });
    assert_eq!(result, Err(TabError::NotFound(TabId::from("x"))));
}

#[test]
fn test_restore_replaces_tree() {
    let mut source = manager();
    let a = source.create_tab(TabSpec::new("a", "")).unwrap();
    let tree = source.tree().clone();

    let mut mgr = TabManager::new();
    let log = recorder(&mut mgr);
    mgr.restore(tree).unwrap();

    assert!(mgr.tree().tab(&a).is_some());
    assert_eq!(log.lock().unwrap().clone(), vec![(1, TabEvent::Restored)]);
}
