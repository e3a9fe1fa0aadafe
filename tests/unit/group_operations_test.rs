//! Group operations: create, add/remove members, delete, merge, field updates.

use rstest::{fixture, rstest};
use tabtree::managers::tab_manager::{TabManager, TabManagerTrait};
use tabtree::types::errors::TabError;
use tabtree::types::group::{GroupColor, GroupDisposition};
use tabtree::types::ids::{SequentialIdGenerator, TabId};
use tabtree::types::node::Location;
use tabtree::types::tab::TabSpec;

/// Manager holding four normal tabs `a b c d` and one incognito tab `p`.
struct Fixture {
    mgr: TabManager,
    a: TabId,
    b: TabId,
    c: TabId,
    d: TabId,
    p: TabId,
}

#[fixture]
fn fx() -> Fixture {
    let mut mgr = TabManager::with_id_generator(Box::new(SequentialIdGenerator::new("n")));
    let mut open = |title: &str, incognito: bool| {
        mgr.create_tab(TabSpec::new(title, format!("https://{}.test", title)).incognito(incognito))
            .unwrap()
    };
    let a = open("a", false);
    let b = open("b", false);
    let c = open("c", false);
    let d = open("d", false);
    let p = open("p", true);
    Fixture { mgr, a, b, c, d, p }
}

#[rstest]
fn test_create_group_preserves_given_order(fx: Fixture) {
    let Fixture { mut mgr, a, b, c, .. } = fx;
    let g = mgr
        .create_group("Work", GroupColor(4), &[c.clone(), a.clone(), b.clone()])
        .unwrap();
    let group = mgr.tree().group(&g).unwrap();
    assert_eq!(group.tab_ids(), vec![c, a, b]);
    assert_eq!(group.name, "Work");
    assert_eq!(group.color, GroupColor(4));
    assert!(!group.collapsed);
}

#[rstest]
fn test_create_group_takes_first_tab_slot(fx: Fixture) {
    let Fixture { mut mgr, a, b, c, d, p } = fx;
    let g = mgr
        .create_group("g", GroupColor(0), &[c.clone(), b.clone()])
        .unwrap();
    assert_eq!(mgr.tree().top_level_ids(), vec![a, g, d, p]);
}

#[rstest]
fn test_create_group_moves_tabs_out_of_other_group(fx: Fixture) {
    let Fixture { mut mgr, a, b, .. } = fx;
    let first = mgr
        .create_group("first", GroupColor(0), &[a.clone(), b.clone()])
        .unwrap();
    let second = mgr.create_group("second", GroupColor(1), &[b.clone()]).unwrap();
    assert_eq!(mgr.tree().group(&first).unwrap().tab_ids(), vec![a]);
    assert_eq!(mgr.tree().group(&second).unwrap().tab_ids(), vec![b]);
    assert_eq!(mgr.tree().top_level_ids().last(), Some(&second));
}

#[rstest]
fn test_create_group_with_missing_tab_changes_nothing(fx: Fixture) {
    let Fixture { mut mgr, a, .. } = fx;
    let before = mgr.tree().top_level_ids();
    let result = mgr.create_group("g", GroupColor(0), &[a, TabId::from("ghost")]);
    assert_eq!(result, Err(TabError::NotFound(TabId::from("ghost"))));
    assert_eq!(mgr.tree().top_level_ids(), before);
    assert_eq!(mgr.tree().group_count(), 0);
}

#[rstest]
fn test_create_group_rejects_mixed_incognito(fx: Fixture) {
    let Fixture { mut mgr, a, p, .. } = fx;
    let before = mgr.tree().top_level_ids();
    let result = mgr.create_group("g", GroupColor(0), &[a, p.clone()]);
    assert!(matches!(
        result,
        Err(TabError::IncognitoMismatch { ref tab, .. }) if *tab == p
    ));
    assert_eq!(mgr.tree().top_level_ids(), before);
}

#[rstest]
fn test_create_group_rejects_repeated_tab(fx: Fixture) {
    let Fixture { mut mgr, a, .. } = fx;
    let result = mgr.create_group("g", GroupColor(0), &[a.clone(), a.clone()]);
    assert_eq!(result, Err(TabError::DuplicateId(a)));
}

#[rstest]
fn test_incognito_only_group(fx: Fixture) {
    let Fixture { mut mgr, p, .. } = fx;
    let g = mgr.create_group("private", GroupColor(0), &[p]).unwrap();
    assert_eq!(mgr.tree().group(&g).unwrap().incognito(), Some(true));
}

#[rstest]
#[case(0, 0)]
#[case(1, 1)]
#[case(2, 2)]
#[case(99, 2)]
fn test_add_tab_to_group_clamps_position(
    fx: Fixture,
    #[case] position: usize,
    #[case] expected: usize,
) {
    let Fixture { mut mgr, a, b, c, .. } = fx;
    let g = mgr
        .create_group("g", GroupColor(0), &[a.clone(), b.clone()])
        .unwrap();
    mgr.add_tab_to_group(&c, &g, position).unwrap();
    assert_eq!(mgr.tree().locate(&c), Some(Location::in_group(g, expected)));
}

#[rstest]
fn test_add_tab_moves_between_groups(fx: Fixture) {
    let Fixture { mut mgr, a, b, .. } = fx;
    let g1 = mgr.create_group("g1", GroupColor(0), &[a.clone()]).unwrap();
    let g2 = mgr.create_group("g2", GroupColor(0), &[b.clone()]).unwrap();
    mgr.add_tab_to_group(&a, &g2, 0).unwrap();
    assert!(mgr.tree().group(&g1).unwrap().is_empty());
    assert_eq!(mgr.tree().group(&g2).unwrap().tab_ids(), vec![a, b]);
}

#[rstest]
fn test_add_incognito_tab_to_normal_group_fails(fx: Fixture) {
    let Fixture { mut mgr, a, b, p, .. } = fx;
    let g = mgr
        .create_group("g", GroupColor(0), &[a.clone(), b.clone()])
        .unwrap();
    let p_before = mgr.tree().locate(&p);
    let revision = mgr.revision();

    let result = mgr.add_tab_to_group(&p, &g, 0);

    assert_eq!(
        result,
        Err(TabError::IncognitoMismatch {
            tab: p.clone(),
            group: g.clone(),
        })
    );
    assert_eq!(mgr.tree().locate(&p), p_before);
    assert_eq!(mgr.tree().group(&g).unwrap().tab_ids(), vec![a, b]);
    assert_eq!(mgr.revision(), revision);
}

#[rstest]
fn test_add_to_empty_group_accepts_incognito(fx: Fixture) {
    let Fixture { mut mgr, p, .. } = fx;
    let g = mgr.create_group("g", GroupColor(0), &[]).unwrap();
    mgr.add_tab_to_group(&p, &g, 0).unwrap();
    assert_eq!(mgr.tree().group(&g).unwrap().incognito(), Some(true));
}

#[rstest]
#[case::missing_tab("ghost", true)]
#[case::missing_group("a", false)]
fn test_add_tab_not_found(fx: Fixture, #[case] tab: &str, #[case] group_exists: bool) {
    let Fixture { mut mgr, a, b, .. } = fx;
    let real_group = mgr.create_group("g", GroupColor(0), &[b]).unwrap();
    let tab_id = if tab == "a" { a } else { TabId::from(tab) };
    let group_id = if group_exists {
        real_group
    } else {
        TabId::from("no-group")
    };
    assert!(matches!(
        mgr.add_tab_to_group(&tab_id, &group_id, 0),
        Err(TabError::NotFound(_))
    ));
}

#[rstest]
fn test_remove_tab_from_group_appends_to_top_level(fx: Fixture) {
    let Fixture { mut mgr, a, b, c, d, p } = fx;
    let g = mgr
        .create_group("g", GroupColor(0), &[a.clone(), b.clone()])
        .unwrap();
    mgr.remove_tab_from_group(&a).unwrap();
    assert_eq!(mgr.tree().top_level_ids(), vec![g.clone(), c, d, p, a]);
    assert_eq!(mgr.tree().group(&g).unwrap().tab_ids(), vec![b]);
}

#[rstest]
fn test_remove_last_tab_keeps_empty_group(fx: Fixture) {
    let Fixture { mut mgr, a, .. } = fx;
    let g = mgr.create_group("g", GroupColor(0), &[a.clone()]).unwrap();
    mgr.remove_tab_from_group(&a).unwrap();
    let group = mgr.tree().group(&g).unwrap();
    assert!(group.is_empty());
}

#[rstest]
fn test_remove_ungrouped_tab_fails(fx: Fixture) {
    let Fixture { mut mgr, a, .. } = fx;
    assert_eq!(
        mgr.remove_tab_from_group(&a),
        Err(TabError::NotFound(a))
    );
}

#[rstest]
fn test_delete_group_ungroups_at_former_position(fx: Fixture) {
    let Fixture { mut mgr, a, b, c, d, p } = fx;
    let g = mgr
        .create_group("g", GroupColor(0), &[b.clone(), c.clone()])
        .unwrap();
    assert_eq!(
        mgr.tree().top_level_ids(),
        vec![a.clone(), g.clone(), d.clone(), p.clone()]
    );

    let closed = mgr.delete_group(&g, GroupDisposition::UngroupTabs).unwrap();

    assert!(closed.is_empty());
    assert_eq!(mgr.tree().top_level_ids(), vec![a, b, c, d, p]);
    assert!(mgr.tree().group(&g).is_none());
    assert!(!mgr.tree().contains(&g));
}

#[rstest]
fn test_delete_group_closes_tabs(fx: Fixture) {
    let Fixture { mut mgr, a, b, c, d, p } = fx;
    let g = mgr
        .create_group("g", GroupColor(0), &[b.clone(), c.clone()])
        .unwrap();
    mgr.select_tab(&c).unwrap();

    let closed = mgr.delete_group(&g, GroupDisposition::CloseTabs).unwrap();

    let closed_ids: Vec<TabId> = closed.iter().map(|t| t.id().clone()).collect();
    assert_eq!(closed_ids, vec![b.clone(), c.clone()]);
    assert_eq!(mgr.tree().top_level_ids(), vec![a, d, p]);
    assert!(mgr.tree().tab(&b).is_none());
    assert_eq!(mgr.tree().selected_tab(), None);
}

#[rstest]
#[case(GroupDisposition::UngroupTabs)]
#[case(GroupDisposition::CloseTabs)]
fn test_delete_missing_group(fx: Fixture, #[case] disposition: GroupDisposition) {
    let Fixture { mut mgr, a, .. } = fx;
    assert_eq!(
        mgr.delete_group(&a, disposition),
        Err(TabError::NotFound(a))
    );
}

#[rstest]
fn test_merge_groups_appends_and_removes_source(fx: Fixture) {
    let Fixture { mut mgr, a, b, c, .. } = fx;
    let g1 = mgr
        .create_group("g1", GroupColor(0), &[a.clone(), b.clone()])
        .unwrap();
    let g2 = mgr.create_group("g2", GroupColor(1), &[c.clone()]).unwrap();

    mgr.merge_groups(&g1, &g2).unwrap();

    assert_eq!(mgr.tree().group(&g2).unwrap().tab_ids(), vec![c, a, b]);
    assert!(mgr.tree().group(&g1).is_none());
    assert_eq!(
        mgr.rename_group(&g1, "again"),
        Err(TabError::NotFound(g1))
    );
}

#[rstest]
fn test_merge_incognito_into_normal_fails(fx: Fixture) {
    let Fixture { mut mgr, a, p, .. } = fx;
    let normal = mgr.create_group("n", GroupColor(0), &[a.clone()]).unwrap();
    let private = mgr.create_group("p", GroupColor(0), &[p.clone()]).unwrap();

    let result = mgr.merge_groups(&private, &normal);

    assert!(matches!(result, Err(TabError::IncognitoMismatch { .. })));
    assert_eq!(mgr.tree().group(&normal).unwrap().tab_ids(), vec![a]);
    assert_eq!(mgr.tree().group(&private).unwrap().tab_ids(), vec![p]);
}

#[rstest]
fn test_merge_empty_group_into_any(fx: Fixture) {
    let Fixture { mut mgr, p, .. } = fx;
    let empty = mgr.create_group("e", GroupColor(0), &[]).unwrap();
    let private = mgr.create_group("p", GroupColor(0), &[p.clone()]).unwrap();
    mgr.merge_groups(&empty, &private).unwrap();
    assert_eq!(mgr.tree().group_count(), 1);
    assert_eq!(mgr.tree().group(&private).unwrap().tab_ids(), vec![p]);
}

#[rstest]
fn test_merge_group_into_itself_fails(fx: Fixture) {
    let Fixture { mut mgr, a, .. } = fx;
    let g = mgr.create_group("g", GroupColor(0), &[a]).unwrap();
    assert_eq!(mgr.merge_groups(&g, &g), Err(TabError::SelfMerge(g)));
}

#[rstest]
fn test_merge_missing_group_fails(fx: Fixture) {
    let Fixture { mut mgr, a, .. } = fx;
    let g = mgr.create_group("g", GroupColor(0), &[a]).unwrap();
    let ghost = TabId::from("ghost");
    assert_eq!(
        mgr.merge_groups(&ghost, &g),
        Err(TabError::NotFound(ghost.clone()))
    );
    assert_eq!(mgr.merge_groups(&g, &ghost), Err(TabError::NotFound(ghost)));
}

#[rstest]
fn test_collapse_rename_recolor(fx: Fixture) {
    let Fixture { mut mgr, a, b, .. } = fx;
    let g = mgr
        .create_group("g", GroupColor(0), &[a.clone(), b.clone()])
        .unwrap();

    mgr.set_collapsed(&g, true).unwrap();
    mgr.rename_group(&g, "Reading").unwrap();
    mgr.recolor_group(&g, GroupColor(0xff0000)).unwrap();

    let group = mgr.tree().group(&g).unwrap();
    assert!(group.collapsed);
    assert_eq!(group.name, "Reading");
    assert_eq!(group.color, GroupColor(0xff0000));
    // collapsing is presentation only
    assert_eq!(group.tab_ids(), vec![a, b]);

    mgr.set_collapsed(&g, false).unwrap();
    assert!(!mgr.tree().group(&g).unwrap().collapsed);
}

#[rstest]
fn test_group_field_updates_on_tab_id_fail(fx: Fixture) {
    let Fixture { mut mgr, a, .. } = fx;
    assert!(matches!(mgr.set_collapsed(&a, true), Err(TabError::NotFound(_))));
    assert!(matches!(mgr.rename_group(&a, "x"), Err(TabError::NotFound(_))));
    assert!(matches!(
        mgr.recolor_group(&a, GroupColor(1)),
        Err(TabError::NotFound(_))
    ));
}

#[rstest]
fn test_empty_name_uses_default(fx: Fixture) {
    let Fixture { mut mgr, a, .. } = fx;
    let mut settings = mgr.settings().clone();
    settings.groups.default_name = "Untitled".to_string();
    mgr.set_settings(settings);
    let g = mgr.create_group("", GroupColor(0), &[a]).unwrap();
    assert_eq!(mgr.tree().group(&g).unwrap().name, "Untitled");
}
