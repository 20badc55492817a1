//! Scenario: snapshots survive a restart

use tabtree::domain::ports::SnapshotRepository;
use tabtree::infrastructure::JsonSnapshotRepository;
use tempfile::tempdir;

use crate::common::*;

#[test]
fn scenario_restart_restores_tree_and_collapse_state() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tree.json");
    let repo = JsonSnapshotRepository::new();

    let mut first = Session::new();
    first.open(1, None, "a");
    let b = first.open(2, Some(1), "b");
    first.open(3, Some(2), "c");
    first.engine.toggle_collapse(b).unwrap();

    assert!(first.engine.take_snapshot_if_due().is_none());
    first.clock.advance(chrono::TimeDelta::milliseconds(600));
    let forest = first.engine.take_snapshot_if_due().unwrap();
    repo.save(&forest, &path).unwrap();

    let mut second = Session::new();
    let loaded = repo.load(&path).unwrap().unwrap();
    let report = second.engine.restore(&loaded).unwrap();

    assert_eq!(report.nodes, 3);
    assert_eq!(report.repaired, 0);
    assert_eq!(second.node(2), b);
    assert!(second.engine.collapse().is_collapsed(b));
    assert_eq!(
        second.engine.get_visible_nodes(),
        first.engine.get_visible_nodes()
    );
}

#[test]
fn scenario_new_nodes_after_restore_get_fresh_ids() {
    let mut first = Session::new();
    let a = first.open(1, None, "a");
    let b = first.open(2, None, "b");
    first
        .engine
        .apply_event(&tabtree::TabEvent::TabRemoved {
            tab: tabtree::TabId::new(2),
        })
        .unwrap();
    let forest = first.engine.snapshot();

    let mut second = Session::new();
    second.engine.restore(&forest).unwrap();
    let c = second.open(3, None, "c");

    assert_eq!(second.node(1), a);
    assert!(c.get() > b.get());
}
