//! Scenario: the host drives the forest through lifecycle events

use tabtree::error::Reference;
use tabtree::{TabEvent, TabId, TabTreeError};

use crate::common::*;

#[test]
fn scenario_update_for_unknown_tab_is_dropped() {
    let mut s = Session::new();
    let a = s.open(1, None, "alpha");
    let b = s.open(2, Some(1), "beta");
    let before = s.engine.store().clone();

    let err = s
        .engine
        .apply_event(&TabEvent::TabUpdated {
            tab: TabId::new(99),
            title: Some("new".to_string()),
            url: None,
            favicon: None,
            loading: None,
            audible: None,
            pinned: None,
        })
        .unwrap_err();

    assert!(matches!(
        err,
        TabTreeError::UnknownReference(Reference::Tab(tab)) if tab == TabId::new(99)
    ));
    assert_eq!(s.title(a), "alpha");
    assert_eq!(s.title(b), "beta");
    assert_eq!(s.engine.store(), &before);
}

#[test]
fn scenario_closing_a_parent_in_the_host_promotes_children() {
    let mut s = Session::new();
    let a = s.open(1, None, "a");
    let b = s.open(2, Some(1), "b");
    let c = s.open(3, Some(2), "c");
    let d = s.open(4, Some(2), "d");

    s.engine
        .apply_event(&TabEvent::TabRemoved { tab: TabId::new(2) })
        .unwrap();

    assert!(!s.engine.store().contains(b));
    assert_eq!(s.children(a), vec![c, d]);
    assert_eq!(s.engine.store().get(d).unwrap().depth(), 1);
    s.engine.check_invariants().unwrap();
}

#[test]
fn scenario_tab_dragged_to_another_window_in_the_host() {
    let mut s = Session::new();
    s.engine
        .apply_event(&TabEvent::WindowCreated { window: W2 })
        .unwrap();
    let a = s.open(1, None, "a");
    let b = s.open(2, Some(1), "b");
    let c = s.open(3, Some(2), "c");

    s.engine
        .apply_event(&TabEvent::TabAttached {
            tab: TabId::new(2),
            window: W2,
            index: 0,
        })
        .unwrap();

    let store = s.engine.store();
    assert_eq!(store.get(b).unwrap().window_id(), W2);
    assert!(store.get(b).unwrap().is_root());
    assert_eq!(s.children(a), vec![c]);
    s.engine.check_invariants().unwrap();
}

#[test]
fn scenario_window_closed_drops_its_tabs() {
    let mut s = Session::new();
    s.open(1, None, "a");
    s.open(2, Some(1), "b");
    s.engine
        .apply_event(&TabEvent::WindowRemoved { window: W1 })
        .unwrap();

    assert!(s.engine.store().is_empty());
    assert!(s.drain().is_empty());
}

#[test]
fn scenario_recovery_rebuild_keeps_node_ids() {
    let mut s = Session::new();
    let a = s.open(1, None, "a");
    let b = s.open(2, Some(1), "b");

    let facts = vec![
        tabtree::domain::entities::TabFact::new(TabId::new(1), W1, 0),
        tabtree::domain::entities::TabFact::new(TabId::new(2), W1, 1).with_opener(TabId::new(1)),
    ];
    let stats = s.engine.resync(&facts, [W1], Some(W1));

    assert_eq!(stats.attached, 1);
    assert_eq!(s.node(1), a);
    assert_eq!(s.node(2), b);
    assert_eq!(s.children(a), vec![b]);
}
