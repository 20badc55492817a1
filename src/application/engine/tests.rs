use super::*;
use crate::application::close::CloseDecision;
use crate::application::reconcile::TabEvent;
use crate::config::EngineConfig;
use crate::domain::entities::TabFact;
use crate::domain::ports::{CommandResult, ManualClock, RecordingHost, TabCommand};
use crate::domain::store::Slot;
use crate::domain::value_objects::{NodeId, TabId, WindowId};
use crate::error::TabTreeError;
use chrono::{TimeDelta, TimeZone, Utc};
use std::sync::Arc;

const W1: WindowId = WindowId::new(1);

struct Harness {
    engine: TabTreeEngine,
    host: RecordingHost,
    clock: ManualClock,
}

fn created(tab: u32, index: usize, opener: Option<u32>) -> TabEvent {
    TabEvent::TabCreated {
        tab: TabId::new(tab),
        window: W1,
        index,
        opener: opener.map(TabId::new),
        title: Some(format!("tab {tab}")),
        url: Some(format!("https://example.org/{tab}")),
        pinned: None,
        active: None,
    }
}

/// tab1 -> [tab2 -> [tab4], tab3]
fn harness() -> Harness {
    let host = RecordingHost::new();
    let clock = ManualClock::starting_at(Utc.timestamp_opt(1_700_000_000, 0).unwrap());
    let mut engine = TabTreeEngine::new(
        EngineConfig::default(),
        Arc::new(host.clone()),
        Arc::new(clock.clone()),
    );
    engine.apply_event(&TabEvent::WindowCreated { window: W1 }).unwrap();
    engine.apply_event(&created(1, 0, None)).unwrap();
    engine.apply_event(&created(2, 1, Some(1))).unwrap();
    engine.apply_event(&created(4, 2, Some(2))).unwrap();
    engine.apply_event(&created(3, 3, Some(1))).unwrap();
    Harness {
        engine,
        host,
        clock,
    }
}

impl Harness {
    fn node(&self, tab: u32) -> NodeId {
        self.engine.store().node_for_tab(TabId::new(tab)).unwrap()
    }

    fn commands(&self) -> Vec<TabCommand> {
        self.host.drain().into_iter().map(|issued| issued.command).collect()
    }
}

#[test]
fn close_issues_close_commands_and_acknowledges_removals() {
    let mut h = harness();
    let b = h.node(2);

    let decision = h.engine.close_subtree(b, 0).unwrap();
    assert!(matches!(decision, CloseDecision::Closed(_)));
    assert_eq!(
        h.commands(),
        vec![
            TabCommand::CloseTab { tab: TabId::new(2) },
            TabCommand::CloseTab { tab: TabId::new(4) },
        ]
    );

    let outcome = h
        .engine
        .apply_event(&TabEvent::TabRemoved { tab: TabId::new(2) })
        .unwrap();
    assert!(!outcome.changed);
    h.engine.check_invariants().unwrap();
}

#[test]
fn undo_recreates_tabs_and_binds_results() {
    let mut h = harness();
    let (a, b, d) = (h.node(1), h.node(2), h.node(4));
    let receipt = h.engine.confirm_close(b).unwrap();
    h.host.drain();

    h.engine.undo_close(receipt.operation_id).unwrap();
    let issued = h.host.drain();
    assert_eq!(issued.len(), 2);
    assert_eq!(
        issued[0].command,
        TabCommand::CreateTab {
            url: "https://example.org/2".into(),
            opener: Some(TabId::new(1)),
            window: Some(W1),
        }
    );
    assert_eq!(h.engine.awaiting_host(), 2);
    assert_eq!(h.engine.store().get(a).unwrap().children()[0], b);

    h.engine
        .on_command_result(&CommandResult::Succeeded {
            command: issued[0].id,
            tab: Some(TabId::new(20)),
        })
        .unwrap();
    assert_eq!(h.engine.store().node_for_tab(TabId::new(20)), Some(b));

    // The host's created event for the second tab beats its command result.
    h.engine
        .apply_event(&TabEvent::TabCreated {
            tab: TabId::new(21),
            window: W1,
            index: 2,
            opener: Some(TabId::new(20)),
            title: None,
            url: None,
            pinned: None,
            active: None,
        })
        .unwrap();
    assert_eq!(h.engine.store().len(), 5);

    h.engine
        .on_command_result(&CommandResult::Succeeded {
            command: issued[1].id,
            tab: Some(TabId::new(21)),
        })
        .unwrap();
    let store = h.engine.store();
    assert_eq!(store.len(), 4);
    assert_eq!(store.node_for_tab(TabId::new(21)), Some(d));
    assert_eq!(store.get(b).unwrap().children(), &[d]);
    assert_eq!(h.engine.awaiting_host(), 0);
    h.engine.check_invariants().unwrap();
}

#[test]
fn closing_a_node_awaiting_its_tab_closes_the_recreated_tab() {
    let mut h = harness();
    let (a, b, c) = (h.node(1), h.node(2), h.node(3));
    let receipt = h.engine.confirm_close(b).unwrap();
    h.host.drain();
    h.engine.undo_close(receipt.operation_id).unwrap();
    let issued = h.host.drain();
    assert_eq!(issued.len(), 2);

    // Closed again before the host reported either new tab.
    h.engine.confirm_close(b).unwrap();
    assert!(h.commands().is_empty());

    h.engine
        .on_command_result(&CommandResult::Succeeded {
            command: issued[0].id,
            tab: Some(TabId::new(77)),
        })
        .unwrap();
    assert_eq!(h.commands(), vec![TabCommand::CloseTab { tab: TabId::new(77) }]);

    let outcome = h.engine.apply_event(&created(77, 1, Some(1))).unwrap();
    assert!(!outcome.changed);
    assert_eq!(h.engine.store().node_for_tab(TabId::new(77)), None);
    assert_eq!(h.engine.store().get(a).unwrap().children(), &[c]);

    let outcome = h
        .engine
        .apply_event(&TabEvent::TabRemoved { tab: TabId::new(77) })
        .unwrap();
    assert!(!outcome.changed);
    h.engine.check_invariants().unwrap();
}

#[test]
fn recreated_tab_seen_before_its_result_is_closed_when_node_is_gone() {
    let mut h = harness();
    let b = h.node(2);
    let receipt = h.engine.confirm_close(b).unwrap();
    h.host.drain();
    h.engine.undo_close(receipt.operation_id).unwrap();
    let issued = h.host.drain();
    h.engine.confirm_close(b).unwrap();

    // The host reports the second tab before the command result.
    h.engine.apply_event(&created(78, 2, None)).unwrap();
    assert_eq!(h.engine.store().len(), 3);

    h.engine
        .on_command_result(&CommandResult::Succeeded {
            command: issued[1].id,
            tab: Some(TabId::new(78)),
        })
        .unwrap();
    assert_eq!(h.commands(), vec![TabCommand::CloseTab { tab: TabId::new(78) }]);
    assert_eq!(h.engine.store().len(), 2);
    assert_eq!(h.engine.store().node_for_tab(TabId::new(78)), None);

    let outcome = h
        .engine
        .apply_event(&TabEvent::TabRemoved { tab: TabId::new(78) })
        .unwrap();
    assert!(!outcome.changed);
    h.engine.check_invariants().unwrap();
}

#[test]
fn failed_command_is_reported_without_rollback() {
    let mut h = harness();
    let b = h.node(2);
    h.engine.close_subtree(b, 0).unwrap();
    let before = h.engine.store().clone();
    let close_id = h.host.drain()[0].id;

    let err = h
        .engine
        .on_command_result(&CommandResult::Failed {
            command: close_id,
            reason: "tab is pinned".into(),
        })
        .unwrap_err();

    assert!(matches!(err, TabTreeError::HostCommandFailure { command, .. } if command == close_id));
    assert_eq!(h.engine.store(), &before);
}

#[test]
fn move_aligns_host_strip_to_tree_order() {
    let mut h = harness();
    let (b, c) = (h.node(2), h.node(3));

    h.engine.propose_move(c, Slot::Child(b), 0).unwrap();
    assert_eq!(
        h.commands(),
        vec![
            TabCommand::MoveTab {
                tab: TabId::new(3),
                index: 2,
                window: None
            },
            TabCommand::MoveTab {
                tab: TabId::new(4),
                index: 3,
                window: None
            },
        ]
    );
    h.engine.check_invariants().unwrap();
}

#[test]
fn revert_move_puts_node_back() {
    let mut h = harness();
    let (a, b, c) = (h.node(1), h.node(2), h.node(3));
    let snapshot = h.engine.propose_move(c, Slot::Child(b), 0).unwrap();

    h.engine.revert_move(&snapshot).unwrap();
    assert_eq!(h.engine.store().get(a).unwrap().children(), &[b, c]);
    assert_eq!(h.engine.store().get(c).unwrap().host_index(), 3);
}

#[test]
fn rejected_move_issues_nothing() {
    let mut h = harness();
    let (a, d) = (h.node(1), h.node(4));
    h.host.drain();

    assert!(matches!(
        h.engine.propose_move(a, Slot::Child(d), 0),
        Err(TabTreeError::StructuralViolation { .. })
    ));
    assert!(h.commands().is_empty());
}

#[test]
fn activate_sets_local_state_and_asks_host() {
    let mut h = harness();
    let b = h.node(2);
    h.engine.activate(b).unwrap();

    assert_eq!(h.engine.store().active_node(W1), Some(b));
    assert_eq!(h.engine.store().focused_window(), Some(W1));
    assert_eq!(
        h.commands(),
        vec![
            TabCommand::ActivateTab { tab: TabId::new(2) },
            TabCommand::FocusWindow { window: W1 },
        ]
    );
}

#[test]
fn visible_nodes_follow_search_and_collapse() {
    let mut h = harness();
    let (a, b, c, d) = (h.node(1), h.node(2), h.node(3), h.node(4));

    h.engine.set_search("TAB 4");
    let ids: Vec<NodeId> = h.engine.get_visible_nodes().iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![a, b, d]);

    h.engine.set_search("");
    assert!(h.engine.toggle_collapse(b).unwrap());
    let ids: Vec<NodeId> = h.engine.get_visible_nodes().iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![a, b, c]);
}

#[test]
fn toggle_collapse_of_unknown_node_fails() {
    let mut h = harness();
    assert!(matches!(
        h.engine.toggle_collapse(NodeId::new(999)),
        Err(TabTreeError::UnknownReference(_))
    ));
}

#[test]
fn snapshot_restores_into_fresh_engine() {
    let mut h = harness();
    let b = h.node(2);
    h.engine.toggle_collapse(b).unwrap();
    let snapshot = h.engine.snapshot();

    let mut other = TabTreeEngine::new(
        EngineConfig::default(),
        Arc::new(RecordingHost::new()),
        Arc::new(h.clock.clone()),
    );
    let report = other.restore(&snapshot).unwrap();

    assert_eq!(report.nodes, 4);
    assert_eq!(report.repaired, 0);
    assert_eq!(other.store(), h.engine.store());
    assert!(other.collapse().is_collapsed(b));
}

#[test]
fn restore_forgets_closes_of_the_replaced_forest() {
    let mut h = harness();
    let b = h.node(2);
    let snapshot = h.engine.snapshot();
    let receipt = h.engine.confirm_close(b).unwrap();

    h.engine.restore(&snapshot).unwrap();

    let err = h.engine.undo_close(receipt.operation_id).unwrap_err();
    assert!(matches!(err, TabTreeError::NothingToUndo(op) if op == receipt.operation_id));
    assert_eq!(h.engine.latest_undoable(), None);
    assert_eq!(h.engine.store().len(), 4);
    h.engine.check_invariants().unwrap();
}

#[test]
fn snapshots_are_debounced() {
    let mut h = harness();
    h.engine.flush_snapshot();
    assert!(h.engine.take_snapshot_if_due().is_none());

    h.engine
        .apply_event(&TabEvent::TabMoved {
            tab: TabId::new(3),
            index: 1,
        })
        .unwrap();
    h.clock.advance(TimeDelta::milliseconds(100));
    assert!(h.engine.take_snapshot_if_due().is_none());

    h.clock.advance(TimeDelta::milliseconds(500));
    assert!(h.engine.take_snapshot_if_due().is_some());
    assert!(h.engine.take_snapshot_if_due().is_none());
}

#[test]
fn resync_keeps_node_ids_of_known_tabs() {
    let mut h = harness();
    let (a, b) = (h.node(1), h.node(2));

    let facts = vec![
        TabFact::new(TabId::new(1), W1, 0),
        TabFact::new(TabId::new(2), W1, 1).with_opener(TabId::new(1)),
        TabFact::new(TabId::new(9), W1, 2),
    ];
    let stats = h.engine.resync(&facts, [W1], Some(W1));

    assert_eq!(stats.attached, 1);
    assert_eq!(h.node(1), a);
    assert_eq!(h.node(2), b);
    assert!(h.node(9).get() > 4);
    assert_eq!(h.engine.store().len(), 3);
}

#[test]
fn unknown_update_is_dropped() {
    let mut h = harness();
    let before = h.engine.store().clone();
    let result = h.engine.apply_event(&TabEvent::TabUpdated {
        tab: TabId::new(404),
        title: Some("new".into()),
        url: None,
        favicon: None,
        loading: None,
        audible: None,
        pinned: None,
    });

    assert!(result.is_err());
    assert_eq!(h.engine.store(), &before);
}
