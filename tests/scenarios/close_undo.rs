//! Scenario: smart close, confirmation threshold and undo

use tabtree::domain::ports::TabCommand;
use tabtree::{CloseDecision, TabEvent, TabId, TabTreeError};

use crate::common::*;

/// A -> [B -> [D], C]
fn abcd() -> Session {
    let mut session = Session::new();
    session.open(1, None, "A");
    session.open(2, Some(1), "B");
    session.open(4, Some(2), "D");
    session.open(3, Some(1), "C");
    session
}

#[test]
fn scenario_close_branch_then_undo_restores_positions() {
    let mut s = abcd();
    let (a, b, c, d) = (s.node(1), s.node(2), s.node(3), s.node(4));

    // Two candidates, below the threshold: closes immediately.
    let decision = s.engine.close_subtree(b, 3).unwrap();
    let CloseDecision::Closed(receipt) = decision else {
        panic!("expected an immediate close");
    };
    assert_eq!(receipt.closed, vec![b, d]);
    assert_eq!(s.children(a), vec![c]);
    assert_eq!(s.engine.store().get(c).unwrap().index(), 0);

    let closes: Vec<TabCommand> = s.drain().into_iter().map(|i| i.command).collect();
    assert_eq!(
        closes,
        vec![
            TabCommand::CloseTab { tab: TabId::new(2) },
            TabCommand::CloseTab { tab: TabId::new(4) },
        ]
    );

    // The host confirms; both removals are acknowledged silently.
    for tab in [2, 4] {
        s.engine
            .apply_event(&TabEvent::TabRemoved { tab: TabId::new(tab) })
            .unwrap();
    }

    let operation = s.engine.latest_undoable().unwrap();
    let undo = s.engine.undo_close(operation).unwrap();
    assert_eq!(undo.restored, vec![b, d]);
    assert_eq!(s.children(a), vec![b, c]);
    assert_eq!(s.children(b), vec![d]);
    assert_eq!(s.engine.store().get(b).unwrap().index(), 0);
    assert_eq!(s.engine.store().get(c).unwrap().index(), 1);
    assert_eq!(s.engine.awaiting_host(), 2);

    let creates = s.drain();
    assert!(matches!(
        &creates[0].command,
        TabCommand::CreateTab { opener: Some(opener), .. } if *opener == TabId::new(1)
    ));
    let tabs = s.complete_creates(&creates);
    assert_eq!(s.engine.store().node_for_tab(tabs[0]), Some(b));
    assert_eq!(s.engine.store().node_for_tab(tabs[1]), Some(d));
    assert_eq!(s.engine.awaiting_host(), 0);
    s.engine.check_invariants().unwrap();
}

#[test]
fn scenario_large_close_waits_for_confirmation() {
    let mut s = Session::new();
    let root = s.open(1, None, "root");
    for tab in 2..=6 {
        s.open(tab, Some(1), "leaf");
    }
    let before = s.engine.store().clone();

    let decision = s.engine.close_subtree(root, 5).unwrap();
    assert_eq!(
        decision,
        CloseDecision::NeedsConfirmation {
            node: root,
            candidate_count: 6
        }
    );
    assert_eq!(s.engine.store(), &before);
    assert!(s.drain().is_empty());

    let receipt = s.engine.confirm_close(root).unwrap();
    assert_eq!(receipt.closed.len(), 6);
    assert!(s.engine.store().is_empty());
    assert_eq!(s.drain().len(), 6);
}

#[test]
fn scenario_five_candidates_under_threshold_six_close_at_once() {
    let mut s = Session::new();
    let root = s.open(1, None, "root");
    for tab in 2..=5 {
        s.open(tab, Some(1), "leaf");
    }

    let decision = s.engine.close_subtree(root, 6).unwrap();
    assert!(!decision.needs_confirmation());
    assert_eq!(decision.candidate_count(), 5);
    assert!(s.engine.store().is_empty());
}

#[test]
fn scenario_undo_after_window_elapsed_is_reported() {
    let mut s = abcd();
    let b = s.node(2);
    let CloseDecision::Closed(receipt) = s.engine.close_subtree(b, 0).unwrap() else {
        panic!("threshold 0 never asks");
    };

    s.clock.advance(chrono::TimeDelta::seconds(11));
    assert!(s.engine.latest_undoable().is_none());
    let err = s.engine.undo_close(receipt.operation_id).unwrap_err();
    assert!(matches!(err, TabTreeError::UndoExpired { .. }));
}
