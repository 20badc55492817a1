//! Property tests for drag and drop.

use proptest::prelude::*;

use tabtree::{NodeId, NodeStore, Slot, WindowId};

use crate::common::*;
use crate::events::event;

/// Structure only: per window, pre-order of (node, parent, sibling index, depth).
fn shape(store: &NodeStore) -> Vec<(WindowId, Vec<(NodeId, Option<NodeId>, usize, u32)>)> {
    store
        .windows()
        .map(|window| {
            let rows = store
                .window_preorder(window.id())
                .into_iter()
                .filter_map(|id| store.get(id))
                .map(|node| (node.id(), node.parent(), node.index(), node.depth()))
                .collect();
            (window.id(), rows)
        })
        .collect()
}

#[derive(Debug, Clone)]
enum Target {
    Under(usize),
    RootOf(u32),
}

fn target() -> impl Strategy<Value = Target> {
    prop_oneof![
        3 => (0usize..16).prop_map(Target::Under),
        1 => (1u32..4).prop_map(Target::RootOf),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: a rejected move changes nothing and sends nothing; an accepted
    /// move keeps the forest valid and reverting it restores the structure.
    #[test]
    fn property_moves_are_validated_and_reversible(
        events in proptest::collection::vec(event(), 1..40),
        pick in 0usize..16,
        target in target(),
        index in 0usize..6,
    ) {
        let mut s = Session::new();
        for event in &events {
            let _ = s.engine.apply_event(event);
        }
        let ids: Vec<NodeId> = {
            let mut ids: Vec<NodeId> = s.engine.store().nodes().map(|n| n.id()).collect();
            ids.sort();
            ids
        };
        prop_assume!(!ids.is_empty());

        let node = ids[pick % ids.len()];
        let slot = match target {
            Target::Under(i) => Slot::Child(ids[i % ids.len()]),
            Target::RootOf(w) => Slot::Root(WindowId::new(w)),
        };

        s.drain();
        let before_store = s.engine.store().clone();
        let before = shape(&before_store);

        match s.engine.propose_move(node, slot, index) {
            Err(_) => {
                prop_assert_eq!(s.engine.store(), &before_store);
                prop_assert!(s.drain().is_empty());
            }
            Ok(snapshot) => {
                prop_assert!(s.engine.check_invariants().is_ok());
                if let Slot::Child(parent) = slot {
                    prop_assert_eq!(s.engine.store().get(node).unwrap().parent(), Some(parent));
                }
                s.engine.revert_move(&snapshot).unwrap();
                prop_assert!(s.engine.check_invariants().is_ok());
                prop_assert_eq!(shape(s.engine.store()), before);
            }
        }
    }
}
