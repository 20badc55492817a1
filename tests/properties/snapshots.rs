//! Property tests for snapshot and restore.

use proptest::prelude::*;

use crate::common::*;
use crate::events::event;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 96,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: restoring a snapshot reproduces the same view and a valid forest.
    #[test]
    fn property_restore_of_snapshot_is_lossless(
        events in proptest::collection::vec(event(), 0..50),
        collapse_picks in proptest::collection::vec(0usize..16, 0..4),
    ) {
        let mut s = Session::new();
        for event in &events {
            let _ = s.engine.apply_event(event);
        }
        let mut ids: Vec<_> = s.engine.store().nodes().map(|n| n.id()).collect();
        ids.sort();
        if !ids.is_empty() {
            for pick in collapse_picks {
                let _ = s.engine.toggle_collapse(ids[pick % ids.len()]);
            }
        }

        let forest = s.engine.snapshot();
        let json = serde_json::to_string(&forest).unwrap();
        let parsed: tabtree::SerializedForest = serde_json::from_str(&json).unwrap();

        let mut restored = Session::new();
        let report = restored.engine.restore(&parsed).unwrap();

        prop_assert_eq!(report.repaired, 0);
        prop_assert!(restored.engine.check_invariants().is_ok());
        prop_assert_eq!(restored.engine.get_visible_nodes(), s.engine.get_visible_nodes());
        prop_assert_eq!(restored.engine.store().len(), s.engine.store().len());
        prop_assert_eq!(
            restored.engine.store().focused_window(),
            s.engine.store().focused_window()
        );
    }
}
