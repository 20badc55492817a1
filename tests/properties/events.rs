//! Property tests for event reconciliation.

use proptest::prelude::*;

use tabtree::{TabEvent, TabId, WindowId};

use crate::common::*;

/// Small id spaces so events keep hitting existing tabs and windows.
pub fn event() -> impl Strategy<Value = TabEvent> {
    let tab = || (0u32..10).prop_map(TabId::new);
    let window = || (1u32..4).prop_map(WindowId::new);
    prop_oneof![
        4 => (tab(), window(), 0usize..12, proptest::option::of(tab())).prop_map(
            |(tab, window, index, opener)| TabEvent::TabCreated {
                tab,
                window,
                index,
                opener,
                title: Some(format!("t{}", tab.get())),
                url: None,
                pinned: None,
                active: None,
            }
        ),
        2 => tab().prop_map(|tab| TabEvent::TabRemoved { tab }),
        2 => (tab(), 0usize..12).prop_map(|(tab, index)| TabEvent::TabMoved { tab, index }),
        1 => (tab(), window()).prop_map(|(tab, window)| TabEvent::TabActivated { tab, window }),
        1 => (tab(), window(), 0usize..12)
            .prop_map(|(tab, window, index)| TabEvent::TabAttached { tab, window, index }),
        1 => tab().prop_map(|tab| TabEvent::TabUpdated {
            tab,
            title: Some("renamed".to_string()),
            url: None,
            favicon: None,
            loading: Some(true),
            audible: None,
            pinned: None,
        }),
        1 => window().prop_map(|window| TabEvent::WindowCreated { window }),
        1 => window().prop_map(|window| TabEvent::WindowRemoved { window }),
        1 => proptest::option::of(window())
            .prop_map(|window| TabEvent::WindowFocusChanged { window }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: the store stays a valid forest after every event, accepted or not.
    #[test]
    fn property_forest_invariants_hold_after_every_event(
        events in proptest::collection::vec(event(), 0..60)
    ) {
        let mut s = Session::new();
        for event in &events {
            let before = s.engine.store().clone();
            let outcome = s.engine.apply_event(event);
            if let Err(err) = &outcome {
                prop_assert_eq!(s.engine.store(), &before, "rejected {:?} mutated the store: {}", event, err);
            }
            prop_assert!(
                s.engine.check_invariants().is_ok(),
                "after {:?}: {:?}",
                event,
                s.engine.check_invariants()
            );
        }
    }

    /// PROPERTY: each bound tab id maps to exactly one node.
    #[test]
    fn property_tab_ids_stay_unique(
        events in proptest::collection::vec(event(), 0..60)
    ) {
        let mut s = Session::new();
        for event in &events {
            let _ = s.engine.apply_event(event);
        }
        let mut seen = std::collections::HashSet::new();
        for node in s.engine.store().nodes() {
            if let Some(tab) = node.tab_id() {
                prop_assert!(seen.insert(tab), "tab {} bound twice", tab);
            }
        }
    }
}
