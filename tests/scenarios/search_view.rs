//! Scenario: searching and collapsing the projected view

use std::collections::HashSet;

use insta::assert_snapshot;
use tabtree::presentation::{render_view, RenderStyle};

use crate::common::*;

/// root -> mid -> foobar ; root -> other -> deep ; lonely
fn forest() -> Session {
    let mut s = Session::new();
    s.open(1, None, "root");
    s.open(2, Some(1), "mid");
    s.open(3, Some(2), "foobar");
    s.open(4, Some(1), "other");
    s.open(5, Some(4), "deep");
    s.open(6, None, "lonely");
    s
}

#[test]
fn scenario_search_keeps_ancestors_and_drops_unrelated_branches() {
    let mut s = forest();
    s.engine.set_search("foo");

    let titles: Vec<String> = s
        .engine
        .get_visible_nodes()
        .into_iter()
        .map(|row| row.title)
        .collect();
    assert_eq!(titles, vec!["root", "mid", "foobar"]);
}

#[test]
fn scenario_collapsed_parent_reports_hidden_match() {
    let mut s = forest();
    let mid = s.node(2);
    assert!(s.engine.toggle_collapse(mid).unwrap());
    s.engine.set_search("foo");

    let view = s.engine.get_visible_nodes();
    assert_eq!(view.len(), 2);
    assert!(view[1].collapsed);
    assert!(view[1].has_matching_descendant);
    assert!(!view[1].matches);
}

#[test]
fn scenario_projection_with_explicit_inputs_leaves_state_alone() {
    let mut s = forest();
    s.engine.set_search("deep");
    let other = s.node(4);
    let collapsed: HashSet<_> = [other].into_iter().collect();

    let view = s.engine.project("", &collapsed);
    assert_eq!(view.len(), 5);
    assert_eq!(s.engine.search().text(), "deep");
    assert!(s.engine.collapse().is_empty());
}

#[test]
fn scenario_rendered_view() {
    let mut s = forest();
    let other = s.node(4);
    s.engine.toggle_collapse(other).unwrap();
    let foobar = s.node(3);
    s.engine.activate(foobar).unwrap();

    let out = render_view(
        &s.engine.get_visible_nodes(),
        s.engine.store().focused_window(),
        RenderStyle::plain(),
    );
    assert_snapshot!(out, @r"
    win:1 (focused)
      - root
        - mid
          . foobar  [active]
        + other
      . lonely
    ");
}
