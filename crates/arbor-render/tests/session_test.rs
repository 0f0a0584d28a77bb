use arbor_core::{ArborConfig, NodeId, Tree, load};
use arbor_render::model::EdgeGeometry;
use arbor_render::{AnimationPlan, EdgePath, LayoutPoint, Session, Settings, VisualState};
use rustc_hash::FxHashSet;
use serde_json::json;

fn abc() -> Tree {
    load(&json!({ "name": "A", "children": [{ "name": "B" }, { "name": "C" }] })).unwrap()
}

fn id_of(session: &Session, label: &str) -> NodeId {
    session
        .tree()
        .nodes()
        .find(|n| n.label() == label)
        .map(|n| n.id())
        .unwrap_or_else(|| panic!("no node {label}"))
}

fn ids<T>(items: &[T], identity: impl Fn(&T) -> NodeId) -> Vec<NodeId> {
    items.iter().map(identity).collect()
}

fn geometry() -> EdgeGeometry {
    EdgeGeometry {
        node_height: 30.0,
        arrow_clearance: 8.0,
    }
}

/// Every identity drawn before or after the cycle lands in exactly one group.
fn assert_partition(plan: &AnimationPlan, before: &[NodeId], after: &[NodeId]) {
    let groups = [&plan.nodes.enter, &plan.nodes.update, &plan.nodes.exit];
    let mut seen = FxHashSet::default();
    for group in groups {
        for t in group {
            assert!(seen.insert(t.identity), "{} listed twice", t.identity);
        }
    }
    let expected: FxHashSet<NodeId> = before.iter().chain(after).copied().collect();
    assert_eq!(seen, expected);
}

#[test]
fn initial_render_grows_out_of_the_anchor() {
    let mut session = Session::new(abc(), Settings::default());
    let plan = session.render_initial(0.0).unwrap();

    assert_eq!(plan.trigger, session.tree().root());
    assert_eq!(plan.nodes.enter.len(), 3);
    assert!(plan.nodes.update.is_empty() && plan.nodes.exit.is_empty());
    for t in &plan.nodes.enter {
        assert_eq!((t.start_x, t.start_y), (480.0, 0.0));
    }
    assert_eq!(plan.edges.enter.len(), 2);
    let anchor = LayoutPoint { x: 480.0, y: 0.0 };
    for e in &plan.edges.enter {
        assert_eq!(e.path_start, EdgePath::collapsed_at(anchor, &geometry()));
    }

    let b = id_of(&session, "B");
    assert_eq!(
        session.animator().state(b),
        VisualState::Entering { until: 750.0 }
    );
    assert_eq!(session.current_layout().unwrap().nodes.len(), 3);
}

#[test]
fn clicking_a_leaf_only_updates() {
    let mut session = Session::new(abc(), Settings::default());
    session.render_initial(0.0).unwrap();
    let b = id_of(&session, "B");

    let plan = session.click(b, 1000.0).unwrap();
    assert_eq!(plan.trigger, b);
    assert!(plan.nodes.enter.is_empty() && plan.nodes.exit.is_empty());
    assert_eq!(plan.nodes.update.len(), 3);
    assert_eq!(plan.edges.update.len(), 2);
    for t in &plan.nodes.update {
        assert_eq!((t.start_x, t.start_y), (t.end_x, t.end_y));
    }
    for e in &plan.edges.update {
        assert_eq!(e.path_start, e.path_end);
    }
}

#[test]
fn collapse_then_expand_round_trip() {
    let mut session = Session::new(abc(), Settings::default());
    let initial = session.render_initial(0.0).unwrap();
    let drawn = ids(&initial.nodes.enter, |t| t.identity);
    session.advance(750.0);
    let (a, b, c) = (
        session.tree().root(),
        id_of(&session, "B"),
        id_of(&session, "C"),
    );

    let collapse = session.click(a, 1000.0).unwrap();
    assert!(collapse.nodes.enter.is_empty());
    assert_eq!(ids(&collapse.nodes.update, |t| t.identity), vec![a]);
    assert_eq!(ids(&collapse.nodes.exit, |t| t.identity), vec![b, c]);
    assert_eq!(ids(&collapse.edges.exit, |t| t.identity), vec![b, c]);
    assert!(collapse.nodes.update[0].collapsed);
    for t in &collapse.nodes.exit {
        assert_eq!((t.end_x, t.end_y), (0.0, 0.0));
    }
    let origin = LayoutPoint { x: 0.0, y: 0.0 };
    for e in &collapse.edges.exit {
        assert_eq!(e.path_end, EdgePath::collapsed_at(origin, &geometry()));
    }
    assert_partition(&collapse, &drawn, &[a]);
    assert_eq!(
        session.animator().state(b),
        VisualState::Exiting { until: 1750.0 }
    );
    assert_eq!(session.current_layout().unwrap().nodes.len(), 1);

    let report = session.advance(1750.0);
    assert_eq!(report.removed, vec![b, c]);
    assert_eq!(session.animator().state(b), VisualState::Absent);

    let expand = session.click(a, 2000.0).unwrap();
    assert_eq!(ids(&expand.nodes.enter, |t| t.identity), vec![b, c]);
    assert_eq!(ids(&expand.edges.enter, |t| t.identity), vec![b, c]);
    for t in &expand.nodes.enter {
        assert_eq!((t.start_x, t.start_y), (0.0, 0.0));
    }
    let ends: Vec<(f64, f64)> = expand.nodes.enter.iter().map(|t| (t.end_x, t.end_y)).collect();
    assert_eq!(ends, vec![(-110.0, 120.0), (110.0, 120.0)]);
    assert_partition(&expand, &[a], &drawn);
}

#[test]
fn transition_baseline_follows_the_committed_layout() {
    let mut session = Session::new(abc(), Settings::default());
    assert_eq!(
        session.tree().root_node().previous_position(),
        arbor_core::geom::point(480.0, 0.0)
    );
    session.render_initial(0.0).unwrap();
    for n in session.tree().nodes() {
        assert_eq!(n.previous_position(), n.position());
    }
    let c = id_of(&session, "C");
    assert_eq!(
        session.tree().get(c).unwrap().position(),
        arbor_core::geom::point(110.0, 120.0)
    );
}

#[test]
fn fast_double_click_reuses_exiting_elements() {
    let mut session = Session::new(abc(), Settings::default());
    session.render_initial(0.0).unwrap();
    let a = session.tree().root();
    let b = id_of(&session, "B");

    session.click(a, 100.0).unwrap();
    assert_eq!(
        session.animator().state(b),
        VisualState::Exiting { until: 850.0 }
    );
    let plan = session.click(a, 200.0).unwrap();
    assert!(plan.nodes.enter.iter().any(|t| t.identity == b));
    assert_eq!(
        session.animator().state(b),
        VisualState::Entering { until: 950.0 }
    );
    assert!(session.advance(900.0).removed.is_empty());
}

#[test]
fn hidden_click_anchors_at_visible_ancestor() {
    let tree = load(&json!({
        "name": "A",
        "children": [{ "name": "B", "children": [{ "name": "D" }] }]
    }))
    .unwrap();
    let mut session = Session::new(tree, Settings::default());
    session.render_initial(0.0).unwrap();
    let a = session.tree().root();
    let b = id_of(&session, "B");
    session.click(a, 1000.0).unwrap();

    let plan = session.click(b, 2000.0).unwrap();
    assert_eq!(plan.trigger, a);
    assert_eq!(ids(&plan.nodes.update, |t| t.identity), vec![a]);
    assert!(session.tree().get(b).unwrap().is_collapsed());
}

#[test]
fn failed_cycle_reverts_the_toggle() {
    let tree = load(&json!({
        "name": "A",
        "children": [{ "name": "B", "children": [{ "name": "C" }] }]
    }))
    .unwrap();
    let settings = Settings {
        max_depth: 1,
        ..Settings::default()
    };
    let mut session = Session::new(tree, settings);
    assert_eq!(session.collapse_below(1), 1);
    session.render_initial(0.0).unwrap();
    let before = session.current_layout().cloned();
    let b = id_of(&session, "B");

    let err = session.click(b, 1000.0).unwrap_err();
    assert!(err.is_layout_overflow(), "{err}");
    assert!(session.tree().get(b).unwrap().is_collapsed());
    assert_eq!(session.current_layout().cloned(), before);
    assert_eq!(
        session.animator().state(b),
        VisualState::Entering { until: 750.0 }
    );
}

#[test]
fn unknown_click_is_an_error() {
    let mut session = Session::new(abc(), Settings::default());
    session.render_initial(0.0).unwrap();
    let ghost: NodeId = serde_json::from_value(json!(99)).unwrap();
    assert!(session.click(ghost, 10.0).is_err());
    assert_eq!(session.current_layout().unwrap().nodes.len(), 3);
}

#[test]
fn sessions_load_from_json_and_edge_lists() {
    let config = ArborConfig::with_overrides(&json!({ "animation": { "duration": 300 } }));
    let mut from_json = Session::from_json_str(
        r#"{ "name": "A", "children": [{ "name": "B" }, { "name": "C" }] }"#,
        &config,
    )
    .unwrap();
    let plan = from_json.render_initial(0.0).unwrap();
    assert_eq!(plan.duration, 300.0);

    let mut from_edges = Session::from_edge_list("A --> B\nA --> C\n", &config).unwrap();
    let other = from_edges.render_initial(0.0).unwrap();
    assert_eq!(plan.nodes, other.nodes);

    let err = Session::from_json_str(r#"{ "children": [] }"#, &config).unwrap_err();
    assert!(err.is_malformed_data());
    let err = Session::from_json_str("{ not json", &config).unwrap_err();
    assert!(err.is_malformed_data());
}

#[test]
fn identical_clicks_give_identical_plans() {
    let run = || {
        let mut session = Session::new(abc(), Settings::default());
        session.render_initial(0.0).unwrap();
        let a = session.tree().root();
        [
            session.click(a, 100.0).unwrap(),
            session.click(a, 200.0).unwrap(),
        ]
    };
    assert_eq!(run(), run());
}

#[test]
fn plan_json_uses_camel_case() {
    let mut session = Session::new(abc(), Settings::default());
    let value = session.render_initial(0.0).unwrap().to_json().unwrap();
    let entering = &value["nodes"]["enter"][1];
    assert_eq!(entering["label"], "B");
    assert_eq!(entering["startX"], 480.0);
    assert_eq!(entering["endX"], -110.0);
    assert_eq!(entering["collapsed"], false);
    assert!(value["edges"]["enter"][0]["pathStart"].is_object());
    assert_eq!(value["startedAt"], 0.0);
}
