use super::*;
use crate::geometry::Point;
use crate::types::{EndCapStyle, NodeKind, ShapeNode, StrokeStyle};

/// Pushes one raw pointer event through the app's dispatcher and gesture
/// handlers, the same path `handle_canvas_input` takes each frame.
fn pointer(app: &mut CanvasApp, kind: PointerKind, x: f64, y: f64) {
    let raw = RawPointerEvent {
        kind,
        point: Point::new(x, y),
    };
    let events = app.dispatcher.dispatch(&app.scene, &app.zoom, raw);
    for event in events {
        app.handle_dispatched(event, false);
    }
}

/// Like [`pointer`] but flags the click as the second of a double-click.
fn double_click(app: &mut CanvasApp, x: f64, y: f64) {
    let raw = RawPointerEvent {
        kind: PointerKind::Click,
        point: Point::new(x, y),
    };
    let events = app.dispatcher.dispatch(&app.scene, &app.zoom, raw);
    for event in events {
        app.handle_dispatched(event, true);
    }
}

/// App with two 150x70 plain nodes at (100, 100) and (400, 300).
fn app_with_two_nodes() -> (CanvasApp, crate::types::NodeId, crate::types::NodeId) {
    let mut app = CanvasApp::new();
    let a = app
        .scene
        .add_node(ShapeNode::new(NodeKind::Plain, Point::new(100.0, 100.0)));
    let b = app
        .scene
        .add_node(ShapeNode::new(NodeKind::Plain, Point::new(400.0, 300.0)));
    (app, a, b)
}

#[test]
fn relationship_drag_creates_routed_arrow() {
    let (mut app, a, b) = app_with_two_nodes();
    app.tool = Tool::Inherits;

    // Press on A's center, drag to B's center, release there.
    pointer(&mut app, PointerKind::Press, 175.0, 135.0);
    pointer(&mut app, PointerKind::Drag, 475.0, 335.0);
    pointer(&mut app, PointerKind::Release, 475.0, 335.0);

    assert_eq!(app.scene.arrows.len(), 1);
    let arrow = app.scene.arrows.values().next().unwrap();
    assert_eq!(arrow.start, a);
    assert_eq!(arrow.end, b);
    assert_eq!(arrow.stroke, StrokeStyle::Solid);
    assert_eq!(arrow.cap, EndCapStyle::Triangle);

    // Greater horizontal separation: the route leaves A's right edge and
    // enters B's left edge, jogging once through the vertical midline.
    assert_eq!(arrow.route.first().copied(), Some(Point::new(250.0, 135.0)));
    assert_eq!(arrow.route.last().copied(), Some(Point::new(400.0, 335.0)));
    assert_eq!(arrow.route.len(), 4);

    assert!(app.can_undo());
    assert!(app.is_dirty());
}

#[test]
fn releasing_over_empty_canvas_creates_nothing() {
    let (mut app, _, _) = app_with_two_nodes();
    app.tool = Tool::Composes;

    pointer(&mut app, PointerKind::Press, 175.0, 135.0);
    pointer(&mut app, PointerKind::Drag, 800.0, 700.0);
    pointer(&mut app, PointerKind::Release, 800.0, 700.0);

    assert!(app.scene.arrows.is_empty());
    assert!(!app.can_undo());
    assert!(app.interaction.pending_arrow_from.is_none());
}

#[test]
fn duplicate_relationship_is_ignored() {
    let (mut app, a, b) = app_with_two_nodes();
    app.scene
        .add_arrow(a, b, StrokeStyle::Solid, EndCapStyle::OutlineDiamond)
        .unwrap();
    app.tool = Tool::Aggregates;

    pointer(&mut app, PointerKind::Press, 175.0, 135.0);
    pointer(&mut app, PointerKind::Release, 475.0, 335.0);

    assert_eq!(app.scene.arrows.len(), 1);
    assert!(!app.can_undo());
}

#[test]
fn node_drag_records_one_move_and_undo_restores_routes() {
    let (mut app, a, b) = app_with_two_nodes();
    let arrow_id = app
        .scene
        .add_arrow(a, b, StrokeStyle::Solid, EndCapStyle::Triangle)
        .unwrap();
    let route_before = app.scene.arrows[&arrow_id].route.clone();

    app.tool = Tool::Select;
    pointer(&mut app, PointerKind::Press, 175.0, 135.0);
    pointer(&mut app, PointerKind::Drag, 225.0, 185.0);
    pointer(&mut app, PointerKind::Drag, 275.0, 235.0);
    pointer(&mut app, PointerKind::Release, 275.0, 235.0);

    assert_eq!(app.scene.nodes[&a].position, Point::new(200.0, 200.0));
    let route_after = app.scene.arrows[&arrow_id].route.clone();
    assert_ne!(route_after, route_before, "attached arrow rerouted");

    // The whole drag collapses into a single history entry.
    app.undo();
    assert_eq!(app.scene.nodes[&a].position, Point::new(100.0, 100.0));
    assert_eq!(app.scene.arrows[&arrow_id].route, route_before);
    assert!(!app.can_undo());

    app.redo();
    assert_eq!(app.scene.nodes[&a].position, Point::new(200.0, 200.0));
    assert_eq!(app.scene.arrows[&arrow_id].route, route_after);
}

#[test]
fn click_at_half_zoom_creates_node_at_descaled_point() {
    let mut app = CanvasApp::new();
    app.tool = Tool::Class;
    app.zoom.set_level_index(0); // 0.5x

    pointer(&mut app, PointerKind::Click, 100.0, 100.0);

    assert_eq!(app.scene.nodes.len(), 1);
    let node = app.scene.nodes.values().next().unwrap();
    assert_eq!(node.position, Point::new(200.0, 200.0));
    assert!(matches!(node.kind, NodeKind::Class { .. }));
    assert_eq!(app.selection.node, Some(node.id));
}

#[test]
fn sticky_press_still_resolves_release_by_position() {
    let (mut app, a, b) = app_with_two_nodes();
    app.tool = Tool::Implements;

    pointer(&mut app, PointerKind::Press, 175.0, 135.0);
    // Wander over empty canvas mid-drag; the gesture survives.
    pointer(&mut app, PointerKind::Drag, 320.0, 500.0);
    pointer(&mut app, PointerKind::Drag, 450.0, 320.0);
    pointer(&mut app, PointerKind::Release, 450.0, 320.0);

    let arrow = app.scene.arrows.values().next().expect("arrow created");
    assert_eq!((arrow.start, arrow.end), (a, b));
    assert_eq!(arrow.stroke, StrokeStyle::Dashed);
}

#[test]
fn delete_selection_round_trips_through_history() {
    let (mut app, a, b) = app_with_two_nodes();
    let arrow_id = app
        .scene
        .add_arrow(a, b, StrokeStyle::Solid, EndCapStyle::FilledDiamond)
        .unwrap();

    app.tool = Tool::Select;
    pointer(&mut app, PointerKind::Click, 175.0, 135.0);
    assert_eq!(app.selection.node, Some(a));

    app.delete_selection();
    assert!(!app.scene.nodes.contains_key(&a));
    assert!(!app.scene.arrows.contains_key(&arrow_id), "attached arrow removed");
    assert!(app.selection.is_empty());

    app.undo();
    assert!(app.scene.nodes.contains_key(&a));
    let arrow = &app.scene.arrows[&arrow_id];
    assert!(!arrow.route.is_empty(), "restored arrow rerouted");
    assert!(app.scene.nodes[&a].attached.contains(&arrow_id));

    app.redo();
    assert!(!app.scene.nodes.contains_key(&a));
    assert!(!app.scene.arrows.contains_key(&arrow_id));
}

#[test]
fn clicking_arrow_selects_it_and_background_clears() {
    let (mut app, a, b) = app_with_two_nodes();
    let arrow_id = app
        .scene
        .add_arrow(a, b, StrokeStyle::Solid, EndCapStyle::Triangle)
        .unwrap();

    app.tool = Tool::Select;
    // A point on the route's horizontal first segment.
    pointer(&mut app, PointerKind::Click, 300.0, 140.0);
    assert_eq!(app.selection.arrow, Some(arrow_id));
    assert_eq!(app.selection.node, None);

    pointer(&mut app, PointerKind::Click, 900.0, 900.0);
    assert!(app.selection.is_empty());
}

#[test]
fn double_click_edits_title_and_commit_resizes() {
    let (mut app, a, _) = app_with_two_nodes();
    app.tool = Tool::Select;

    // Double-click in the title band.
    double_click(&mut app, 110.0, 105.0);
    let edit = app.interaction.text_edit.as_ref().expect("edit started");
    assert_eq!(edit.node_id, a);
    assert_eq!(edit.buffer, "Untitled");

    app.interaction.text_edit.as_mut().unwrap().buffer =
        "VeryLongClassNameForResize".to_string();
    app.commit_text_edit();

    let node = &app.scene.nodes[&a];
    assert_eq!(node.title, "VeryLongClassNameForResize");
    // 26 characters at the fixed metric, plus horizontal padding.
    assert_eq!(node.size.width, 26.0 * 8.0 + 24.0);

    app.undo();
    let node = &app.scene.nodes[&a];
    assert_eq!(node.title, "Untitled");
    assert_eq!(node.size.width, 150.0);
}

#[test]
fn unchanged_text_edit_records_nothing() {
    let (mut app, _, _) = app_with_two_nodes();
    app.tool = Tool::Select;

    double_click(&mut app, 110.0, 105.0);
    assert!(app.interaction.text_edit.is_some());
    app.commit_text_edit();

    assert!(app.interaction.text_edit.is_none());
    assert!(!app.can_undo());
}

#[test]
fn save_marker_tracks_identity_across_undo_redo() {
    let mut app = CanvasApp::new();
    assert!(app.is_saved(), "fresh app is clean");

    app.tool = Tool::Interface;
    pointer(&mut app, PointerKind::Click, 50.0, 50.0);
    assert!(app.is_dirty());

    // Simulate a completed save: the marker becomes the last performed
    // action's token.
    app.file.last_saved_action = app.history.last_performed();
    assert!(app.is_saved());

    app.undo();
    assert!(app.is_dirty(), "undoing past the save point dirties");

    app.redo();
    assert!(app.is_saved(), "redo restores the exact saved action");
}

#[test]
fn new_diagram_resets_everything() {
    let (mut app, a, b) = app_with_two_nodes();
    app.scene
        .add_arrow(a, b, StrokeStyle::Solid, EndCapStyle::Triangle)
        .unwrap();
    app.tool = Tool::Select;
    pointer(&mut app, PointerKind::Click, 175.0, 135.0);
    app.delete_selection();
    app.file.current_path = Some("diagram.json".to_string());

    app.new_diagram();

    assert!(app.scene.nodes.is_empty());
    assert!(app.scene.arrows.is_empty());
    assert!(!app.can_undo());
    assert!(app.selection.is_empty());
    assert_eq!(app.file.current_path, None);
    assert!(app.is_saved());
}

#[test]
fn scene_save_load_round_trip_preserves_routes() {
    let (mut app, a, b) = app_with_two_nodes();
    let arrow_id = app
        .scene
        .add_arrow(a, b, StrokeStyle::Dashed, EndCapStyle::Triangle)
        .unwrap();
    let route = app.scene.arrows[&arrow_id].route.clone();

    let json = app.scene.to_json().unwrap();
    let restored = crate::types::Scene::from_json(&json).unwrap();

    assert_eq!(restored.nodes.len(), 2);
    assert_eq!(restored.arrows[&arrow_id].route, route, "route rebuilt on load");
    assert!(restored.nodes[&a].attached.contains(&arrow_id));
    assert!(restored.nodes[&b].attached.contains(&arrow_id));
}
