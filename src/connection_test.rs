#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;
use crate::fixtures::{assert_point_close, box_shape, path_shape, pt, store_with};
use crate::shape::{PortId, ShapeKind};

const SNAP: WaypointSnap = WaypointSnap { snap_distance: 10.0, align_distance: 6.0 };

/// Rect 1 at the origin, rect 2 to its right, free connector 3 between them
/// with one interior waypoint.
fn two_boxes() -> ShapeStore {
    store_with([
        box_shape(1, ShapeKind::Rect, 0.0, 0.0, 100.0, 60.0),
        box_shape(2, ShapeKind::Rect, 200.0, 0.0, 100.0, 60.0),
        path_shape(3, ShapeKind::Connector, &[(90.0, 30.0), (150.0, 100.0), (210.0, 30.0)]),
    ])
}

fn bound_store() -> (ShapeDefinitions, ShapeStore) {
    let defs = ShapeDefinitions::builtin();
    let mut store = two_boxes();
    assert!(bind(&defs, &mut store, ShapeId(3), EdgeEnd::From, Anchor::port(ShapeId(1), "right")));
    assert!(bind(&defs, &mut store, ShapeId(3), EdgeEnd::To, Anchor::port(ShapeId(2), "left")));
    (defs, store)
}

// =============================================================
// Ports
// =============================================================

#[test]
fn nearest_port_within_radius() {
    let defs = ShapeDefinitions::builtin();
    let store = two_boxes();
    let (id, port) = nearest_port(&defs, store.iter(), pt(104.0, 33.0), 14.0).unwrap();
    assert_eq!(id, ShapeId(1));
    assert_eq!(port.id, PortId::from("right"));
    assert!(nearest_port(&defs, store.iter(), pt(150.0, 30.0), 14.0).is_none());
}

#[test]
fn nearest_port_prefers_closest_of_two_shapes() {
    let defs = ShapeDefinitions::builtin();
    let store = store_with([
        box_shape(1, ShapeKind::Rect, 0.0, 0.0, 100.0, 60.0),
        box_shape(2, ShapeKind::Rect, 108.0, 0.0, 100.0, 60.0),
    ]);
    let (id, _) = nearest_port(&defs, store.iter(), pt(105.0, 30.0), 14.0).unwrap();
    assert_eq!(id, ShapeId(2));
}

#[test]
fn anchor_point_uses_port_then_center() {
    let defs = ShapeDefinitions::builtin();
    let store = two_boxes();
    assert_eq!(anchor_point(&defs, &store, &Anchor::port(ShapeId(1), "bottom")), Some(pt(50.0, 60.0)));
    assert_eq!(anchor_point(&defs, &store, &Anchor::center(ShapeId(1))), Some(pt(50.0, 30.0)));
    assert_eq!(anchor_point(&defs, &store, &Anchor::port(ShapeId(1), "nope")), Some(pt(50.0, 30.0)));
    assert_eq!(anchor_point(&defs, &store, &Anchor::center(ShapeId(9))), None);
}

#[test]
fn resolve_anchor_prefers_port_then_body() {
    let defs = ShapeDefinitions::builtin();
    let store = two_boxes();
    let near_port = resolve_anchor(&defs, &store, store.iter(), pt(202.0, 28.0), 14.0, &[]);
    assert_eq!(near_port, Some(Anchor::port(ShapeId(2), "left")));

    let inside = resolve_anchor(&defs, &store, store.iter(), pt(250.0, 20.0), 14.0, &[]);
    assert_eq!(inside, Some(Anchor::center(ShapeId(2))));

    let excluded = resolve_anchor(&defs, &store, store.iter(), pt(250.0, 20.0), 14.0, &[ShapeId(2)]);
    assert_eq!(excluded, None);

    let empty = resolve_anchor(&defs, &store, store.iter(), pt(150.0, 300.0), 14.0, &[]);
    assert_eq!(empty, None);
}

// =============================================================
// Bind / unbind
// =============================================================

#[test]
fn bind_sets_anchor_terminal_and_link() {
    let (_, store) = bound_store();
    let edge = store.get(&ShapeId(3)).unwrap();
    assert_eq!(edge.terminal(EdgeEnd::From), Some(pt(100.0, 30.0)));
    assert_eq!(edge.terminal(EdgeEnd::To), Some(pt(200.0, 30.0)));
    assert_eq!(edge.points().unwrap()[1], pt(150.0, 100.0));
    assert_eq!(store.get(&ShapeId(1)).unwrap().edge_links(), &[ShapeId(3)]);
    assert_eq!(store.get(&ShapeId(2)).unwrap().edge_links(), &[ShapeId(3)]);
}

#[test]
fn rebinding_moves_link_to_new_target() {
    let (defs, mut store) = bound_store();
    store.insert(box_shape(4, ShapeKind::Rect, 0.0, 200.0, 50.0, 50.0));
    assert!(bind(&defs, &mut store, ShapeId(3), EdgeEnd::To, Anchor::center(ShapeId(4))));
    assert!(store.get(&ShapeId(2)).unwrap().edge_links().is_empty());
    assert_eq!(store.get(&ShapeId(4)).unwrap().edge_links(), &[ShapeId(3)]);
    assert_eq!(store.get(&ShapeId(3)).unwrap().terminal(EdgeEnd::To), Some(pt(25.0, 225.0)));
}

#[test]
fn bind_rejects_missing_target_and_non_edges() {
    let defs = ShapeDefinitions::builtin();
    let mut store = two_boxes();
    assert!(!bind(&defs, &mut store, ShapeId(3), EdgeEnd::From, Anchor::center(ShapeId(99))));
    assert!(!bind(&defs, &mut store, ShapeId(1), EdgeEnd::From, Anchor::center(ShapeId(2))));
    assert!(!store.get(&ShapeId(3)).unwrap().is_connected());
}

#[test]
fn unbind_keeps_link_while_other_end_uses_shape() {
    let defs = ShapeDefinitions::builtin();
    let mut store = two_boxes();
    bind(&defs, &mut store, ShapeId(3), EdgeEnd::From, Anchor::port(ShapeId(1), "right"));
    bind(&defs, &mut store, ShapeId(3), EdgeEnd::To, Anchor::port(ShapeId(1), "bottom"));
    assert_eq!(unbind(&mut store, ShapeId(3), EdgeEnd::From), Some(ShapeId(1)));
    assert_eq!(store.get(&ShapeId(1)).unwrap().edge_links(), &[ShapeId(3)]);
    assert_eq!(unbind(&mut store, ShapeId(3), EdgeEnd::To), Some(ShapeId(1)));
    assert!(store.get(&ShapeId(1)).unwrap().edge_links().is_empty());
    assert_eq!(unbind(&mut store, ShapeId(3), EdgeEnd::To), None);
}

// =============================================================
// Sync
// =============================================================

#[test]
fn moving_a_node_updates_only_bound_terminals() {
    let (defs, mut store) = bound_store();
    if let Some(a) = store.get_mut(&ShapeId(1)) {
        defs.move_by(a, 0.0, 40.0).unwrap();
    }
    assert_eq!(sync_connections(&defs, &mut store, ShapeId(1)), vec![ShapeId(3)]);
    let edge = store.get(&ShapeId(3)).unwrap();
    assert_eq!(edge.points().unwrap(), &[pt(100.0, 70.0), pt(150.0, 100.0), pt(200.0, 30.0)]);
}

#[test]
fn sync_without_change_reports_nothing() {
    let (defs, mut store) = bound_store();
    assert!(sync_connections(&defs, &mut store, ShapeId(2)).is_empty());
    assert!(sync_connections(&defs, &mut store, ShapeId(99)).is_empty());
}

#[test]
fn rotating_a_node_moves_port_terminal() {
    let (defs, mut store) = bound_store();
    if let Some(a) = store.get_mut(&ShapeId(1)) {
        a.data.transform.rotation = 90.0;
    }
    sync_connections(&defs, &mut store, ShapeId(1));
    let from = store.get(&ShapeId(3)).unwrap().terminal(EdgeEnd::From).unwrap();
    assert_point_close(from, pt(50.0, 80.0));
}

// =============================================================
// Waypoints
// =============================================================

#[test]
fn waypoint_projects_onto_nearest_segment() {
    let defs = ShapeDefinitions::builtin();
    let mut store = store_with([path_shape(1, ShapeKind::Connector, &[(0.0, 0.0), (100.0, 0.0)])]);
    assert_eq!(insert_waypoint(&defs, &mut store, ShapeId(1), pt(40.0, 3.0), SNAP), Some(1));
    assert_eq!(store.get(&ShapeId(1)).unwrap().points().unwrap()[1], pt(40.0, 0.0));
}

#[test]
fn waypoint_aligns_to_neighbour_axis() {
    let defs = ShapeDefinitions::builtin();
    let mut store = store_with([path_shape(1, ShapeKind::Connector, &[(0.0, 0.0), (100.0, 10.0)])]);
    insert_waypoint(&defs, &mut store, ShapeId(1), pt(50.0, 5.0), SNAP);
    assert_eq!(store.get(&ShapeId(1)).unwrap().points().unwrap()[1], pt(50.0, 0.0));
}

#[test]
fn waypoint_snaps_to_nearby_port() {
    let defs = ShapeDefinitions::builtin();
    let mut store = store_with([
        box_shape(1, ShapeKind::Rect, 40.0, 16.0, 20.0, 20.0),
        path_shape(2, ShapeKind::Connector, &[(0.0, 10.0), (100.0, 10.0)]),
    ]);
    insert_waypoint(&defs, &mut store, ShapeId(2), pt(50.0, 12.0), SNAP);
    assert_eq!(store.get(&ShapeId(2)).unwrap().points().unwrap()[1], pt(50.0, 16.0));
}

#[test]
fn waypoint_on_box_shape_is_rejected() {
    let defs = ShapeDefinitions::builtin();
    let mut store = two_boxes();
    assert_eq!(insert_waypoint(&defs, &mut store, ShapeId(1), pt(5.0, 5.0), SNAP), None);
    assert_eq!(insert_waypoint(&defs, &mut store, ShapeId(3), pt(f64::NAN, 5.0), SNAP), None);
}
