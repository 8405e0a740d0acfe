#![allow(clippy::float_cmp)]

use super::*;
use crate::fixtures::{box_shape, path_shape, pt, store_with};
use crate::shape::{EdgeEnd, ShapeKind};

/// Nodes 1 and 2 grouped as "g", connector 3 between them, node 4 outside.
fn store() -> ShapeStore {
    let mut a = box_shape(1, ShapeKind::Rect, 0.0, 0.0, 10.0, 10.0);
    let mut b = box_shape(2, ShapeKind::Rect, 50.0, 0.0, 10.0, 10.0);
    let mut c = box_shape(4, ShapeKind::Rect, 0.0, 50.0, 10.0, 10.0);
    let mut edge = path_shape(3, ShapeKind::Connector, &[(10.0, 5.0), (30.0, 30.0), (5.0, 50.0)]);
    a.data.group_id = Some("g".into());
    b.data.group_id = Some("g".into());
    edge.set_anchor(EdgeEnd::From, Some(Anchor::port(ShapeId(1), "right")));
    edge.set_anchor(EdgeEnd::To, Some(Anchor::center(ShapeId(4))));
    a.add_edge_link(ShapeId(3));
    c.add_edge_link(ShapeId(3));
    store_with([a, b, edge, c])
}

fn counter(start: u64) -> impl FnMut() -> ShapeId {
    let mut n = start;
    move || {
        n += 1;
        ShapeId(n)
    }
}

#[test]
fn capture_follows_z_order_and_skips_missing() {
    let buf = ClipboardBuffer::capture(&store(), &[ShapeId(3), ShapeId(1), ShapeId(99)]).unwrap();
    assert_eq!(buf.ids, vec![ShapeId(1), ShapeId(3)]);
    assert!(!buf.is_empty());
    assert!(ClipboardBuffer::capture(&store(), &[ShapeId(99)]).is_none());
    assert!(ClipboardBuffer::capture(&store(), &[]).is_none());
}

#[test]
fn materialize_assigns_fresh_ids_and_offsets() {
    let defs = ShapeDefinitions::builtin();
    let buf = ClipboardBuffer::capture(&store(), &[ShapeId(1), ShapeId(2)]).unwrap();
    let copies = buf.materialize(&defs, counter(10), 20.0, 20.0).unwrap();
    let new_ids: Vec<ShapeId> = copies.iter().map(|s| s.id).collect();
    assert_eq!(new_ids, vec![ShapeId(11), ShapeId(12)]);
    assert_eq!(defs.bounds(&copies[0]).x, 20.0);
    assert_eq!(defs.bounds(&copies[1]).y, 20.0);
    assert!(copies.iter().all(|s| s.handle.is_none()));
}

#[test]
fn internal_links_are_remapped_and_external_dropped() {
    let defs = ShapeDefinitions::builtin();
    let buf = ClipboardBuffer::capture(&store(), &[ShapeId(1), ShapeId(3)]).unwrap();
    let copies = buf.materialize(&defs, counter(10), 0.0, 0.0).unwrap();
    let node = &copies[0];
    let edge = &copies[1];
    assert_eq!(node.edge_links(), &[ShapeId(12)]);
    assert_eq!(edge.anchor(EdgeEnd::From), Some(&Anchor::port(ShapeId(11), "right")));
    assert_eq!(edge.anchor(EdgeEnd::To), None);
    assert_eq!(edge.points().unwrap()[1], pt(30.0, 30.0));
}

#[test]
fn group_ids_are_remapped_consistently() {
    let defs = ShapeDefinitions::builtin();
    let buf = ClipboardBuffer::capture(&store(), &[ShapeId(1), ShapeId(2), ShapeId(4)]).unwrap();
    let copies = buf.materialize(&defs, counter(10), 0.0, 0.0).unwrap();
    let g0 = copies[0].data.group_id.clone().unwrap();
    let g1 = copies[1].data.group_id.clone().unwrap();
    assert_eq!(g0, g1);
    assert_ne!(g0, "g");
    assert_eq!(copies[2].data.group_id, None);
}
