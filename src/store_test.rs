#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;
use crate::fixtures::{box_shape, path_shape, store_with};
use crate::shape::{Anchor, EdgeEnd, ShapeKind};

fn ids(v: &[u64]) -> Vec<ShapeId> {
    v.iter().map(|i| ShapeId(*i)).collect()
}

/// Nodes 1 and 2 joined by connector 3; node 4 unrelated.
fn linked_store() -> ShapeStore {
    let mut a = box_shape(1, ShapeKind::Rect, 0.0, 0.0, 10.0, 10.0);
    let mut b = box_shape(2, ShapeKind::Rect, 50.0, 0.0, 10.0, 10.0);
    let mut edge = path_shape(3, ShapeKind::Connector, &[(10.0, 5.0), (50.0, 5.0)]);
    edge.set_anchor(EdgeEnd::From, Some(Anchor::port(ShapeId(1), "right")));
    edge.set_anchor(EdgeEnd::To, Some(Anchor::port(ShapeId(2), "left")));
    a.add_edge_link(ShapeId(3));
    b.add_edge_link(ShapeId(3));
    let c = box_shape(4, ShapeKind::Circle, 0.0, 50.0, 10.0, 10.0);
    store_with([a, b, edge, c])
}

// =============================================================
// Insert / get / remove
// =============================================================

#[test]
fn insert_appends_to_z_order() {
    let store = store_with([
        box_shape(1, ShapeKind::Rect, 0.0, 0.0, 1.0, 1.0),
        box_shape(2, ShapeKind::Rect, 0.0, 0.0, 1.0, 1.0),
    ]);
    assert_eq!(store.ids(), ids(&[1, 2]).as_slice());
    assert_eq!(store.len(), 2);
    assert_eq!(store.index_of(&ShapeId(2)), Some(1));
}

#[test]
fn insert_existing_id_replaces_in_place() {
    let mut store = store_with([
        box_shape(1, ShapeKind::Rect, 0.0, 0.0, 1.0, 1.0),
        box_shape(2, ShapeKind::Rect, 0.0, 0.0, 1.0, 1.0),
    ]);
    store.insert(box_shape(1, ShapeKind::Circle, 0.0, 0.0, 1.0, 1.0));
    assert_eq!(store.ids(), ids(&[1, 2]).as_slice());
    assert_eq!(store.get(&ShapeId(1)).unwrap().kind, ShapeKind::Circle);
}

#[test]
fn remove_unknown_is_none() {
    let mut store = ShapeStore::new();
    assert!(store.remove(&ShapeId(9)).is_none());
    assert!(store.remove_cascade(&ShapeId(9)).is_empty());
    assert!(store.is_empty());
}

#[test]
fn iter_is_bottom_first_and_reversible() {
    let store = linked_store();
    let forward: Vec<u64> = store.iter().map(|s| s.id.0).collect();
    let backward: Vec<u64> = store.iter().rev().map(|s| s.id.0).collect();
    assert_eq!(forward, vec![1, 2, 3, 4]);
    assert_eq!(backward, vec![4, 3, 2, 1]);
}

// =============================================================
// Cascade
// =============================================================

#[test]
fn removing_node_removes_bound_edges_and_unlinks() {
    let mut store = linked_store();
    let removed = store.remove_cascade(&ShapeId(1));
    let removed_ids: Vec<u64> = removed.iter().map(|s| s.id.0).collect();
    assert_eq!(removed_ids, vec![1, 3]);
    assert_eq!(store.ids(), ids(&[2, 4]).as_slice());
    assert!(store.get(&ShapeId(2)).unwrap().edge_links().is_empty());
}

#[test]
fn removing_edge_unlinks_both_nodes() {
    let mut store = linked_store();
    let removed = store.remove_cascade(&ShapeId(3));
    assert_eq!(removed.len(), 1);
    assert!(store.get(&ShapeId(1)).unwrap().edge_links().is_empty());
    assert!(store.get(&ShapeId(2)).unwrap().edge_links().is_empty());
}

#[test]
fn every_edge_anchor_resolves_after_cascade() {
    let mut store = linked_store();
    store.remove_cascade(&ShapeId(2));
    for shape in store.iter() {
        for end in [EdgeEnd::From, EdgeEnd::To] {
            if let Some(anchor) = shape.anchor(end) {
                assert!(store.contains(&anchor.shape_id));
            }
        }
        for edge in shape.edge_links() {
            assert!(store.contains(edge));
        }
    }
}

// =============================================================
// Ordering
// =============================================================

#[test]
fn set_order_accepts_permutation_only() {
    let mut store = linked_store();
    assert!(!store.set_order(ids(&[1, 2, 3])));
    assert!(!store.set_order(ids(&[1, 1, 2, 3])));
    assert!(!store.set_order(ids(&[1, 2, 3, 9])));
    assert!(!store.set_order(ids(&[1, 2, 3, 4])));
    assert!(store.set_order(ids(&[4, 3, 2, 1])));
    assert_eq!(store.ids(), ids(&[4, 3, 2, 1]).as_slice());
}

// =============================================================
// Snapshots
// =============================================================

#[test]
fn snapshot_is_isolated_from_later_writes() {
    let mut store = linked_store();
    let snap = store.snapshot();
    store.get_mut(&ShapeId(1)).unwrap().data.style.fill = "#ff0000".into();
    assert_eq!(snap[0].data.style.fill, "#ffffff");
    assert_eq!(store.get(&ShapeId(1)).unwrap().data.style.fill, "#ff0000");
}

#[test]
fn snapshot_shares_untouched_shapes() {
    let mut store = linked_store();
    let snap = store.snapshot();
    store.get_mut(&ShapeId(1)).unwrap().data.text = Some("x".into());
    let again = store.snapshot();
    assert!(!Rc::ptr_eq(&snap[0], &again[0]));
    assert!(Rc::ptr_eq(&snap[1], &again[1]));
}

#[test]
fn load_replaces_contents_and_order() {
    let mut store = linked_store();
    let snap = store.snapshot();
    store.clear();
    assert!(store.is_empty());
    store.load(snap.into_iter().rev());
    assert_eq!(store.ids(), ids(&[4, 3, 2, 1]).as_slice());
}
