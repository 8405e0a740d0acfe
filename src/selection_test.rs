use super::*;
use crate::fixtures::{box_shape, store_with};
use crate::shape::ShapeKind;

fn grouped_store() -> ShapeStore {
    let mut a = box_shape(1, ShapeKind::Rect, 0.0, 0.0, 10.0, 10.0);
    let mut b = box_shape(2, ShapeKind::Rect, 20.0, 0.0, 10.0, 10.0);
    let c = box_shape(3, ShapeKind::Rect, 40.0, 0.0, 10.0, 10.0);
    let mut d = box_shape(4, ShapeKind::Rect, 60.0, 0.0, 10.0, 10.0);
    a.data.group_id = Some("g".into());
    b.data.group_id = Some("g".into());
    d.data.group_id = Some("g".into());
    store_with([a, b, c, d])
}

// =============================================================
// Mutations and change reports
// =============================================================

#[test]
fn select_single_reports_entered_and_left() {
    let mut sel = Selection::new();
    let change = sel.select_single(ShapeId(1));
    assert_eq!(change.entered, vec![ShapeId(1)]);
    assert!(change.left.is_empty());

    let change = sel.select_single(ShapeId(2));
    assert_eq!(change.entered, vec![ShapeId(2)]);
    assert_eq!(change.left, vec![ShapeId(1)]);
    assert_eq!(sel.ids(), &[ShapeId(2)]);
}

#[test]
fn reselecting_same_is_empty_change() {
    let mut sel = Selection::new();
    sel.select_single(ShapeId(1));
    assert!(sel.select_single(ShapeId(1)).is_empty());
}

#[test]
fn select_multiple_drops_duplicates_and_keeps_order() {
    let mut sel = Selection::new();
    sel.select_multiple([ShapeId(3), ShapeId(1), ShapeId(3)]);
    assert_eq!(sel.ids(), &[ShapeId(3), ShapeId(1)]);
    assert_eq!(sel.primary(), Some(ShapeId(3)));
}

#[test]
fn toggle_adds_then_removes() {
    let mut sel = Selection::new();
    sel.toggle(ShapeId(1));
    sel.toggle(ShapeId(2));
    assert_eq!(sel.len(), 2);
    let change = sel.toggle(ShapeId(1));
    assert_eq!(change.left, vec![ShapeId(1)]);
    assert_eq!(sel.ids(), &[ShapeId(2)]);
}

#[test]
fn add_existing_is_noop() {
    let mut sel = Selection::new();
    sel.add(ShapeId(1));
    assert!(sel.add(ShapeId(1)).is_empty());
    assert_eq!(sel.len(), 1);
}

#[test]
fn clear_reports_everything_left() {
    let mut sel = Selection::new();
    sel.select_multiple([ShapeId(1), ShapeId(2)]);
    let change = sel.clear();
    assert_eq!(change.left, vec![ShapeId(1), ShapeId(2)]);
    assert!(sel.is_empty());
    assert_eq!(change.touched().count(), 2);
}

#[test]
fn select_all_follows_z_order() {
    let store = grouped_store();
    let mut sel = Selection::new();
    sel.select_all(&store);
    assert_eq!(sel.ids(), store.ids());
}

#[test]
fn retain_existing_drops_missing() {
    let store = grouped_store();
    let mut sel = Selection::new();
    sel.select_multiple([ShapeId(1), ShapeId(99)]);
    let change = sel.retain_existing(&store);
    assert_eq!(change.left, vec![ShapeId(99)]);
    assert_eq!(sel.ids(), &[ShapeId(1)]);
}

// =============================================================
// Groups
// =============================================================

#[test]
fn group_members_puts_clicked_first() {
    let store = grouped_store();
    assert_eq!(group_members(&store, ShapeId(2)), vec![ShapeId(2), ShapeId(1), ShapeId(4)]);
    assert_eq!(group_members(&store, ShapeId(3)), vec![ShapeId(3)]);
}

#[test]
fn group_selection_requires_shared_group() {
    let store = grouped_store();
    let mut sel = Selection::new();
    sel.select_multiple([ShapeId(1), ShapeId(2)]);
    assert!(sel.is_group_selection(&store));
    sel.add(ShapeId(3));
    assert!(!sel.is_group_selection(&store));
    sel.select_single(ShapeId(1));
    assert!(!sel.is_group_selection(&store));
}
