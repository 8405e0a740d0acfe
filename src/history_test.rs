#![allow(clippy::float_cmp)]

use super::*;
use crate::fixtures::box_shape;
use crate::shape::ShapeKind;

/// Snapshot distinguishable by its zoom.
fn snap(tag: f64) -> HistorySnapshot {
    HistorySnapshot { shapes: Vec::new(), selected_ids: Vec::new(), zoom: tag }
}

fn zooms(h: &History) -> Vec<f64> {
    h.entries().iter().map(|s| s.zoom).collect()
}

// =============================================================
// Save / undo / redo
// =============================================================

#[test]
fn new_history_is_empty() {
    let h = History::new(50);
    assert!(h.is_empty());
    assert!(!h.can_undo());
    assert!(!h.can_redo());
    assert!(h.current().is_none());
}

#[test]
fn zero_limit_is_raised_to_one() {
    let mut h = History::new(0);
    assert_eq!(h.limit(), 1);
    h.save(snap(1.0));
    h.save(snap(2.0));
    assert_eq!(zooms(&h), vec![2.0]);
}

#[test]
fn undo_and_redo_move_cursor() {
    let mut h = History::new(10);
    h.save(snap(1.0));
    h.save(snap(2.0));
    h.save(snap(3.0));
    assert_eq!(h.cursor(), 2);

    assert_eq!(h.undo().map(|s| s.zoom), Some(2.0));
    assert_eq!(h.undo().map(|s| s.zoom), Some(1.0));
    assert!(h.undo().is_none());
    assert_eq!(h.cursor(), 0);

    assert_eq!(h.redo().map(|s| s.zoom), Some(2.0));
    assert_eq!(h.redo().map(|s| s.zoom), Some(3.0));
    assert!(h.redo().is_none());
}

#[test]
fn save_after_undo_truncates_redo_tail() {
    let mut h = History::new(10);
    h.save(snap(1.0));
    h.save(snap(2.0));
    h.save(snap(3.0));
    h.undo();
    h.undo();
    h.save(snap(4.0));
    assert_eq!(zooms(&h), vec![1.0, 4.0]);
    assert!(!h.can_redo());
    assert_eq!(h.cursor(), 1);
}

#[test]
fn eviction_keeps_cursor_on_newest() {
    let mut h = History::new(3);
    for i in 0..5 {
        h.save(snap(f64::from(i)));
    }
    assert_eq!(zooms(&h), vec![2.0, 3.0, 4.0]);
    assert_eq!(h.cursor(), 2);
    assert_eq!(h.current().map(|s| s.zoom), Some(4.0));
}

#[test]
fn fifty_one_saves_keep_fifty() {
    let mut h = History::new(50);
    for i in 0..51 {
        h.save(snap(f64::from(i)));
    }
    assert_eq!(h.len(), 50);
    assert_eq!(h.cursor(), 49);
    assert_eq!(h.entries()[0].zoom, 1.0);
}

#[test]
fn reset_keeps_only_baseline() {
    let mut h = History::new(10);
    h.save(snap(1.0));
    h.save(snap(2.0));
    h.reset(snap(9.0));
    assert_eq!(zooms(&h), vec![9.0]);
    assert!(!h.can_undo());
    assert!(!h.can_redo());
}

// =============================================================
// Snapshot equality
// =============================================================

#[test]
fn snapshot_equality_compares_shape_content() {
    let a = HistorySnapshot {
        shapes: vec![Rc::new(box_shape(1, ShapeKind::Rect, 0.0, 0.0, 10.0, 10.0))],
        selected_ids: vec![ShapeId(1)],
        zoom: 1.0,
    };
    let mut b = a.clone();
    assert_eq!(a, b);
    let mut moved = box_shape(1, ShapeKind::Rect, 5.0, 0.0, 10.0, 10.0);
    moved.handle = None;
    b.shapes = vec![Rc::new(moved)];
    assert_ne!(a, b);
}
