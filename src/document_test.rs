#![allow(clippy::float_cmp)]

use super::*;
use crate::fixtures::{box_shape, path_shape};
use crate::render::RenderHandle;
use crate::shape::{Anchor, ShapeKind};

fn linked_doc() -> DiagramDocument {
    let mut a = box_shape(1, ShapeKind::Rect, 0.0, 0.0, 100.0, 60.0);
    let b = box_shape(2, ShapeKind::Circle, 200.0, 0.0, 60.0, 60.0);
    let mut edge = path_shape(3, ShapeKind::Connector, &[(100.0, 30.0), (200.0, 30.0)]);
    edge.set_anchor(EdgeEnd::From, Some(Anchor::port(ShapeId(1), "right")));
    edge.set_anchor(EdgeEnd::To, Some(Anchor::center(ShapeId(2))));
    a.add_edge_link(ShapeId(3));
    a.handle = Some(RenderHandle(7));
    DiagramDocument::new(vec![a, b, edge], 1.5)
}

#[test]
fn round_trip_preserves_shapes_and_zoom() {
    let json = linked_doc().to_json().unwrap();
    assert!(!json.contains("handle"));
    let back = DiagramDocument::from_json(&json).unwrap();
    assert_eq!(back.zoom, 1.5);
    assert_eq!(back.shapes.len(), 3);
    assert_eq!(back.shapes[0], linked_doc().shapes[0]);
    assert!(back.shapes.iter().all(|s| s.handle.is_none()));
    assert_eq!(back.max_id(), Some(ShapeId(3)));
}

#[test]
fn link_lists_are_rebuilt_from_anchors() {
    let back = DiagramDocument::from_json(&linked_doc().to_json().unwrap()).unwrap();
    assert_eq!(back.shapes[0].edge_links(), &[ShapeId(3)]);
    // Node 2 was missing its link in the source.
    assert_eq!(back.shapes[1].edge_links(), &[ShapeId(3)]);
}

#[test]
fn dangling_anchor_is_dropped() {
    let mut doc = linked_doc();
    doc.shapes.remove(1);
    doc.normalize().unwrap();
    let edge = &doc.shapes[1];
    assert!(edge.anchor(EdgeEnd::To).is_none());
    assert!(edge.anchor(EdgeEnd::From).is_some());
}

#[test]
fn stale_link_is_dropped() {
    let mut doc = linked_doc();
    doc.shapes[0].add_edge_link(ShapeId(42));
    doc.normalize().unwrap();
    assert_eq!(doc.shapes[0].edge_links(), &[ShapeId(3)]);
}

#[test]
fn unsupported_version_is_rejected() {
    let err = DiagramDocument::from_json(r#"{"version": 9, "shapes": []}"#).unwrap_err();
    assert!(matches!(err, DocumentError::UnsupportedVersion(9)));
}

#[test]
fn malformed_json_is_rejected() {
    assert!(matches!(DiagramDocument::from_json("{not json"), Err(DocumentError::Json(_))));
}

#[test]
fn duplicate_ids_are_rejected() {
    let mut doc = linked_doc();
    doc.shapes.push(box_shape(2, ShapeKind::Rect, 0.0, 0.0, 1.0, 1.0));
    assert!(matches!(doc.normalize(), Err(DocumentError::DuplicateId(ShapeId(2)))));
}

#[test]
fn ids_above_the_ceiling_are_rejected() {
    let mut doc = DiagramDocument::new(vec![box_shape(u64::MAX, ShapeKind::Rect, 0.0, 0.0, 10.0, 10.0)], 1.0);
    assert!(matches!(doc.normalize(), Err(DocumentError::IdOutOfRange(ShapeId(u64::MAX)))));

    let mut at_ceiling = DiagramDocument::new(vec![box_shape(MAX_SHAPE_ID, ShapeKind::Rect, 0.0, 0.0, 10.0, 10.0)], 1.0);
    assert!(at_ceiling.normalize().is_ok());
}

#[test]
fn zoom_and_corner_radius_are_clamped() {
    let mut rounded = box_shape(1, ShapeKind::RoundedRect, 0.0, 0.0, 40.0, 20.0);
    rounded.data.corner_radius = Some(500.0);
    let mut doc = DiagramDocument::new(vec![rounded], 100.0);
    doc.normalize().unwrap();
    assert_eq!(doc.zoom, MAX_ZOOM);
    assert_eq!(doc.shapes[0].data.corner_radius, Some(10.0));
}

#[test]
fn missing_zoom_defaults_to_one() {
    let doc = DiagramDocument::from_json(r#"{"version": 1}"#).unwrap();
    assert_eq!(doc.zoom, 1.0);
    assert!(doc.shapes.is_empty());
    assert_eq!(doc.max_id(), None);
}
