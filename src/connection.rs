//! Connection / port system.
//!
//! Ports are derived on demand from the kind's port layout and mapped through
//! the shape's render transform. Edge ends bind to a shape either at a named
//! port or, without a port, at the shape's center. When a bound shape moves,
//! [`sync_connections`] rewrites only the terminal points of the edges bound
//! to it; interior waypoints of multi-point connectors are never touched by
//! binding.

#[cfg(test)]
#[path = "connection_test.rs"]
mod connection_test;

use crate::geometry::{Point, distance_to_segment, project_onto_segment};
use crate::provider::{Port, ShapeDefinitions};
use crate::shape::{Anchor, EdgeEnd, Shape, ShapeId};
use crate::store::ShapeStore;
use crate::transform::{to_world, world_bounds};

/// Ports of `shape` in canvas coordinates.
#[must_use]
pub fn ports_for_shape(defs: &ShapeDefinitions, shape: &Shape) -> Vec<Port> {
    defs.local_ports(shape)
        .into_iter()
        .map(|port| Port { point: to_world(defs, shape, port.point), id: port.id })
        .collect()
}

/// Closest port within `max_distance` over `candidates` (linear scan).
pub fn nearest_port<'a>(
    defs: &ShapeDefinitions,
    candidates: impl IntoIterator<Item = &'a Shape>,
    at: Point,
    max_distance: f64,
) -> Option<(ShapeId, Port)> {
    let mut best: Option<(ShapeId, Port, f64)> = None;
    for shape in candidates {
        for port in ports_for_shape(defs, shape) {
            let dist = port.point.distance(at);
            if dist <= max_distance && best.as_ref().is_none_or(|(_, _, d)| dist < *d) {
                best = Some((shape.id, port, dist));
            }
        }
    }
    best.map(|(id, port, _)| (id, port))
}

/// Where a released edge end should bind.
///
/// A port within `max_distance` on one of `port_candidates` wins; otherwise the
/// topmost non-edge shape whose bounds contain `at` is used with no port.
/// Shapes in `exclude` are never targets.
pub fn resolve_anchor<'a>(
    defs: &ShapeDefinitions,
    store: &ShapeStore,
    port_candidates: impl IntoIterator<Item = &'a Shape>,
    at: Point,
    max_distance: f64,
    exclude: &[ShapeId],
) -> Option<Anchor> {
    let candidates = port_candidates
        .into_iter()
        .filter(|s| !s.kind.is_edge() && !exclude.contains(&s.id));
    if let Some((shape_id, port)) = nearest_port(defs, candidates, at, max_distance) {
        return Some(Anchor { shape_id, port_id: Some(port.id) });
    }
    store
        .iter()
        .rev()
        .filter(|s| !s.kind.is_edge() && !exclude.contains(&s.id))
        .find(|s| world_bounds(defs, s).contains_point(at))
        .map(|s| Anchor::center(s.id))
}

/// Canvas position of an anchor: its port, or the shape center when the
/// anchor has no port or the port no longer exists.
#[must_use]
pub fn anchor_point(defs: &ShapeDefinitions, store: &ShapeStore, anchor: &Anchor) -> Option<Point> {
    let shape = store.get(&anchor.shape_id)?;
    let center = defs.center(shape);
    let Some(port_id) = &anchor.port_id else {
        return Some(center);
    };
    let port = ports_for_shape(defs, shape).into_iter().find(|p| &p.id == port_id);
    Some(port.map_or(center, |p| p.point))
}

/// Rewrite the terminal points of `connector` bound to `moved`.
/// Returns whether any point changed.
pub fn update_connection_line(defs: &ShapeDefinitions, connector: &mut Shape, moved: ShapeId, store: &ShapeStore) -> bool {
    let mut changed = false;
    for end in connector.ends_bound_to(moved) {
        let Some(anchor) = connector.anchor(end).cloned() else {
            continue;
        };
        let Some(p) = anchor_point(defs, store, &anchor) else {
            continue;
        };
        if connector.terminal(end) != Some(p) {
            changed |= connector.set_terminal(end, p);
        }
    }
    changed
}

/// Bring every edge bound to `moved` up to date. Returns the edges that changed.
pub fn sync_connections(defs: &ShapeDefinitions, store: &mut ShapeStore, moved: ShapeId) -> Vec<ShapeId> {
    let Some(links) = store.get(&moved).map(|s| s.edge_links().to_vec()) else {
        return Vec::new();
    };
    let mut changed = Vec::new();
    for edge_id in links {
        let Some(mut edge) = store.get(&edge_id).cloned() else {
            continue;
        };
        if update_connection_line(defs, &mut edge, moved, store) {
            if let Some(slot) = store.get_mut(&edge_id) {
                slot.data = edge.data;
            }
            changed.push(edge_id);
        }
    }
    changed
}

/// Bind one end of an edge, moving its terminal point onto the anchor.
///
/// The previous target loses its link unless the other end still uses it.
/// Returns false when the edge or target is missing, or the edge is not an edge.
pub fn bind(defs: &ShapeDefinitions, store: &mut ShapeStore, edge_id: ShapeId, end: EdgeEnd, anchor: Anchor) -> bool {
    if !store.contains(&anchor.shape_id) || !store.get(&edge_id).is_some_and(|e| e.kind.is_edge()) {
        return false;
    }
    let Some(point) = anchor_point(defs, store, &anchor) else {
        return false;
    };
    let target = anchor.shape_id;
    let previous = unbind(store, edge_id, end);
    if let Some(edge) = store.get_mut(&edge_id) {
        edge.set_anchor(end, Some(anchor));
        edge.set_terminal(end, point);
    }
    if let Some(shape) = store.get_mut(&target) {
        shape.add_edge_link(edge_id);
    }
    if let Some(prev) = previous {
        if prev != target {
            tracing::debug!(edge = %edge_id, from = %prev, to = %target, "edge end rebound");
        }
    }
    true
}

/// Clear one end's anchor. Returns the shape it was bound to.
pub fn unbind(store: &mut ShapeStore, edge_id: ShapeId, end: EdgeEnd) -> Option<ShapeId> {
    let edge = store.get_mut(&edge_id)?;
    let previous = edge.anchor(end)?.shape_id;
    edge.set_anchor(end, None);
    let still_bound = !edge.ends_bound_to(previous).is_empty();
    if !still_bound {
        if let Some(shape) = store.get_mut(&previous) {
            shape.remove_edge_link(edge_id);
        }
    }
    Some(previous)
}

/// Snap radii for waypoint insertion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaypointSnap {
    /// Snap onto a port closer than this.
    pub snap_distance: f64,
    /// Align to a neighbour's x or y when closer than this.
    pub align_distance: f64,
}

/// Insert a waypoint into a path at `at` projected onto its nearest segment.
/// Returns the index of the new point.
pub fn insert_waypoint(
    defs: &ShapeDefinitions,
    store: &mut ShapeStore,
    edge_id: ShapeId,
    at: Point,
    snap: WaypointSnap,
) -> Option<usize> {
    let points = store.get(&edge_id)?.points()?.to_vec();
    if points.len() < 2 || !at.is_finite() {
        return None;
    }
    let (segment, _) = points
        .windows(2)
        .enumerate()
        .map(|(i, w)| (i, distance_to_segment(at, w[0], w[1])))
        .min_by(|a, b| a.1.total_cmp(&b.1))?;
    let prev = points[segment];
    let next = points[segment + 1];
    let mut q = project_onto_segment(at, prev, next).0;

    let nodes = store.iter().filter(|s| !s.kind.is_edge() && s.id != edge_id);
    if let Some((_, port)) = nearest_port(defs, nodes, q, snap.snap_distance) {
        q = port.point;
    } else {
        q.x = align_axis(q.x, prev.x, next.x, snap.align_distance);
        q.y = align_axis(q.y, prev.y, next.y, snap.align_distance);
    }

    let index = segment + 1;
    let edge = store.get_mut(&edge_id)?;
    edge.data.geometry.points_mut()?.insert(index, q);
    Some(index)
}

fn align_axis(value: f64, prev: f64, next: f64, within: f64) -> f64 {
    let dp = (value - prev).abs();
    let dn = (value - next).abs();
    if dp <= within && dp <= dn {
        prev
    } else if dn <= within {
        next
    } else {
        value
    }
}
