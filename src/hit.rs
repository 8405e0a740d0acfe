#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::connection::ports_for_shape;
use crate::geometry::{Point, distance_to_segment};
use crate::overlay::OverlayCache;
use crate::provider::{ResizeHandle, ShapeDefinitions};
use crate::render::Overlay;
use crate::shape::{EdgeEnd, PortId, Shape, ShapeId};
use crate::store::ShapeStore;
use crate::transform::{to_local, to_world};

/// Which part of a shape was hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitPart {
    /// Inside a box shape.
    Body,
    /// On the stroke of a path shape.
    PathBody,
    ResizeHandle(ResizeHandle),
    CornerHandle,
    Port(PortId),
    /// Endpoint handle of a free edge.
    ConnectorEndpoint(EdgeEnd),
    /// Point handle of a polyline, or an interior waypoint of a connector.
    Waypoint(usize),
}

/// Result of a hit test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub shape_id: ShapeId,
    pub part: HitPart,
}

/// Resize handle positions in [`ResizeHandle::ALL`] order.
#[must_use]
pub fn resize_handle_points(defs: &ShapeDefinitions, shape: &Shape) -> Vec<Point> {
    let bounds = defs.bounds(shape);
    ResizeHandle::ALL
        .iter()
        .map(|h| to_world(defs, shape, h.on(&bounds)))
        .collect()
}

/// Corner-radius handle positions, recomputed from the current radius.
#[must_use]
pub fn corner_handle_points(defs: &ShapeDefinitions, shape: &Shape) -> Vec<Point> {
    defs.local_corner_handles(shape)
        .into_iter()
        .map(|p| to_world(defs, shape, p))
        .collect()
}

/// One handle per path point, index-aligned with the point list.
#[must_use]
pub fn connector_handle_points(defs: &ShapeDefinitions, shape: &Shape) -> Vec<Point> {
    shape
        .points()
        .map(|pts| pts.iter().map(|p| to_world(defs, shape, *p)).collect())
        .unwrap_or_default()
}

/// Whether `at` lies on `shape`: inside the (transformed) box for box kinds,
/// within `tolerance` of a segment for paths.
#[must_use]
pub fn shape_contains(defs: &ShapeDefinitions, shape: &Shape, at: Point, tolerance: f64) -> bool {
    if let Some(points) = shape.points() {
        let pts: Vec<Point> = points.iter().map(|p| to_world(defs, shape, *p)).collect();
        return match pts.as_slice() {
            [] => false,
            [only] => only.distance(at) <= tolerance,
            _ => pts.windows(2).any(|w| distance_to_segment(at, w[0], w[1]) <= tolerance),
        };
    }
    defs.bounds(shape).contains_point(to_local(defs, shape, at))
}

/// Classify a grabbed path point: free-edge terminals are endpoint handles,
/// interior connector points and every polyline point are waypoints, and
/// anchored terminals are not grabbable.
fn classify_path_point(shape: &Shape, index: usize, count: usize) -> Option<HitPart> {
    if !shape.kind.is_edge() {
        return Some(HitPart::Waypoint(index));
    }
    let terminal = if index == 0 {
        Some(EdgeEnd::From)
    } else if index + 1 == count {
        Some(EdgeEnd::To)
    } else {
        None
    };
    match terminal {
        None => Some(HitPart::Waypoint(index)),
        Some(_) if shape.is_connected() => None,
        Some(end) => Some(HitPart::ConnectorEndpoint(end)),
    }
}

fn nearest_within(points: &[Point], at: Point, radius: f64) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| (i, p.distance(at)))
        .filter(|(_, d)| *d <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

/// Find what is under `at`.
///
/// Visible handles win over ports, and ports win over bodies. Within each
/// pass the topmost shape wins. Only overlays present in `overlays` can be
/// hit.
#[must_use]
pub fn hit_test(
    defs: &ShapeDefinitions,
    store: &ShapeStore,
    overlays: &OverlayCache,
    at: Point,
    handle_radius: f64,
    tolerance: f64,
) -> Option<Hit> {
    for shape in store.iter().rev() {
        let id = shape.id;
        if let Some(pts) = overlays.points(id, Overlay::CornerHandles) {
            if nearest_within(pts, at, handle_radius).is_some() {
                return Some(Hit { shape_id: id, part: HitPart::CornerHandle });
            }
        }
        if let Some(pts) = overlays.points(id, Overlay::ResizeHandles) {
            if let Some(i) = nearest_within(pts, at, handle_radius) {
                if let Some(handle) = ResizeHandle::ALL.get(i) {
                    return Some(Hit { shape_id: id, part: HitPart::ResizeHandle(*handle) });
                }
            }
        }
        if let Some(pts) = overlays.points(id, Overlay::ConnectorHandles) {
            if let Some(i) = nearest_within(pts, at, handle_radius) {
                if let Some(part) = classify_path_point(shape, i, pts.len()) {
                    return Some(Hit { shape_id: id, part });
                }
            }
        }
    }

    for shape in store.iter().rev() {
        if !overlays.is_shown(shape.id, Overlay::Ports) {
            continue;
        }
        let nearest = ports_for_shape(defs, shape)
            .into_iter()
            .map(|p| (p.point.distance(at), p))
            .filter(|(d, _)| *d <= handle_radius)
            .min_by(|a, b| a.0.total_cmp(&b.0));
        if let Some((_, port)) = nearest {
            return Some(Hit { shape_id: shape.id, part: HitPart::Port(port.id) });
        }
    }

    store
        .iter()
        .rev()
        .find(|s| shape_contains(defs, s, at, tolerance))
        .map(|s| Hit {
            shape_id: s.id,
            part: if s.kind.is_path() { HitPart::PathBody } else { HitPart::Body },
        })
}
