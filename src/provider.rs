//! Per-kind geometry providers.
//!
//! Every [`ShapeKind`] maps to a [`KindOps`] capability set: move, resize,
//! bounds, center, port layout, and (optionally) corner handles. The engine
//! never matches on kinds to do geometry; it always goes through the table,
//! so a host can swap in its own provider for any kind with
//! [`ShapeDefinitions::register`].
//!
//! Ports and corner handles returned here are in the shape's local
//! (untransformed) frame. Callers map them through the shape transform.

#[cfg(test)]
#[path = "provider_test.rs"]
mod provider_test;

use serde::{Deserialize, Serialize};

use crate::consts::MIN_SHAPE_SIZE;
use crate::geometry::{Point, Rect};
use crate::shape::{PortId, Shape, ShapeData, ShapeGeometry, ShapeKind};

/// Failure reported by a geometry provider. Aborts the current gesture.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("{op} is not supported for {kind:?}")]
    Unsupported { kind: ShapeKind, op: &'static str },
    #[error("non-finite input to {0}")]
    NonFinite(&'static str),
    #[error("geometry does not match its shape kind")]
    Mismatch,
    #[error("provider failure: {0}")]
    Provider(String),
}

/// Corner handle used by resize gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    Nw,
    Ne,
    Sw,
    Se,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 4] = [Self::Nw, Self::Ne, Self::Sw, Self::Se];

    /// Location of this handle on a rectangle.
    #[must_use]
    pub fn on(self, rect: &Rect) -> Point {
        match self {
            Self::Nw => Point::new(rect.x, rect.y),
            Self::Ne => Point::new(rect.right(), rect.y),
            Self::Sw => Point::new(rect.x, rect.bottom()),
            Self::Se => Point::new(rect.right(), rect.bottom()),
        }
    }
}

/// A named anchor point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: PortId,
    pub point: Point,
}

impl Port {
    #[must_use]
    pub fn new(id: &str, point: Point) -> Self {
        Self { id: PortId::from(id), point }
    }
}

pub type MoveFn = fn(&mut ShapeData, f64, f64) -> Result<(), GeometryError>;
pub type ResizeFn = fn(&mut ShapeData, ResizeHandle, f64, f64) -> Result<(), GeometryError>;
pub type BoundsFn = fn(&ShapeData) -> Rect;
pub type CenterFn = fn(&ShapeData) -> Point;
pub type PortsFn = fn(&ShapeData) -> Vec<Port>;
pub type CornerHandlesFn = fn(&ShapeData) -> Vec<Point>;

/// Capability set for one shape kind.
#[derive(Clone, Copy)]
pub struct KindOps {
    pub move_by: MoveFn,
    pub resize: ResizeFn,
    pub bounds: BoundsFn,
    pub center: CenterFn,
    pub ports: PortsFn,
    pub corner_handles: Option<CornerHandlesFn>,
}

/// Lookup table from shape kind to its provider.
#[derive(Clone)]
pub struct ShapeDefinitions {
    table: [KindOps; ShapeKind::ALL.len()],
}

impl Default for ShapeDefinitions {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ShapeDefinitions {
    /// Table populated with the built-in providers for every kind.
    #[must_use]
    pub fn builtin() -> Self {
        Self { table: ShapeKind::ALL.map(builtin_ops) }
    }

    /// Replace the provider for one kind.
    pub fn register(&mut self, kind: ShapeKind, ops: KindOps) {
        self.table[kind.index()] = ops;
    }

    #[must_use]
    pub fn ops(&self, kind: ShapeKind) -> &KindOps {
        &self.table[kind.index()]
    }

    /// Translate a shape in place.
    ///
    /// # Errors
    ///
    /// Propagates the provider's error; the shape may be partially updated.
    pub fn move_by(&self, shape: &mut Shape, dx: f64, dy: f64) -> Result<(), GeometryError> {
        if !dx.is_finite() || !dy.is_finite() {
            return Err(GeometryError::NonFinite("move"));
        }
        (self.ops(shape.kind).move_by)(&mut shape.data, dx, dy)
    }

    /// Resize a shape by dragging `handle` by `(dx, dy)`.
    ///
    /// # Errors
    ///
    /// Propagates the provider's error.
    pub fn resize(&self, shape: &mut Shape, handle: ResizeHandle, dx: f64, dy: f64) -> Result<(), GeometryError> {
        if !dx.is_finite() || !dy.is_finite() {
            return Err(GeometryError::NonFinite("resize"));
        }
        (self.ops(shape.kind).resize)(&mut shape.data, handle, dx, dy)?;
        shape.data.clamp_corner_radius();
        Ok(())
    }

    /// Untransformed bounds.
    #[must_use]
    pub fn bounds(&self, shape: &Shape) -> Rect {
        (self.ops(shape.kind).bounds)(&shape.data)
    }

    /// Untransformed center; the pivot for rotation, scale, and flip.
    #[must_use]
    pub fn center(&self, shape: &Shape) -> Point {
        (self.ops(shape.kind).center)(&shape.data)
    }

    /// Ports in the shape's local frame.
    #[must_use]
    pub fn local_ports(&self, shape: &Shape) -> Vec<Port> {
        (self.ops(shape.kind).ports)(&shape.data)
    }

    /// Corner handles in the local frame; empty when the kind has none.
    #[must_use]
    pub fn local_corner_handles(&self, shape: &Shape) -> Vec<Point> {
        self.ops(shape.kind)
            .corner_handles
            .map_or_else(Vec::new, |f| f(&shape.data))
    }
}

fn builtin_ops(kind: ShapeKind) -> KindOps {
    if kind.is_path() {
        KindOps {
            move_by: path_move,
            resize: path_resize,
            bounds: path_bounds,
            center: path_center,
            ports: if kind == ShapeKind::Polyline { polyline_ports } else { no_ports },
            corner_handles: None,
        }
    } else {
        KindOps {
            move_by: box_move,
            resize: box_resize,
            bounds: box_bounds,
            center: box_center,
            ports: if kind == ShapeKind::Triangle { triangle_ports } else { box_ports },
            corner_handles: if kind == ShapeKind::RoundedRect { Some(rounded_rect_corner_handles) } else { None },
        }
    }
}

// =============================================================
// Box kinds
// =============================================================

fn box_move(data: &mut ShapeData, dx: f64, dy: f64) -> Result<(), GeometryError> {
    let ShapeGeometry::Box(rect) = &mut data.geometry else {
        return Err(GeometryError::Mismatch);
    };
    rect.x += dx;
    rect.y += dy;
    Ok(())
}

fn box_resize(data: &mut ShapeData, handle: ResizeHandle, dx: f64, dy: f64) -> Result<(), GeometryError> {
    let ShapeGeometry::Box(rect) = &mut data.geometry else {
        return Err(GeometryError::Mismatch);
    };
    *rect = resized_rect(rect, handle, dx, dy);
    Ok(())
}

/// Move one corner of `rect`, keeping the opposite corner fixed and the
/// size at least [`MIN_SHAPE_SIZE`].
fn resized_rect(rect: &Rect, handle: ResizeHandle, dx: f64, dy: f64) -> Rect {
    let (mut left, mut top, mut right, mut bottom) = (rect.x, rect.y, rect.right(), rect.bottom());
    match handle {
        ResizeHandle::Nw => {
            left = (left + dx).min(right - MIN_SHAPE_SIZE);
            top = (top + dy).min(bottom - MIN_SHAPE_SIZE);
        }
        ResizeHandle::Ne => {
            right = (right + dx).max(left + MIN_SHAPE_SIZE);
            top = (top + dy).min(bottom - MIN_SHAPE_SIZE);
        }
        ResizeHandle::Sw => {
            left = (left + dx).min(right - MIN_SHAPE_SIZE);
            bottom = (bottom + dy).max(top + MIN_SHAPE_SIZE);
        }
        ResizeHandle::Se => {
            right = (right + dx).max(left + MIN_SHAPE_SIZE);
            bottom = (bottom + dy).max(top + MIN_SHAPE_SIZE);
        }
    }
    Rect::new(left, top, right - left, bottom - top)
}

fn box_bounds(data: &ShapeData) -> Rect {
    match &data.geometry {
        ShapeGeometry::Box(rect) => *rect,
        ShapeGeometry::Path { points } => Rect::enclosing(points.iter().copied()).unwrap_or_default(),
    }
}

fn box_center(data: &ShapeData) -> Point {
    box_bounds(data).center()
}

fn box_ports(data: &ShapeData) -> Vec<Port> {
    let r = box_bounds(data);
    let c = r.center();
    vec![
        Port::new("top", Point::new(c.x, r.y)),
        Port::new("right", Point::new(r.right(), c.y)),
        Port::new("bottom", Point::new(c.x, r.bottom())),
        Port::new("left", Point::new(r.x, c.y)),
    ]
}

fn triangle_ports(data: &ShapeData) -> Vec<Port> {
    let r = box_bounds(data);
    let c = r.center();
    vec![
        Port::new("top", Point::new(c.x, r.y)),
        Port::new("bottomRight", Point::new(r.right(), r.bottom())),
        Port::new("bottom", Point::new(c.x, r.bottom())),
        Port::new("bottomLeft", Point::new(r.x, r.bottom())),
    ]
}

/// One handle on the top edge, inset from the top-right corner by the radius.
fn rounded_rect_corner_handles(data: &ShapeData) -> Vec<Point> {
    let r = box_bounds(data);
    let radius = data.corner_radius.unwrap_or(0.0);
    vec![Point::new(r.right() - radius, r.y)]
}

// =============================================================
// Path kinds
// =============================================================

fn path_move(data: &mut ShapeData, dx: f64, dy: f64) -> Result<(), GeometryError> {
    let Some(points) = data.geometry.points_mut() else {
        return Err(GeometryError::Mismatch);
    };
    for p in points.iter_mut() {
        *p = p.offset(dx, dy);
    }
    Ok(())
}

/// Scale the point list so its bounds follow the dragged corner.
fn path_resize(data: &mut ShapeData, handle: ResizeHandle, dx: f64, dy: f64) -> Result<(), GeometryError> {
    let Some(points) = data.geometry.points_mut() else {
        return Err(GeometryError::Mismatch);
    };
    let Some(old) = Rect::enclosing(points.iter().copied()) else {
        return Err(GeometryError::Unsupported { kind: ShapeKind::Polyline, op: "resize of an empty path" });
    };
    let new = resized_rect(&old, handle, dx, dy);
    for p in points.iter_mut() {
        let tx = if old.width > 0.0 { (p.x - old.x) / old.width } else { 0.0 };
        let ty = if old.height > 0.0 { (p.y - old.y) / old.height } else { 0.0 };
        *p = Point::new(new.x + tx * new.width, new.y + ty * new.height);
    }
    Ok(())
}

fn path_bounds(data: &ShapeData) -> Rect {
    box_bounds(data)
}

fn path_center(data: &ShapeData) -> Point {
    path_bounds(data).center()
}

fn polyline_ports(data: &ShapeData) -> Vec<Port> {
    let Some(points) = data.geometry.points() else {
        return Vec::new();
    };
    let mut ports = Vec::new();
    if let Some(first) = points.first() {
        ports.push(Port::new("start", *first));
    }
    if let (Some(last), true) = (points.last(), points.len() > 1) {
        ports.push(Port::new("end", *last));
    }
    ports
}

fn no_ports(_data: &ShapeData) -> Vec<Port> {
    Vec::new()
}
