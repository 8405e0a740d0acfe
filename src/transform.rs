//! Transform engine: rotation, uniform scale, and flips about a shape's center.
//!
//! The render transform is one composite matrix
//! `T(c) · R(rotation) · S(scale·±1, scale·±1) · T(-c)`. It is never split
//! into per-operation transforms: flips and scale act in the rotated local
//! frame, so reordering the factors changes the result.
//!
//! Ports, resize handles, corner handles, and hit-testing all go through
//! [`shape_matrix`], so whatever the host draws is what the pointer hits.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use crate::consts::{EPSILON, MAX_SCALE, MIN_SCALE};
use crate::geometry::{Affine, Point, Rect};
use crate::provider::ShapeDefinitions;
use crate::render::RenderHost;
use crate::shape::{Shape, ShapeData, Transform};

/// Composite transform about `center`, or `None` for the identity.
#[must_use]
pub fn compose(center: Point, t: &Transform) -> Option<Affine> {
    if t.is_identity() {
        return None;
    }
    let sx = t.scale * if t.flip_x { -1.0 } else { 1.0 };
    let sy = t.scale * if t.flip_y { -1.0 } else { 1.0 };
    let m = Affine::translate(center.x, center.y)
        .multiply(&Affine::rotate(t.rotation))
        .multiply(&Affine::scale(sx, sy))
        .multiply(&Affine::translate(-center.x, -center.y));
    Some(m)
}

/// The shape's render transform.
#[must_use]
pub fn shape_matrix(defs: &ShapeDefinitions, shape: &Shape) -> Option<Affine> {
    compose(defs.center(shape), &shape.data.transform)
}

/// Map a local point of `shape` to canvas space.
#[must_use]
pub fn to_world(defs: &ShapeDefinitions, shape: &Shape, p: Point) -> Point {
    shape_matrix(defs, shape).map_or(p, |m| m.apply(p))
}

/// Map a canvas point into `shape`'s local frame. Singular transforms map
/// everything to the center.
#[must_use]
pub fn to_local(defs: &ShapeDefinitions, shape: &Shape, p: Point) -> Point {
    match shape_matrix(defs, shape) {
        None => p,
        Some(m) => m.invert().map_or_else(|| defs.center(shape), |inv| inv.apply(p)),
    }
}

/// Axis-aligned bounds of the transformed shape.
#[must_use]
pub fn world_bounds(defs: &ShapeDefinitions, shape: &Shape) -> Rect {
    let local = defs.bounds(shape);
    match shape_matrix(defs, shape) {
        None => local,
        Some(m) => Rect::enclosing(local.corners().map(|c| m.apply(c))).unwrap_or(local),
    }
}

/// Push the shape's current transform to the host, clearing it on the identity.
pub fn apply_transform(defs: &ShapeDefinitions, shape: &Shape, host: &mut dyn RenderHost) {
    if let Some(handle) = shape.handle {
        host.update(handle, shape, shape_matrix(defs, shape));
    }
}

/// Add `degrees` to the rotation, normalised to `[0, 360)`.
pub fn rotate_by(t: &mut Transform, degrees: f64) -> bool {
    if !degrees.is_finite() || degrees.abs() < EPSILON {
        return false;
    }
    t.rotation = (t.rotation + degrees).rem_euclid(360.0);
    if (t.rotation - 360.0).abs() < EPSILON {
        t.rotation = 0.0;
    }
    true
}

/// Multiply the scale by `factor`, clamped to the supported range.
pub fn scale_by(t: &mut Transform, factor: f64) -> bool {
    if !factor.is_finite() || factor <= 0.0 {
        return false;
    }
    let next = (t.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
    if (next - t.scale).abs() < EPSILON {
        return false;
    }
    t.scale = next;
    true
}

pub fn flip_horizontal(t: &mut Transform) {
    t.flip_x = !t.flip_x;
}

pub fn flip_vertical(t: &mut Transform) {
    t.flip_y = !t.flip_y;
}

/// Corner-radius drag: moving left (negative `dx`) grows the radius.
/// The result is clamped to `[0, min(width, height) / 2]` and written back.
pub fn drag_corner_radius(data: &mut ShapeData, start_radius: f64, dx: f64) -> f64 {
    let max = data.max_corner_radius();
    let radius = if dx.is_finite() { (start_radius - dx).clamp(0.0, max) } else { start_radius.clamp(0.0, max) };
    data.corner_radius = Some(radius);
    radius
}
