//! Shared test fixtures: a render host that records what it was asked to do,
//! and small constructors for shapes and sessions.

use std::collections::{HashMap, HashSet};

use crate::config::EditorConfig;
use crate::engine::EditorSession;
use crate::geometry::{Affine, Point, Rect};
use crate::render::{Overlay, RenderError, RenderHandle, RenderHost};
use crate::shape::{Shape, ShapeGeometry, ShapeId, ShapeKind};
use crate::store::ShapeStore;

/// Render host that keeps the visible state in plain collections.
#[derive(Debug, Default)]
pub struct RecordingHost {
    next: u64,
    pub live: HashSet<RenderHandle>,
    pub created: usize,
    pub removed: usize,
    pub updates: usize,
    pub transforms: HashMap<RenderHandle, Option<Affine>>,
    pub stack: Vec<RenderHandle>,
    pub overlays: HashMap<(ShapeId, Overlay), Vec<Point>>,
    pub preview: Option<(Point, Point)>,
    pub fail_create: bool,
}

impl RecordingHost {
    pub fn overlay(&self, id: ShapeId, overlay: Overlay) -> Option<&[Point]> {
        self.overlays.get(&(id, overlay)).map(Vec::as_slice)
    }

    pub fn has_overlay(&self, id: ShapeId, overlay: Overlay) -> bool {
        self.overlays.contains_key(&(id, overlay))
    }
}

impl RenderHost for RecordingHost {
    fn create(&mut self, shape: &Shape) -> Result<RenderHandle, RenderError> {
        if self.fail_create {
            return Err(RenderError::Rejected { id: shape.id, reason: "test".into() });
        }
        self.next += 1;
        let handle = RenderHandle(self.next);
        self.live.insert(handle);
        self.created += 1;
        Ok(handle)
    }

    fn remove(&mut self, handle: RenderHandle) {
        self.live.remove(&handle);
        self.transforms.remove(&handle);
        self.removed += 1;
    }

    fn update(&mut self, handle: RenderHandle, _shape: &Shape, transform: Option<Affine>) {
        self.transforms.insert(handle, transform);
        self.updates += 1;
    }

    fn restack(&mut self, order: &[RenderHandle]) {
        self.stack = order.to_vec();
    }

    fn show_overlay(&mut self, id: ShapeId, overlay: Overlay, points: &[Point]) {
        self.overlays.insert((id, overlay), points.to_vec());
    }

    fn hide_overlay(&mut self, id: ShapeId, overlay: Overlay) {
        self.overlays.remove(&(id, overlay));
    }

    fn show_preview_edge(&mut self, from: Point, to: Point) {
        self.preview = Some((from, to));
    }

    fn hide_preview_edge(&mut self) {
        self.preview = None;
    }
}

pub fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

pub fn rect(x: f64, y: f64, w: f64, h: f64) -> ShapeGeometry {
    ShapeGeometry::Box(Rect::new(x, y, w, h))
}

pub fn path(points: &[(f64, f64)]) -> ShapeGeometry {
    ShapeGeometry::Path { points: points.iter().map(|(x, y)| Point::new(*x, *y)).collect() }
}

pub fn box_shape(id: u64, kind: ShapeKind, x: f64, y: f64, w: f64, h: f64) -> Shape {
    Shape::new(ShapeId(id), kind, rect(x, y, w, h))
}

pub fn path_shape(id: u64, kind: ShapeKind, points: &[(f64, f64)]) -> Shape {
    Shape::new(ShapeId(id), kind, path(points))
}

pub fn store_with(shapes: impl IntoIterator<Item = Shape>) -> ShapeStore {
    let mut store = ShapeStore::new();
    for shape in shapes {
        store.insert(shape);
    }
    store
}

pub fn session() -> EditorSession<RecordingHost> {
    EditorSession::with_host(EditorConfig::default(), RecordingHost::default())
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-6, "expected {expected}, got {actual}");
}

pub fn assert_point_close(actual: Point, expected: Point) {
    assert!(
        (actual.x - expected.x).abs() < 1e-6 && (actual.y - expected.y).abs() < 1e-6,
        "expected {expected:?}, got {actual:?}"
    );
}
