//! Render-host boundary.
//!
//! The engine never draws. It asks a [`RenderHost`] to create, update,
//! restack, and remove opaque drawable primitives, and to show or hide the
//! per-shape overlays (ports, resize handles, corner handles, connector
//! handles, text outline). The host decides what those primitives are.

use serde::{Deserialize, Serialize};

use crate::geometry::{Affine, Point};
use crate::shape::{Shape, ShapeId};

/// Opaque token for a host-side drawable. The engine only passes it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderHandle(pub u64);

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("render host rejected {id}: {reason}")]
    Rejected { id: ShapeId, reason: String },
}

/// Interactive decoration drawn over a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Overlay {
    Ports,
    ResizeHandles,
    /// Only offered by rounded rectangles.
    CornerHandles,
    /// Endpoint and waypoint handles of paths.
    ConnectorHandles,
    TextOutline,
}

/// Capability interface implemented by the host renderer.
pub trait RenderHost {
    /// Create the drawable for `shape`.
    ///
    /// # Errors
    ///
    /// Returns `Err` when the host cannot create the primitive; the shape then
    /// lives without a handle.
    fn create(&mut self, shape: &Shape) -> Result<RenderHandle, RenderError>;

    fn remove(&mut self, handle: RenderHandle);

    /// Re-read geometry and style. `transform` is `None` for the identity,
    /// meaning any previous transform attribute must be cleared.
    fn update(&mut self, handle: RenderHandle, shape: &Shape, transform: Option<Affine>);

    /// Reorder drawables bottom-to-top.
    fn restack(&mut self, order: &[RenderHandle]);

    /// Show (or move) an overlay at the given canvas points.
    fn show_overlay(&mut self, id: ShapeId, overlay: Overlay, points: &[Point]);

    fn hide_overlay(&mut self, id: ShapeId, overlay: Overlay);

    /// Temporary edge tracking the pointer while connecting.
    fn show_preview_edge(&mut self, _from: Point, _to: Point) {}

    fn hide_preview_edge(&mut self) {}
}

/// Host that draws nothing. Used headless and by the normaliser binary.
#[derive(Debug, Default)]
pub struct NullHost {
    next: u64,
}

impl RenderHost for NullHost {
    fn create(&mut self, _shape: &Shape) -> Result<RenderHandle, RenderError> {
        self.next += 1;
        Ok(RenderHandle(self.next))
    }

    fn remove(&mut self, _handle: RenderHandle) {}

    fn update(&mut self, _handle: RenderHandle, _shape: &Shape, _transform: Option<Affine>) {}

    fn restack(&mut self, _order: &[RenderHandle]) {}

    fn show_overlay(&mut self, _id: ShapeId, _overlay: Overlay, _points: &[Point]) {}

    fn hide_overlay(&mut self, _id: ShapeId, _overlay: Overlay) {}
}
