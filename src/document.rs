//! JSON import/export of a whole diagram.
//!
//! The format is thin: a version tag, the zoom, and the shape
//! array in z-order with each shape's connections. Render handles are never
//! written. Importing repairs what can be repaired (corner radii clamped,
//! links to missing shapes dropped, link lists rebuilt from edge anchors)
//! and rejects what cannot (unknown version, duplicate or oversized ids).

#[cfg(test)]
#[path = "document_test.rs"]
mod document_test;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_SHAPE_ID, MAX_ZOOM, MIN_ZOOM};
use crate::shape::{Connections, EdgeEnd, Shape, ShapeId};

pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported document version {0}")]
    UnsupportedVersion(u32),
    #[error("duplicate shape id {0}")]
    DuplicateId(ShapeId),
    #[error("shape id {0} is out of range")]
    IdOutOfRange(ShapeId),
}

fn default_zoom() -> f64 {
    1.0
}

/// Serialised form of a canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramDocument {
    pub version: u32,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
    #[serde(default)]
    pub shapes: Vec<Shape>,
}

impl DiagramDocument {
    #[must_use]
    pub fn new(shapes: Vec<Shape>, zoom: f64) -> Self {
        Self { version: DOCUMENT_VERSION, zoom, shapes }
    }

    /// Parse and normalise a document.
    ///
    /// # Errors
    ///
    /// Returns `Json` for malformed input, `UnsupportedVersion` for a foreign
    /// version tag, `DuplicateId` when two shapes share an id, and
    /// `IdOutOfRange` for an id above [`MAX_SHAPE_ID`].
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let mut doc: Self = serde_json::from_str(json)?;
        if doc.version != DOCUMENT_VERSION {
            return Err(DocumentError::UnsupportedVersion(doc.version));
        }
        doc.normalize()?;
        Ok(doc)
    }

    /// # Errors
    ///
    /// Returns `Json` if serialisation fails.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Repair invariants in place.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId` when two shapes share an id and `IdOutOfRange`
    /// for an id above [`MAX_SHAPE_ID`].
    pub fn normalize(&mut self) -> Result<(), DocumentError> {
        let mut ids = HashSet::new();
        for shape in &self.shapes {
            if shape.id.0 > MAX_SHAPE_ID {
                return Err(DocumentError::IdOutOfRange(shape.id));
            }
            if !ids.insert(shape.id) {
                return Err(DocumentError::DuplicateId(shape.id));
            }
        }

        self.zoom = if self.zoom.is_finite() { self.zoom.clamp(MIN_ZOOM, MAX_ZOOM) } else { 1.0 };

        let edge_ids: HashSet<ShapeId> = self.shapes.iter().filter(|s| s.kind.is_edge()).map(|s| s.id).collect();
        let node_ids: HashSet<ShapeId> = self.shapes.iter().filter(|s| !s.kind.is_edge()).map(|s| s.id).collect();

        for shape in &mut self.shapes {
            shape.handle = None;
            shape.data.clamp_corner_radius();
            let role_matches = matches!(
                (&shape.connections, shape.kind.is_edge()),
                (Connections::Edge { .. }, true) | (Connections::Node { .. }, false)
            );
            if !role_matches {
                shape.connections = Connections::for_kind(shape.kind);
            }
            for end in [EdgeEnd::From, EdgeEnd::To] {
                let dangling = shape.anchor(end).is_some_and(|a| !node_ids.contains(&a.shape_id));
                if dangling {
                    shape.set_anchor(end, None);
                }
            }
            if let Connections::Node { edges } = &mut shape.connections {
                edges.retain(|e| edge_ids.contains(e));
            }
        }

        // Link lists mirror edge anchors exactly.
        let mut bindings: Vec<(ShapeId, ShapeId)> = Vec::new();
        for edge in self.shapes.iter().filter(|s| s.kind.is_edge()) {
            for end in [EdgeEnd::From, EdgeEnd::To] {
                if let Some(anchor) = edge.anchor(end) {
                    bindings.push((anchor.shape_id, edge.id));
                }
            }
        }
        for shape in &mut self.shapes {
            if let Connections::Node { edges } = &mut shape.connections {
                let id = shape.id;
                edges.retain(|e| bindings.contains(&(id, *e)));
                for (node, edge) in &bindings {
                    if *node == id && !edges.contains(edge) {
                        edges.push(*edge);
                    }
                }
            }
        }
        Ok(())
    }

    /// Largest id in the document, for seeding the id counter.
    #[must_use]
    pub fn max_id(&self) -> Option<ShapeId> {
        self.shapes.iter().map(|s| s.id).max()
    }
}
