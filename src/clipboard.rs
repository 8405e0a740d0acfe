//! Clipboard: capture selected shapes and materialise fresh copies of them.
//!
//! Pasted shapes get new ids and are offset by the paste delta. Links between
//! copied shapes are remapped onto the new ids; links to shapes outside the
//! copy are dropped. Group ids are remapped too, so a pasted group never
//! merges with its original.

#[cfg(test)]
#[path = "clipboard_test.rs"]
mod clipboard_test;

use std::collections::HashMap;
use std::rc::Rc;

use uuid::Uuid;

use crate::provider::{GeometryError, ShapeDefinitions};
use crate::shape::{Anchor, Connections, Shape, ShapeId};
use crate::store::ShapeStore;

/// Copied shapes, shared with the store until either side is edited.
#[derive(Debug, Clone, Default)]
pub struct ClipboardBuffer {
    pub ids: Vec<ShapeId>,
    pub shapes: Vec<Rc<Shape>>,
}

impl ClipboardBuffer {
    /// Capture `ids` from the store in z-order. Missing ids are skipped.
    /// Returns `None` if nothing was captured.
    #[must_use]
    pub fn capture(store: &ShapeStore, ids: &[ShapeId]) -> Option<Self> {
        let shapes: Vec<Rc<Shape>> = store
            .snapshot()
            .into_iter()
            .filter(|s| ids.contains(&s.id))
            .collect();
        if shapes.is_empty() {
            return None;
        }
        Some(Self { ids: shapes.iter().map(|s| s.id).collect(), shapes })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Build fresh copies offset by `(dx, dy)`, drawing ids from `next_id`.
    ///
    /// # Errors
    ///
    /// Returns the provider's error if a copy cannot be moved.
    pub fn materialize(
        &self,
        defs: &ShapeDefinitions,
        mut next_id: impl FnMut() -> ShapeId,
        dx: f64,
        dy: f64,
    ) -> Result<Vec<Shape>, GeometryError> {
        let id_map: HashMap<ShapeId, ShapeId> = self.ids.iter().map(|old| (*old, next_id())).collect();
        let mut group_map: HashMap<String, String> = HashMap::new();

        let mut out = Vec::with_capacity(self.shapes.len());
        for original in &self.shapes {
            let mut copy = Shape::clone(original);
            copy.handle = None;
            copy.id = id_map.get(&original.id).copied().unwrap_or(original.id);
            defs.move_by(&mut copy, dx, dy)?;

            if let Some(group) = copy.data.group_id.take() {
                let fresh = group_map
                    .entry(group)
                    .or_insert_with(|| Uuid::new_v4().to_string())
                    .clone();
                copy.data.group_id = Some(fresh);
            }

            copy.connections = match &original.connections {
                Connections::Node { edges } => Connections::Node {
                    edges: edges.iter().filter_map(|e| id_map.get(e).copied()).collect(),
                },
                Connections::Edge { from, to } => {
                    let remap = |anchor: &Option<Anchor>| {
                        anchor.as_ref().and_then(|a| {
                            id_map.get(&a.shape_id).map(|new_id| Anchor {
                                shape_id: *new_id,
                                port_id: a.port_id.clone(),
                            })
                        })
                    };
                    Connections::Edge { from: remap(from), to: remap(to) }
                }
            };
            out.push(copy);
        }
        Ok(out)
    }
}
