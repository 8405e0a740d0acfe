//! Shape store: the single source of truth for what exists on the canvas.
//!
//! Shapes live in an arena keyed by id, each behind an `Rc`. The z-order is a
//! separate id list (bottom first). Mutation goes through `Rc::make_mut`, so
//! a shape shared with a history snapshot is copied on first write and the
//! snapshot stays untouched. Taking a snapshot is a vector of `Rc` clones.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::shape::{Shape, ShapeId};

#[derive(Debug, Clone, Default)]
pub struct ShapeStore {
    order: Vec<ShapeId>,
    shapes: HashMap<ShapeId, Rc<Shape>>,
}

impl ShapeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a shape on top of the z-order, or replace it in place if the id exists.
    pub fn insert(&mut self, shape: Shape) {
        self.insert_rc(Rc::new(shape));
    }

    fn insert_rc(&mut self, shape: Rc<Shape>) {
        let id = shape.id;
        if self.shapes.insert(id, shape).is_none() {
            self.order.push(id);
        }
    }

    #[must_use]
    pub fn get(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes.get(id).map(AsRef::as_ref)
    }

    /// Mutable access; copies the shape first if a snapshot still shares it.
    pub fn get_mut(&mut self, id: &ShapeId) -> Option<&mut Shape> {
        self.shapes.get_mut(id).map(Rc::make_mut)
    }

    #[must_use]
    pub fn contains(&self, id: &ShapeId) -> bool {
        self.shapes.contains_key(id)
    }

    /// Remove a single shape without touching its links.
    pub fn remove(&mut self, id: &ShapeId) -> Option<Rc<Shape>> {
        let removed = self.shapes.remove(id)?;
        self.order.retain(|o| o != id);
        Some(removed)
    }

    /// Remove a shape and everything that depends on it.
    ///
    /// Removing a node also removes every edge bound to it, and strips those
    /// edges from the link lists of the nodes at their other ends. Removing
    /// an edge strips it from its nodes' link lists. Returns the removed
    /// shapes, the requested one first. Unknown ids remove nothing.
    pub fn remove_cascade(&mut self, id: &ShapeId) -> Vec<Rc<Shape>> {
        let Some(target) = self.shapes.get(id).cloned() else {
            return Vec::new();
        };

        let mut doomed: Vec<ShapeId> = vec![*id];
        if !target.kind.is_edge() {
            for sid in &self.order {
                let Some(shape) = self.shapes.get(sid) else {
                    continue;
                };
                if shape.kind.is_edge() && !shape.ends_bound_to(*id).is_empty() && !doomed.contains(sid) {
                    doomed.push(*sid);
                }
            }
        }

        let doomed_set: HashSet<ShapeId> = doomed.iter().copied().collect();
        for sid in self.order.clone() {
            if doomed_set.contains(&sid) {
                continue;
            }
            let needs_unlink = self
                .shapes
                .get(&sid)
                .is_some_and(|s| s.edge_links().iter().any(|e| doomed_set.contains(e)) || s.edge_links().contains(id));
            if needs_unlink {
                if let Some(shape) = self.get_mut(&sid) {
                    for gone in &doomed {
                        shape.remove_edge_link(*gone);
                    }
                }
            }
        }

        doomed.iter().filter_map(|sid| self.remove(sid)).collect()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.shapes.clear();
    }

    /// Ids in z-order, bottom first.
    #[must_use]
    pub fn ids(&self) -> &[ShapeId] {
        &self.order
    }

    /// Shapes in z-order, bottom first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Shape> {
        self.order.iter().filter_map(|id| self.get(id))
    }

    #[must_use]
    pub fn index_of(&self, id: &ShapeId) -> Option<usize> {
        self.order.iter().position(|o| o == id)
    }

    /// Replace the z-order. Rejected unless `order` is a permutation of the
    /// current ids. Returns whether the order changed.
    pub fn set_order(&mut self, order: Vec<ShapeId>) -> bool {
        if order.len() != self.order.len() || order == self.order {
            return false;
        }
        let unique: HashSet<&ShapeId> = order.iter().collect();
        if unique.len() != order.len() || !order.iter().all(|id| self.shapes.contains_key(id)) {
            return false;
        }
        self.order = order;
        true
    }

    /// Shared handles to every shape in z-order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Rc<Shape>> {
        self.order.iter().filter_map(|id| self.shapes.get(id).cloned()).collect()
    }

    /// Replace the whole store with `shapes`, taking their order as the z-order.
    pub fn load(&mut self, shapes: impl IntoIterator<Item = Rc<Shape>>) {
        self.clear();
        for shape in shapes {
            self.insert_rc(shape);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
