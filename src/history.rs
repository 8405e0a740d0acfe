//! Undo/redo history of full-state snapshots.
//!
//! DESIGN
//! ======
//! The history is a vector of snapshots plus a cursor pointing at the entry
//! that matches the live state. Saving truncates the redo tail, appends, then
//! evicts from the front while over the limit; the cursor always ends on the
//! newest entry, so `0 <= cursor < len` holds after every save regardless of
//! eviction. Undo and redo only move the cursor.
//!
//! Snapshots hold `Rc<Shape>` shared with the store. The store copies a shape
//! before writing to it, so a snapshot never observes later edits.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::rc::Rc;

use crate::shape::{Shape, ShapeId};

/// One restorable state of the editor.
#[derive(Debug, Clone)]
pub struct HistorySnapshot {
    pub shapes: Vec<Rc<Shape>>,
    pub selected_ids: Vec<ShapeId>,
    pub zoom: f64,
}

impl PartialEq for HistorySnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.selected_ids == other.selected_ids
            && self.zoom.to_bits() == other.zoom.to_bits()
            && self.shapes.len() == other.shapes.len()
            && self.shapes.iter().zip(&other.shapes).all(|(a, b)| **a == **b)
    }
}

#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistorySnapshot>,
    cursor: usize,
    limit: usize,
}

impl History {
    /// Empty history keeping at most `limit` snapshots (at least one).
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self { entries: Vec::new(), cursor: 0, limit: limit.max(1) }
    }

    pub fn save(&mut self, snapshot: HistorySnapshot) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(snapshot);
        let overflow = self.entries.len().saturating_sub(self.limit);
        if overflow > 0 {
            self.entries.drain(..overflow);
        }
        self.cursor = self.entries.len() - 1;
        tracing::debug!(cursor = self.cursor, len = self.entries.len(), "history snapshot saved");
    }

    /// Step back. Returns the snapshot now under the cursor, or `None` at the start.
    pub fn undo(&mut self) -> Option<&HistorySnapshot> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward. Returns the snapshot now under the cursor, or `None` at the tail.
    pub fn redo(&mut self) -> Option<&HistorySnapshot> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0 && !self.entries.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    #[must_use]
    pub fn current(&self) -> Option<&HistorySnapshot> {
        self.entries.get(self.cursor)
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[must_use]
    pub fn entries(&self) -> &[HistorySnapshot] {
        &self.entries
    }

    /// Drop everything and start over from `baseline`.
    pub fn reset(&mut self, baseline: HistorySnapshot) {
        self.entries.clear();
        self.entries.push(baseline);
        self.cursor = 0;
    }
}
