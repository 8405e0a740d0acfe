//! Selection manager: an ordered set of selected shape ids.
//!
//! The first id is the primary selection (the one a property panel shows).
//! Every mutation reports a [`SelectionChange`] naming the shapes that entered
//! and left the set, so overlay visibility can be updated for exactly those
//! shapes.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use crate::shape::ShapeId;
use crate::store::ShapeStore;

/// Shapes that entered and left the selection in one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionChange {
    pub entered: Vec<ShapeId>,
    pub left: Vec<ShapeId>,
}

impl SelectionChange {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.left.is_empty()
    }

    /// Every id whose membership changed.
    pub fn touched(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.entered.iter().chain(self.left.iter()).copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<ShapeId>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn ids(&self) -> &[ShapeId] {
        &self.ids
    }

    #[must_use]
    pub fn primary(&self) -> Option<ShapeId> {
        self.ids.first().copied()
    }

    #[must_use]
    pub fn contains(&self, id: &ShapeId) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Replace the selection with exactly `id`.
    pub fn select_single(&mut self, id: ShapeId) -> SelectionChange {
        self.replace(vec![id])
    }

    /// Replace the selection with `ids` (duplicates dropped, order kept).
    pub fn select_multiple(&mut self, ids: impl IntoIterator<Item = ShapeId>) -> SelectionChange {
        self.replace(ids.into_iter().collect())
    }

    pub fn add(&mut self, id: ShapeId) -> SelectionChange {
        let mut next = self.ids.clone();
        next.push(id);
        self.replace(next)
    }

    pub fn remove(&mut self, id: ShapeId) -> SelectionChange {
        let next = self.ids.iter().copied().filter(|s| *s != id).collect();
        self.replace(next)
    }

    pub fn toggle(&mut self, id: ShapeId) -> SelectionChange {
        if self.contains(&id) { self.remove(id) } else { self.add(id) }
    }

    /// Select every shape in the store, in z-order.
    pub fn select_all(&mut self, store: &ShapeStore) -> SelectionChange {
        self.replace(store.ids().to_vec())
    }

    pub fn clear(&mut self) -> SelectionChange {
        self.replace(Vec::new())
    }

    /// Drop ids that no longer exist in the store.
    pub fn retain_existing(&mut self, store: &ShapeStore) -> SelectionChange {
        let next = self.ids.iter().copied().filter(|id| store.contains(id)).collect();
        self.replace(next)
    }

    /// True when at least two shapes are selected and all share one non-empty group id.
    #[must_use]
    pub fn is_group_selection(&self, store: &ShapeStore) -> bool {
        if self.ids.len() < 2 {
            return false;
        }
        let mut groups = self
            .ids
            .iter()
            .map(|id| store.get(id).and_then(|s| s.data.group_id.as_deref()));
        let Some(Some(first)) = groups.next() else {
            return false;
        };
        groups.all(|g| g == Some(first))
    }

    fn replace(&mut self, mut next: Vec<ShapeId>) -> SelectionChange {
        let mut seen = Vec::with_capacity(next.len());
        next.retain(|id| {
            if seen.contains(id) {
                false
            } else {
                seen.push(*id);
                true
            }
        });
        let entered = next.iter().copied().filter(|id| !self.ids.contains(id)).collect();
        let left = self.ids.iter().copied().filter(|id| !next.contains(id)).collect();
        self.ids = next;
        SelectionChange { entered, left }
    }
}

/// Every shape sharing `id`'s group, in z-order; just `[id]` when ungrouped.
#[must_use]
pub fn group_members(store: &ShapeStore, id: ShapeId) -> Vec<ShapeId> {
    let Some(group) = store.get(&id).and_then(|s| s.data.group_id.clone()) else {
        return vec![id];
    };
    let mut members: Vec<ShapeId> = store
        .iter()
        .filter(|s| s.data.group_id.as_deref() == Some(group.as_str()))
        .map(|s| s.id)
        .collect();
    // Keep the clicked shape primary.
    members.retain(|m| *m != id);
    members.insert(0, id);
    members
}
