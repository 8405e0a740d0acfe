//! Z-order mutations over an id list (bottom first).
//!
//! Each function returns the new order; shapes not in `ids` keep their
//! relative order.

#[cfg(test)]
#[path = "layering_test.rs"]
mod layering_test;

use crate::shape::ShapeId;

/// Move `ids` to the top, keeping their relative order.
#[must_use]
pub fn bring_to_front(order: &[ShapeId], ids: &[ShapeId]) -> Vec<ShapeId> {
    let (moved, rest): (Vec<ShapeId>, Vec<ShapeId>) = order.iter().partition(|id| ids.contains(id));
    rest.into_iter().chain(moved).collect()
}

/// Move `ids` to the bottom, keeping their relative order.
#[must_use]
pub fn send_to_back(order: &[ShapeId], ids: &[ShapeId]) -> Vec<ShapeId> {
    let (moved, rest): (Vec<ShapeId>, Vec<ShapeId>) = order.iter().partition(|id| ids.contains(id));
    moved.into_iter().chain(rest).collect()
}

/// Swap each of `ids` with the unselected neighbour directly above it.
#[must_use]
pub fn move_forward(order: &[ShapeId], ids: &[ShapeId]) -> Vec<ShapeId> {
    let mut out = order.to_vec();
    for i in (0..out.len().saturating_sub(1)).rev() {
        if ids.contains(&out[i]) && !ids.contains(&out[i + 1]) {
            out.swap(i, i + 1);
        }
    }
    out
}

/// Swap each of `ids` with the unselected neighbour directly below it.
#[must_use]
pub fn move_backward(order: &[ShapeId], ids: &[ShapeId]) -> Vec<ShapeId> {
    let mut out = order.to_vec();
    for i in 1..out.len() {
        if ids.contains(&out[i]) && !ids.contains(&out[i - 1]) {
            out.swap(i, i - 1);
        }
    }
    out
}
