//! Render-handle cache for per-shape overlays.
//!
//! Tracks which overlays the host is currently showing for each shape and the
//! points they were shown at. Hit-testing reads handle positions from here,
//! so a handle that is not in the cache cannot be grabbed. Hiding a shape's
//! overlays (on delete, deselect, or hover loss) removes them from the cache
//! and from the host in the same call.

#[cfg(test)]
#[path = "overlay_test.rs"]
mod overlay_test;

use std::collections::HashMap;

use crate::geometry::Point;
use crate::render::{Overlay, RenderHost};
use crate::shape::ShapeId;

#[derive(Debug, Clone, Default)]
pub struct OverlayCache {
    shown: HashMap<ShapeId, Vec<(Overlay, Vec<Point>)>>,
}

impl OverlayCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `overlay` at `points`, or move it if already shown.
    pub fn show(&mut self, host: &mut dyn RenderHost, id: ShapeId, overlay: Overlay, points: Vec<Point>) {
        host.show_overlay(id, overlay, &points);
        let entry = self.shown.entry(id).or_default();
        match entry.iter_mut().find(|(o, _)| *o == overlay) {
            Some(slot) => slot.1 = points,
            None => entry.push((overlay, points)),
        }
    }

    pub fn hide(&mut self, host: &mut dyn RenderHost, id: ShapeId, overlay: Overlay) {
        let Some(entry) = self.shown.get_mut(&id) else {
            return;
        };
        let before = entry.len();
        entry.retain(|(o, _)| *o != overlay);
        if entry.len() != before {
            host.hide_overlay(id, overlay);
        }
        if entry.is_empty() {
            self.shown.remove(&id);
        }
    }

    /// Hide every overlay of `id`.
    pub fn hide_all(&mut self, host: &mut dyn RenderHost, id: ShapeId) {
        if let Some(entry) = self.shown.remove(&id) {
            for (overlay, _) in entry {
                host.hide_overlay(id, overlay);
            }
        }
    }

    /// Hide everything.
    pub fn clear(&mut self, host: &mut dyn RenderHost) {
        let ids: Vec<ShapeId> = self.shown.keys().copied().collect();
        for id in ids {
            self.hide_all(host, id);
        }
    }

    #[must_use]
    pub fn is_shown(&self, id: ShapeId, overlay: Overlay) -> bool {
        self.points(id, overlay).is_some()
    }

    /// Points an overlay was last shown at.
    #[must_use]
    pub fn points(&self, id: ShapeId, overlay: Overlay) -> Option<&[Point]> {
        self.shown
            .get(&id)?
            .iter()
            .find(|(o, _)| *o == overlay)
            .map(|(_, p)| p.as_slice())
    }

    /// Overlays currently shown for `id`.
    #[must_use]
    pub fn overlays_of(&self, id: ShapeId) -> Vec<Overlay> {
        self.shown
            .get(&id)
            .map(|entry| entry.iter().map(|(o, _)| *o).collect())
            .unwrap_or_default()
    }

    /// Ids with `overlay` shown.
    pub fn shapes_with(&self, overlay: Overlay) -> impl Iterator<Item = ShapeId> + '_ {
        self.shown
            .iter()
            .filter(move |(_, entry)| entry.iter().any(|(o, _)| *o == overlay))
            .map(|(id, _)| *id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shown.is_empty()
    }
}
