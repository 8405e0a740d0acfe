//! Pointer and keyboard gestures.
//!
//! Pointer-down hit-tests and picks the gesture. Moves apply incremental
//! deltas to live shapes. Release commits with exactly one snapshot, or
//! aborts with none. A provider error mid-gesture rolls the store back to
//! its state at pointer-down and returns to idle.

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use std::collections::HashSet;
use std::mem;

use super::{Action, EditorSession};
use crate::connection::{self, WaypointSnap, ports_for_shape, resolve_anchor};
use crate::geometry::{Point, Rect};
use crate::hit::{Hit, HitPart, hit_test, shape_contains};
use crate::input::{Button, InputState, Key, Modifiers};
use crate::provider::{GeometryError, ResizeHandle};
use crate::render::RenderHost;
use crate::shape::{Anchor, EdgeEnd, PortId, ShapeData, ShapeId, ShapeKind};
use crate::transform::{drag_corner_radius, world_bounds};

impl<H: RenderHost> EditorSession<H> {
    pub fn on_pointer_down(&mut self, screen: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.last_pointer = screen;
        if button != Button::Primary || !self.input.is_idle() {
            return Vec::new();
        }
        let world = self.camera.screen_to_world(screen);
        let hit = self.hit_at(world);
        self.gesture_origin = Some(self.store.snapshot());

        let mut actions = Vec::new();
        match hit {
            Some(Hit { shape_id, part: HitPart::ResizeHandle(handle) }) => {
                self.begin_resize(shape_id, handle, world, &mut actions);
            }
            Some(Hit { shape_id, part: HitPart::CornerHandle }) => {
                self.begin_corner_radius(shape_id, world, &mut actions);
            }
            Some(Hit { shape_id, part: HitPart::ConnectorEndpoint(end) }) => {
                self.begin_endpoint_drag(shape_id, end, &mut actions);
            }
            Some(Hit { shape_id, part: HitPart::Waypoint(index) }) => {
                self.begin_point_drag(shape_id, index, world, &mut actions);
            }
            Some(Hit { shape_id, part: HitPart::Port(port_id) }) => {
                self.begin_connecting(shape_id, port_id, &mut actions);
            }
            Some(Hit { shape_id, part: HitPart::Body | HitPart::PathBody }) => {
                self.press_shape(shape_id, world, modifiers, &mut actions);
            }
            None => self.press_empty(world, modifiers, &mut actions),
        }

        if self.input.is_idle() {
            self.gesture_origin = None;
        } else {
            tracing::trace!(state = self.input.name(), "gesture started");
        }
        actions
    }

    pub fn on_pointer_move(&mut self, screen: Point) -> Vec<Action> {
        self.last_pointer = screen;
        let world = self.camera.screen_to_world(screen);
        let state = mem::take(&mut self.input);
        let name = state.name();
        match self.continue_gesture(state, world) {
            Ok(actions) => actions,
            Err(err) => self.abort_gesture(name, &err),
        }
    }

    pub fn on_pointer_up(&mut self, screen: Point, button: Button) -> Vec<Action> {
        self.last_pointer = screen;
        if button != Button::Primary {
            return Vec::new();
        }
        let world = self.camera.screen_to_world(screen);
        let mut actions = match mem::take(&mut self.input) {
            InputState::Idle => return Vec::new(),
            InputState::DraggingShapes { moved: true, .. }
            | InputState::Resizing { moved: true, .. }
            | InputState::DraggingCornerRadius { moved: true, .. }
            | InputState::DraggingPolylinePoint { moved: true, .. } => self.commit(),
            InputState::DraggingShapes { collapse_to: Some(id), .. } => self.collapse_selection(id),
            InputState::DraggingShapes { .. }
            | InputState::Resizing { .. }
            | InputState::DraggingCornerRadius { .. }
            | InputState::DraggingPolylinePoint { .. } => Vec::new(),
            InputState::DraggingConnectorEndpoint { id, end, original } => {
                self.finish_endpoint_drag(id, end, original, world)
            }
            InputState::Connecting { from, .. } => self.finish_connecting(from, world),
            InputState::BoxSelecting { origin, additive, .. } => self.finish_box_select(origin, world, additive),
        };
        self.gesture_origin = None;
        actions.push(Action::SetCursor("default".into()));
        actions
    }

    /// Release outside the canvas. Resolves the gesture at the last known pointer.
    pub fn on_window_pointer_up(&mut self) -> Vec<Action> {
        if self.input.is_idle() {
            return Vec::new();
        }
        self.on_pointer_up(self.last_pointer, Button::Primary)
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        let command = modifiers.ctrl || modifiers.meta;
        match key.0.as_str() {
            "Escape" => self.cancel(),
            "Delete" | "Backspace" if self.input.is_idle() && self.editing_text.is_none() => self.delete_with_actions(),
            _ if !command || !self.input.is_idle() => Vec::new(),
            "z" | "Z" if modifiers.shift => self.history_step(Self::redo),
            "z" | "Z" => self.history_step(Self::undo),
            "y" | "Y" => self.history_step(Self::redo),
            "a" | "A" => {
                if self.select_all() {
                    vec![self.selection_action()]
                } else {
                    Vec::new()
                }
            }
            "c" | "C" => {
                self.copy_selection();
                Vec::new()
            }
            "v" | "V" => self.paste_with_actions(Self::paste_clipboard),
            "d" | "D" => self.paste_with_actions(Self::duplicate_selected),
            _ => Vec::new(),
        }
    }

    /// Double-click inserts a waypoint on a connector or requests a text edit.
    pub fn on_double_click(&mut self, screen: Point) -> Vec<Action> {
        self.last_pointer = screen;
        if !self.input.is_idle() {
            return Vec::new();
        }
        let world = self.camera.screen_to_world(screen);
        let Some(hit) = self.hit_at(world) else {
            return Vec::new();
        };
        let Some(shape) = self.store.get(&hit.shape_id) else {
            return Vec::new();
        };
        let id = shape.id;
        match hit.part {
            HitPart::PathBody if shape.kind == ShapeKind::Connector => {
                let snap = WaypointSnap {
                    snap_distance: self.config.waypoint_snap_distance,
                    align_distance: self.config.align_distance,
                };
                if connection::insert_waypoint(&self.definitions, &mut self.store, id, world, snap).is_none() {
                    return Vec::new();
                }
                self.render_shape(id);
                self.save_snapshot();
                vec![Action::ShapeChanged(id), self.history_action()]
            }
            HitPart::Body if shape.kind.supports_text() => {
                let text = shape.data.text.clone().unwrap_or_default();
                self.editing_text = Some(id);
                vec![Action::EditTextRequested { id, text }]
            }
            _ => Vec::new(),
        }
    }

    // --- Pointer-down ---

    fn hit_at(&self, world: Point) -> Option<Hit> {
        let radius = self.camera.screen_dist_to_world(self.config.handle_radius_px);
        let tolerance = self.camera.screen_dist_to_world(self.config.hit_tolerance_px);
        hit_test(&self.definitions, &self.store, &self.overlays, world, radius, tolerance)
    }

    fn begin_resize(&mut self, id: ShapeId, handle: ResizeHandle, world: Point, actions: &mut Vec<Action>) {
        let Some(shape) = self.store.get(&id) else {
            return;
        };
        self.input = InputState::Resizing {
            id,
            handle,
            start_world: world,
            original: Box::new(shape.data.clone()),
            moved: false,
        };
        let cursor = match handle {
            ResizeHandle::Nw | ResizeHandle::Se => "nwse-resize",
            ResizeHandle::Ne | ResizeHandle::Sw => "nesw-resize",
        };
        actions.push(Action::SetCursor(cursor.into()));
    }

    fn begin_corner_radius(&mut self, id: ShapeId, world: Point, actions: &mut Vec<Action>) {
        let Some(shape) = self.store.get(&id) else {
            return;
        };
        self.input = InputState::DraggingCornerRadius {
            id,
            start_world: world,
            start_radius: shape.data.corner_radius.unwrap_or(0.0),
            moved: false,
        };
        actions.push(Action::SetCursor("ew-resize".into()));
    }

    fn begin_endpoint_drag(&mut self, id: ShapeId, end: EdgeEnd, actions: &mut Vec<Action>) {
        let Some(original) = self.store.get(&id).and_then(|s| s.terminal(end)) else {
            return;
        };
        self.input = InputState::DraggingConnectorEndpoint { id, end, original };
        self.refresh_all_overlays();
        actions.push(Action::SetCursor("crosshair".into()));
    }

    fn begin_point_drag(&mut self, id: ShapeId, index: usize, world: Point, actions: &mut Vec<Action>) {
        let Some(original) = self.store.get(&id).and_then(|s| s.points()).and_then(|p| p.get(index)).copied() else {
            return;
        };
        self.input = InputState::DraggingPolylinePoint { id, index, start_world: world, original, moved: false };
        actions.push(Action::SetCursor("move".into()));
    }

    fn begin_connecting(&mut self, id: ShapeId, port_id: PortId, actions: &mut Vec<Action>) {
        if self.start_connection(id, Some(port_id)) {
            actions.push(Action::SetCursor("crosshair".into()));
            actions.push(Action::RenderNeeded);
        }
    }

    fn press_shape(&mut self, id: ShapeId, world: Point, modifiers: Modifiers, actions: &mut Vec<Action>) {
        let mut collapse_to = None;
        let changed = if modifiers.toggles_selection() {
            self.toggle_selection(id)
        } else if !self.selection.contains(&id) {
            self.select_single(id)
        } else {
            if self.selection.len() > 1 {
                collapse_to = Some(id);
            }
            false
        };
        if changed {
            actions.push(self.selection_action());
        }
        if !self.selection.contains(&id) {
            return;
        }
        if self.is_draggable(id) {
            self.input = InputState::DraggingShapes { last_world: world, moved: false, collapse_to };
            actions.push(Action::SetCursor("move".into()));
        } else if let Some(target) = collapse_to {
            actions.extend(self.collapse_selection(target));
        }
    }

    fn press_empty(&mut self, world: Point, modifiers: Modifiers, actions: &mut Vec<Action>) {
        let additive = modifiers.toggles_selection();
        if !additive && self.clear_selection() {
            actions.push(self.selection_action());
        }
        if self.config.selection_box_enabled {
            self.input = InputState::BoxSelecting { origin: world, current: world, additive };
        }
    }

    /// Anchored edges follow their shapes and are never dragged directly.
    fn is_draggable(&self, id: ShapeId) -> bool {
        self.store
            .get(&id)
            .is_some_and(|s| !(s.kind.is_edge() && s.is_connected()))
    }

    // --- Pointer-move ---

    fn continue_gesture(&mut self, state: InputState, world: Point) -> Result<Vec<Action>, GeometryError> {
        match state {
            InputState::Idle => Ok(self.update_hover(world)),
            InputState::DraggingShapes { last_world, moved, collapse_to } => {
                let (dx, dy) = (world.x - last_world.x, world.y - last_world.y);
                if dx == 0.0 && dy == 0.0 {
                    self.input = InputState::DraggingShapes { last_world, moved, collapse_to };
                    return Ok(Vec::new());
                }
                let changed = self.translate_selection(dx, dy)?;
                self.input = InputState::DraggingShapes { last_world: world, moved: true, collapse_to };
                Ok(changed_actions(changed))
            }
            InputState::Resizing { id, handle, start_world, original, moved } => {
                let (dx, dy) = (world.x - start_world.x, world.y - start_world.y);
                if let Some(shape) = self.store.get_mut(&id) {
                    shape.data = ShapeData::clone(&original);
                    self.definitions.resize(shape, handle, dx, dy)?;
                }
                let mut changed = vec![id];
                changed.extend(self.after_geometry_change(id));
                let moved = moved || dx != 0.0 || dy != 0.0;
                self.input = InputState::Resizing { id, handle, start_world, original, moved };
                Ok(changed_actions(changed))
            }
            InputState::DraggingCornerRadius { id, start_world, start_radius, moved } => {
                let dx = world.x - start_world.x;
                if let Some(shape) = self.store.get_mut(&id) {
                    drag_corner_radius(&mut shape.data, start_radius, dx);
                }
                self.render_shape(id);
                let moved = moved || dx != 0.0;
                self.input = InputState::DraggingCornerRadius { id, start_world, start_radius, moved };
                Ok(changed_actions(vec![id]))
            }
            InputState::DraggingConnectorEndpoint { id, end, original } => {
                if let Some(shape) = self.store.get_mut(&id) {
                    shape.set_terminal(end, world);
                }
                self.render_shape(id);
                self.input = InputState::DraggingConnectorEndpoint { id, end, original };
                Ok(changed_actions(vec![id]))
            }
            InputState::DraggingPolylinePoint { id, index, start_world, original, moved } => {
                let (dx, dy) = (world.x - start_world.x, world.y - start_world.y);
                let point = original.offset(dx, dy);
                if !point.is_finite() {
                    return Err(GeometryError::NonFinite("point"));
                }
                if let Some(slot) = self
                    .store
                    .get_mut(&id)
                    .and_then(|s| s.data.geometry.points_mut())
                    .and_then(|p| p.get_mut(index))
                {
                    *slot = point;
                }
                let mut changed = vec![id];
                changed.extend(self.after_geometry_change(id));
                let moved = moved || dx != 0.0 || dy != 0.0;
                self.input = InputState::DraggingPolylinePoint { id, index, start_world, original, moved };
                Ok(changed_actions(changed))
            }
            InputState::Connecting { from, origin, .. } => {
                self.host.show_preview_edge(origin, world);
                self.input = InputState::Connecting { from, origin, current: world };
                Ok(vec![Action::RenderNeeded])
            }
            InputState::BoxSelecting { origin, additive, .. } => {
                self.input = InputState::BoxSelecting { origin, current: world, additive };
                Ok(vec![Action::RenderNeeded])
            }
        }
    }

    /// Move every draggable selected shape. Connectors whose both ends are
    /// bound to moving shapes carry their interior waypoints along.
    fn translate_selection(&mut self, dx: f64, dy: f64) -> Result<Vec<ShapeId>, GeometryError> {
        let movable: Vec<ShapeId> = self
            .selection
            .ids()
            .iter()
            .copied()
            .filter(|id| self.is_draggable(*id))
            .collect();
        for id in &movable {
            if let Some(shape) = self.store.get_mut(id) {
                self.definitions.move_by(shape, dx, dy)?;
            }
        }

        let moved_nodes: HashSet<ShapeId> = movable
            .iter()
            .copied()
            .filter(|id| self.store.get(id).is_some_and(|s| !s.kind.is_edge()))
            .collect();
        let spanning: Vec<ShapeId> = self
            .store
            .iter()
            .filter(|s| s.kind.is_edge() && s.points().is_some_and(|p| p.len() > 2))
            .filter(|s| {
                [EdgeEnd::From, EdgeEnd::To]
                    .iter()
                    .all(|end| s.anchor(*end).is_some_and(|a| moved_nodes.contains(&a.shape_id)))
            })
            .map(|s| s.id)
            .collect();
        for id in &spanning {
            if let Some(points) = self.store.get_mut(id).and_then(|s| s.data.geometry.points_mut()) {
                let last = points.len() - 1;
                for p in &mut points[1..last] {
                    *p = p.offset(dx, dy);
                }
            }
        }

        let mut changed = movable.clone();
        for id in movable {
            for edge in self.after_geometry_change(id) {
                if !changed.contains(&edge) {
                    changed.push(edge);
                }
            }
        }
        for id in spanning {
            if !changed.contains(&id) {
                self.render_shape(id);
                changed.push(id);
            }
        }
        Ok(changed)
    }

    fn update_hover(&mut self, world: Point) -> Vec<Action> {
        let radius = self.camera.screen_dist_to_world(self.config.handle_radius_px);
        let tolerance = self.camera.screen_dist_to_world(self.config.hit_tolerance_px);
        // Stay on the hovered shape while the pointer is over one of its ports.
        let on_port = self
            .hovered
            .and_then(|id| self.store.get(&id))
            .is_some_and(|s| {
                ports_for_shape(&self.definitions, s)
                    .iter()
                    .any(|p| p.point.distance(world) <= radius)
            });
        let next = if on_port {
            self.hovered
        } else {
            self.store
                .iter()
                .rev()
                .filter(|s| !s.kind.is_edge())
                .find(|s| shape_contains(&self.definitions, s, world, tolerance))
                .map(|s| s.id)
        };
        if next == self.hovered {
            return Vec::new();
        }
        let previous = mem::replace(&mut self.hovered, next);
        for id in previous.into_iter().chain(next) {
            self.refresh_overlays(id);
        }
        vec![Action::RenderNeeded]
    }

    // --- Pointer-up ---

    fn commit(&mut self) -> Vec<Action> {
        self.save_snapshot();
        vec![self.history_action()]
    }

    /// Click without drag on a member of a multi-selection keeps only that shape.
    fn collapse_selection(&mut self, id: ShapeId) -> Vec<Action> {
        let change = self.selection.select_single(id);
        if self.apply_selection_change(&change) {
            vec![self.selection_action()]
        } else {
            Vec::new()
        }
    }

    fn finish_endpoint_drag(&mut self, id: ShapeId, end: EdgeEnd, original: Point, world: Point) -> Vec<Action> {
        let target = resolve_anchor(
            &self.definitions,
            &self.store,
            self.visible_port_shapes(),
            world,
            self.config.port_snap_distance,
            &[id],
        );
        let mut actions = vec![Action::ShapeChanged(id)];
        if let Some(anchor) = target {
            tracing::debug!(edge = %id, ?end, target = %anchor.shape_id, "edge end bound");
            connection::bind(&self.definitions, &mut self.store, id, end, anchor);
            self.render_shape(id);
            self.save_snapshot();
            actions.push(self.history_action());
        } else {
            if let Some(shape) = self.store.get_mut(&id) {
                shape.set_terminal(end, original);
            }
            self.render_shape(id);
        }
        self.refresh_all_overlays();
        actions
    }

    fn finish_connecting(&mut self, from: Anchor, world: Point) -> Vec<Action> {
        self.host.hide_preview_edge();
        let target = resolve_anchor(
            &self.definitions,
            &self.store,
            self.visible_port_shapes(),
            world,
            self.config.port_snap_distance,
            &[from.shape_id],
        );
        let mut actions = Vec::new();
        if let Some(id) = target.and_then(|to| self.create_connector(from, to)) {
            self.save_snapshot();
            actions.push(Action::ShapeAdded(id));
            actions.push(self.history_action());
        }
        self.refresh_all_overlays();
        actions.push(Action::RenderNeeded);
        actions
    }

    fn finish_box_select(&mut self, origin: Point, world: Point, additive: bool) -> Vec<Action> {
        let area = Rect::from_corners(origin, world);
        let inside: Vec<ShapeId> = self
            .store
            .iter()
            .filter(|s| !s.kind.is_edge() && area.contains_rect(&world_bounds(&self.definitions, s)))
            .map(|s| s.id)
            .collect();
        let changed = if additive {
            let mut any = false;
            for id in inside {
                any |= self.add_to_selection(id);
            }
            any
        } else {
            self.select_multiple(&inside)
        };
        let mut actions = vec![Action::RenderNeeded];
        if changed {
            actions.push(self.selection_action());
        }
        actions
    }

    // --- Abort / keys ---

    /// Escape: abandon a pending connection, else the text edit, else the
    /// selection. Other gestures ignore it and resolve on release.
    fn cancel(&mut self) -> Vec<Action> {
        if matches!(self.input, InputState::Connecting { .. }) {
            tracing::debug!("connection cancelled");
            self.rollback_gesture();
            return vec![Action::SetCursor("default".into()), Action::RenderNeeded];
        }
        if !self.input.is_idle() {
            return Vec::new();
        }
        if self.editing_text.take().is_some() {
            return vec![Action::RenderNeeded];
        }
        if self.clear_selection() {
            return vec![self.selection_action()];
        }
        Vec::new()
    }

    fn abort_gesture(&mut self, state: &'static str, err: &GeometryError) -> Vec<Action> {
        tracing::warn!(state, %err, "gesture aborted");
        self.rollback_gesture();
        vec![Action::SetCursor("default".into()), Action::RenderNeeded]
    }

    /// Put every shape back the way it was at pointer-down.
    fn rollback_gesture(&mut self) {
        let origin = self.gesture_origin.take();
        self.reset_transient();
        if let Some(shapes) = origin {
            self.store.load(shapes);
            for id in self.store.ids().to_vec() {
                self.render_shape(id);
            }
        }
        self.refresh_all_overlays();
    }

    fn delete_with_actions(&mut self) -> Vec<Action> {
        let before = self.store.ids().to_vec();
        if !self.delete_selected() {
            return Vec::new();
        }
        let mut actions: Vec<Action> = before
            .into_iter()
            .filter(|id| !self.store.contains(id))
            .map(Action::ShapeRemoved)
            .collect();
        actions.push(self.selection_action());
        actions.push(self.history_action());
        actions
    }

    fn paste_with_actions(&mut self, paste: fn(&mut Self) -> bool) -> Vec<Action> {
        let before: HashSet<ShapeId> = self.store.ids().iter().copied().collect();
        if !paste(self) {
            return Vec::new();
        }
        let mut actions: Vec<Action> = self
            .store
            .ids()
            .iter()
            .filter(|id| !before.contains(id))
            .map(|id| Action::ShapeAdded(*id))
            .collect();
        actions.push(self.selection_action());
        actions.push(self.history_action());
        actions
    }

    fn history_step(&mut self, step: fn(&mut Self) -> bool) -> Vec<Action> {
        if !step(self) {
            return Vec::new();
        }
        vec![self.selection_action(), self.history_action(), Action::RenderNeeded]
    }

    fn selection_action(&self) -> Action {
        Action::SelectionChanged(self.selection.ids().to_vec())
    }

    fn history_action(&self) -> Action {
        Action::HistoryChanged { can_undo: self.can_undo(), can_redo: self.can_redo() }
    }
}

fn changed_actions(ids: Vec<ShapeId>) -> Vec<Action> {
    let mut actions: Vec<Action> = ids.into_iter().map(Action::ShapeChanged).collect();
    actions.push(Action::RenderNeeded);
    actions
}
