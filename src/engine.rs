//! Editor session: the single context object every operation runs against.
//!
//! DESIGN
//! ======
//! `EditorSession` owns the shape store, selection, history, clipboard,
//! overlay cache, gesture state, id counter, and the last pointer position.
//! Nothing is global. All operations are synchronous; a gesture is a strict
//! down → move* → up sequence and no second gesture can start before the
//! current one resolves.
//!
//! Undoable operations end in exactly one `save_snapshot`. Pointer gestures
//! (see `gesture`) snapshot on release. Transient modes (gesture state,
//! hover, text editing) are never journaled and are reset on restore.
//!
//! Absence is not an error: unknown ids, empty selections, and history
//! boundaries return `false`/`None` and leave state untouched.

mod gesture;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::rc::Rc;

use uuid::Uuid;

use crate::clipboard::ClipboardBuffer;
use crate::config::EditorConfig;
use crate::connection::{self, nearest_port, ports_for_shape};
use crate::document::{DiagramDocument, DocumentError};
use crate::geometry::{Camera, Point, Rect};
use crate::history::{History, HistorySnapshot};
use crate::hit::{connector_handle_points, corner_handle_points, resize_handle_points};
use crate::input::InputState;
use crate::layering;
use crate::overlay::OverlayCache;
use crate::provider::{Port, ShapeDefinitions};
use crate::render::{NullHost, Overlay, RenderHost};
use crate::selection::{Selection, SelectionChange, group_members};
use crate::shape::{Anchor, EdgeEnd, PortId, Shape, ShapeData, ShapeGeometry, ShapeId, ShapeKind, Transform};
use crate::store::ShapeStore;
use crate::transform::{self, apply_transform, world_bounds};

/// Notifications returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ShapeAdded(ShapeId),
    ShapeChanged(ShapeId),
    ShapeRemoved(ShapeId),
    SelectionChanged(Vec<ShapeId>),
    HistoryChanged { can_undo: bool, can_redo: bool },
    /// The host should open a text editor for this shape and call `commit_text`.
    EditTextRequested { id: ShapeId, text: String },
    SetCursor(String),
    RenderNeeded,
}

pub struct EditorSession<H: RenderHost = NullHost> {
    pub config: EditorConfig,
    pub definitions: ShapeDefinitions,
    pub camera: Camera,
    pub input: InputState,
    store: ShapeStore,
    selection: Selection,
    history: History,
    clipboard: Option<ClipboardBuffer>,
    overlays: OverlayCache,
    host: H,
    next_id: u64,
    hovered: Option<ShapeId>,
    /// Screen position of the most recent pointer event.
    last_pointer: Point,
    /// Store contents at pointer-down, restored if the gesture fails.
    gesture_origin: Option<Vec<Rc<Shape>>>,
    editing_text: Option<ShapeId>,
}

impl Default for EditorSession<NullHost> {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession<NullHost> {
    /// Headless session.
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        Self::with_host(config, NullHost::default())
    }
}

impl<H: RenderHost> EditorSession<H> {
    /// Session drawing through `host`, seeded with one baseline snapshot.
    #[must_use]
    pub fn with_host(config: EditorConfig, host: H) -> Self {
        let mut session = Self {
            history: History::new(config.history_limit),
            config,
            definitions: ShapeDefinitions::builtin(),
            camera: Camera::default(),
            input: InputState::Idle,
            store: ShapeStore::new(),
            selection: Selection::new(),
            clipboard: None,
            overlays: OverlayCache::new(),
            host,
            next_id: 0,
            hovered: None,
            last_pointer: Point::default(),
            gesture_origin: None,
            editing_text: None,
        };
        let baseline = session.capture();
        session.history.reset(baseline);
        session
    }

    // --- Queries ---

    #[must_use]
    pub fn store(&self) -> &ShapeStore {
        &self.store
    }

    #[must_use]
    pub fn shape(&self, id: &ShapeId) -> Option<&Shape> {
        self.store.get(id)
    }

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub fn selected_ids(&self) -> &[ShapeId] {
        self.selection.ids()
    }

    /// The shape a property panel should display.
    #[must_use]
    pub fn primary_shape(&self) -> Option<&Shape> {
        self.selection.primary().and_then(|id| self.store.get(&id))
    }

    #[must_use]
    pub fn is_group_selection(&self) -> bool {
        self.selection.is_group_selection(&self.store)
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub fn overlays(&self) -> &OverlayCache {
        &self.overlays
    }

    #[must_use]
    pub fn clipboard(&self) -> Option<&ClipboardBuffer> {
        self.clipboard.as_ref()
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn hovered(&self) -> Option<ShapeId> {
        self.hovered
    }

    #[must_use]
    pub fn editing_text(&self) -> Option<ShapeId> {
        self.editing_text
    }

    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.camera.zoom
    }

    /// Canvas-space bounds of a shape including its transform.
    #[must_use]
    pub fn world_bounds(&self, id: &ShapeId) -> Option<Rect> {
        self.store.get(id).map(|s| world_bounds(&self.definitions, s))
    }

    /// Canvas-space ports of a shape.
    #[must_use]
    pub fn ports_for(&self, id: &ShapeId) -> Vec<Port> {
        self.store
            .get(id)
            .map(|s| ports_for_shape(&self.definitions, s))
            .unwrap_or_default()
    }

    /// Closest currently visible port within `max_distance`
    /// (default: the configured port snap distance).
    #[must_use]
    pub fn find_nearest_port(&self, at: Point, max_distance: Option<f64>) -> Option<(ShapeId, Port)> {
        let max = max_distance.unwrap_or(self.config.port_snap_distance);
        nearest_port(&self.definitions, self.visible_port_shapes(), at, max)
    }

    fn visible_port_shapes(&self) -> impl Iterator<Item = &Shape> {
        self.store
            .iter()
            .filter(|s| self.overlays.is_shown(s.id, Overlay::Ports))
    }

    // --- Shape CRUD ---

    /// Add a shape with default style. Returns its new id.
    pub fn add_shape(&mut self, kind: ShapeKind, geometry: ShapeGeometry) -> ShapeId {
        self.add_shape_with(kind, ShapeData::new(geometry))
    }

    /// Add a shape with explicit data. Returns its new id.
    pub fn add_shape_with(&mut self, kind: ShapeKind, mut data: ShapeData) -> ShapeId {
        let id = self.next_shape_id();
        if kind == ShapeKind::RoundedRect && data.corner_radius.is_none() {
            data.corner_radius = Some(0.0);
        }
        data.clamp_corner_radius();
        let mut shape = Shape::new(id, kind, data.geometry.clone());
        shape.data = data;
        self.store.insert(shape);
        self.materialize(id);
        tracing::debug!(shape_id = %id, ?kind, "shape added");
        self.save_snapshot();
        id
    }

    /// Edit a shape's data in place. Connections and overlays follow.
    pub fn update_shape(&mut self, id: ShapeId, edit: impl FnOnce(&mut ShapeData)) -> bool {
        let Some(shape) = self.store.get_mut(&id) else {
            return false;
        };
        let before = shape.data.clone();
        edit(&mut shape.data);
        shape.data.clamp_corner_radius();
        if shape.data == before {
            return false;
        }
        self.after_geometry_change(id);
        self.save_snapshot();
        true
    }

    /// Remove a shape and every edge bound to it.
    pub fn remove_shape(&mut self, id: ShapeId) -> bool {
        if self.remove_cascade(id).is_empty() {
            return false;
        }
        self.save_snapshot();
        true
    }

    /// Remove every selected shape (cascading) as one history entry.
    pub fn delete_selected(&mut self) -> bool {
        let ids = self.selection.ids().to_vec();
        let mut removed = 0;
        for id in ids {
            removed += self.remove_cascade(id).len();
        }
        if removed == 0 {
            return false;
        }
        tracing::debug!(count = removed, "selection deleted");
        self.save_snapshot();
        true
    }

    /// Remove all shapes.
    pub fn clear(&mut self) -> bool {
        if self.store.is_empty() {
            return false;
        }
        self.reset_transient();
        self.dematerialize_all();
        self.store.clear();
        self.selection.clear();
        self.save_snapshot();
        true
    }

    fn remove_cascade(&mut self, id: ShapeId) -> Vec<ShapeId> {
        let removed = self.store.remove_cascade(&id);
        let ids: Vec<ShapeId> = removed.iter().map(|s| s.id).collect();
        for shape in &removed {
            self.dematerialize(shape);
        }
        if self.hovered.is_some_and(|h| ids.contains(&h)) {
            self.hovered = None;
        }
        if self.editing_text.is_some_and(|e| ids.contains(&e)) {
            self.editing_text = None;
        }
        let change = self.selection.retain_existing(&self.store);
        self.apply_selection_change(&change);
        ids
    }

    // --- Selection ---

    /// Select exactly `id`, expanded to its whole group.
    pub fn select_single(&mut self, id: ShapeId) -> bool {
        if !self.store.contains(&id) {
            return false;
        }
        let members = group_members(&self.store, id);
        let change = self.selection.select_multiple(members);
        self.apply_selection_change(&change)
    }

    pub fn select_multiple(&mut self, ids: &[ShapeId]) -> bool {
        let existing: Vec<ShapeId> = ids.iter().copied().filter(|id| self.store.contains(id)).collect();
        let change = self.selection.select_multiple(existing);
        self.apply_selection_change(&change)
    }

    pub fn add_to_selection(&mut self, id: ShapeId) -> bool {
        if !self.store.contains(&id) {
            return false;
        }
        let change = self.selection.add(id);
        self.apply_selection_change(&change)
    }

    pub fn remove_from_selection(&mut self, id: ShapeId) -> bool {
        let change = self.selection.remove(id);
        self.apply_selection_change(&change)
    }

    pub fn toggle_selection(&mut self, id: ShapeId) -> bool {
        if !self.store.contains(&id) {
            return false;
        }
        let change = self.selection.toggle(id);
        self.apply_selection_change(&change)
    }

    pub fn select_all(&mut self) -> bool {
        let change = self.selection.select_all(&self.store);
        self.apply_selection_change(&change)
    }

    pub fn clear_selection(&mut self) -> bool {
        let change = self.selection.clear();
        self.apply_selection_change(&change)
    }

    /// Show/hide overlays for exactly the shapes whose membership changed.
    fn apply_selection_change(&mut self, change: &SelectionChange) -> bool {
        for id in change.touched() {
            self.refresh_overlays(id);
        }
        if self.editing_text.is_some_and(|e| change.left.contains(&e)) {
            self.editing_text = None;
        }
        !change.is_empty()
    }

    // --- History ---

    /// Journal the current shapes, selection, and zoom.
    pub fn save_snapshot(&mut self) {
        let snapshot = self.capture();
        self.history.save(snapshot);
    }

    fn capture(&self) -> HistorySnapshot {
        HistorySnapshot {
            shapes: self.store.snapshot(),
            selected_ids: self.selection.ids().to_vec(),
            zoom: self.camera.zoom,
        }
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        tracing::debug!(cursor = self.history.cursor(), "undo");
        self.restore(snapshot);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        tracing::debug!(cursor = self.history.cursor(), "redo");
        self.restore(snapshot);
        true
    }

    /// Replace live state with a snapshot and re-create every render handle.
    fn restore(&mut self, snapshot: HistorySnapshot) {
        self.reset_transient();
        self.dematerialize_all();
        self.store.load(snapshot.shapes);
        let ids = self.store.ids().to_vec();
        for id in &ids {
            if let Some(shape) = self.store.get_mut(id) {
                shape.handle = None;
            }
            self.materialize(*id);
        }
        self.selection = Selection::new();
        let existing: Vec<ShapeId> = snapshot
            .selected_ids
            .into_iter()
            .filter(|id| self.store.contains(id))
            .collect();
        self.selection.select_multiple(existing);
        self.camera.zoom = snapshot.zoom;
        self.refresh_all_overlays();
        self.restack();
    }

    /// Drop gesture, hover, and text-edit state.
    fn reset_transient(&mut self) {
        if matches!(self.input, InputState::Connecting { .. }) {
            self.host.hide_preview_edge();
        }
        self.input = InputState::Idle;
        self.gesture_origin = None;
        self.hovered = None;
        self.editing_text = None;
    }

    // --- Connections ---

    /// Enter connecting mode from a port (or the center) of `shape_id`.
    pub fn start_connection(&mut self, shape_id: ShapeId, port_id: Option<PortId>) -> bool {
        if !self.input.is_idle() || !self.store.get(&shape_id).is_some_and(|s| !s.kind.is_edge()) {
            return false;
        }
        let from = Anchor { shape_id, port_id };
        let Some(origin) = connection::anchor_point(&self.definitions, &self.store, &from) else {
            return false;
        };
        self.input = InputState::Connecting { from, origin, current: origin };
        self.host.show_preview_edge(origin, origin);
        self.refresh_all_overlays();
        true
    }

    /// Create a connector bound at both ends. Returns its id.
    pub fn connect_shapes(&mut self, from: Anchor, to: Anchor) -> Option<ShapeId> {
        let id = self.create_connector(from, to)?;
        self.save_snapshot();
        Some(id)
    }

    fn create_connector(&mut self, from: Anchor, to: Anchor) -> Option<ShapeId> {
        let valid = |a: &Anchor| self.store.get(&a.shape_id).is_some_and(|s| !s.kind.is_edge());
        if from.shape_id == to.shape_id || !valid(&from) || !valid(&to) {
            return None;
        }
        let start = connection::anchor_point(&self.definitions, &self.store, &from)?;
        let end = connection::anchor_point(&self.definitions, &self.store, &to)?;
        let id = self.next_shape_id();
        self.store
            .insert(Shape::new(id, ShapeKind::Connector, ShapeGeometry::Path { points: vec![start, end] }));
        let (from_id, to_id) = (from.shape_id, to.shape_id);
        connection::bind(&self.definitions, &mut self.store, id, EdgeEnd::From, from);
        connection::bind(&self.definitions, &mut self.store, id, EdgeEnd::To, to);
        self.materialize(id);
        tracing::debug!(edge = %id, from = %from_id, to = %to_id, "connector created");
        Some(id)
    }

    // --- Transforms and style ---

    pub fn rotate_selected_by(&mut self, degrees: f64) -> bool {
        self.transform_selected(|t| transform::rotate_by(t, degrees))
    }

    pub fn scale_selected(&mut self, factor: f64) -> bool {
        self.transform_selected(|t| transform::scale_by(t, factor))
    }

    pub fn flip_selected_horizontal(&mut self) -> bool {
        self.transform_selected(|t| {
            transform::flip_horizontal(t);
            true
        })
    }

    pub fn flip_selected_vertical(&mut self) -> bool {
        self.transform_selected(|t| {
            transform::flip_vertical(t);
            true
        })
    }

    /// Apply `edit` to each selected non-edge shape's transform. Edges are
    /// positioned by their anchors and never carry a transform.
    fn transform_selected(&mut self, edit: impl Fn(&mut Transform) -> bool) -> bool {
        let ids = self.selection.ids().to_vec();
        let mut changed = false;
        for id in ids {
            let Some(shape) = self.store.get_mut(&id) else {
                continue;
            };
            if shape.kind.is_edge() || !edit(&mut shape.data.transform) {
                continue;
            }
            changed = true;
            self.after_geometry_change(id);
        }
        if changed {
            self.save_snapshot();
        }
        changed
    }

    pub fn set_fill(&mut self, fill: &str) -> bool {
        self.style_selected(|d| d.style.fill = fill.to_string())
    }

    pub fn set_stroke(&mut self, stroke: &str) -> bool {
        self.style_selected(|d| d.style.stroke = stroke.to_string())
    }

    pub fn set_stroke_width(&mut self, width: f64) -> bool {
        if !width.is_finite() || width < 0.0 {
            return false;
        }
        self.style_selected(|d| d.style.stroke_width = width)
    }

    /// Opacity is clamped to `[0, 1]`.
    pub fn set_opacity(&mut self, opacity: f64) -> bool {
        if !opacity.is_finite() {
            return false;
        }
        self.style_selected(|d| d.style.opacity = opacity.clamp(0.0, 1.0))
    }

    /// Only affects shapes with a corner radius; the value is clamped.
    pub fn set_corner_radius(&mut self, radius: f64) -> bool {
        self.style_selected(|d| {
            if d.corner_radius.is_some() {
                d.corner_radius = Some(radius);
                d.clamp_corner_radius();
            }
        })
    }

    fn style_selected(&mut self, edit: impl Fn(&mut ShapeData)) -> bool {
        let ids = self.selection.ids().to_vec();
        let mut changed = false;
        for id in ids {
            let Some(shape) = self.store.get_mut(&id) else {
                continue;
            };
            let before = shape.data.clone();
            edit(&mut shape.data);
            if shape.data != before {
                changed = true;
                self.render_shape(id);
            }
        }
        if changed {
            self.save_snapshot();
        }
        changed
    }

    // --- Text ---

    /// Write text edited by the host. Empty text clears the label.
    pub fn commit_text(&mut self, id: ShapeId, text: &str) -> bool {
        let Some(shape) = self.store.get_mut(&id) else {
            return false;
        };
        if !shape.kind.supports_text() {
            return false;
        }
        let next = if text.is_empty() { None } else { Some(text.to_string()) };
        self.editing_text = None;
        if shape.data.text == next {
            return false;
        }
        shape.data.text = next;
        self.render_shape(id);
        self.save_snapshot();
        true
    }

    // --- Clipboard ---

    pub fn copy_selection(&mut self) -> bool {
        match ClipboardBuffer::capture(&self.store, self.selection.ids()) {
            Some(buffer) => {
                tracing::debug!(count = buffer.shapes.len(), "selection copied");
                self.clipboard = Some(buffer);
                true
            }
            None => false,
        }
    }

    /// Paste the clipboard with fresh ids, offset, and remapped links.
    pub fn paste_clipboard(&mut self) -> bool {
        let Some(buffer) = self.clipboard.clone() else {
            return false;
        };
        if self.paste_buffer(&buffer).is_none() {
            return false;
        }
        self.save_snapshot();
        true
    }

    /// Copy and paste the selection as one history entry. The clipboard is left alone.
    pub fn duplicate_selected(&mut self) -> bool {
        let Some(buffer) = ClipboardBuffer::capture(&self.store, self.selection.ids()) else {
            return false;
        };
        if self.paste_buffer(&buffer).is_none() {
            return false;
        }
        self.save_snapshot();
        true
    }

    fn paste_buffer(&mut self, buffer: &ClipboardBuffer) -> Option<Vec<ShapeId>> {
        let offset = self.config.paste_offset;
        let next_id = &mut self.next_id;
        let shapes = buffer.materialize(
            &self.definitions,
            || {
                *next_id += 1;
                ShapeId(*next_id)
            },
            offset,
            offset,
        );
        let shapes = match shapes {
            Ok(shapes) => shapes,
            Err(err) => {
                tracing::warn!(%err, "paste aborted");
                return None;
            }
        };
        let ids: Vec<ShapeId> = shapes.iter().map(|s| s.id).collect();
        for shape in shapes {
            let id = shape.id;
            self.store.insert(shape);
            self.materialize(id);
        }
        let change = self.selection.select_multiple(ids.clone());
        self.apply_selection_change(&change);
        tracing::debug!(count = ids.len(), "shapes pasted");
        Some(ids)
    }

    // --- Layering ---

    pub fn bring_to_front(&mut self) -> bool {
        self.reorder_selected(layering::bring_to_front)
    }

    pub fn send_to_back(&mut self) -> bool {
        self.reorder_selected(layering::send_to_back)
    }

    pub fn move_forward(&mut self) -> bool {
        self.reorder_selected(layering::move_forward)
    }

    pub fn move_backward(&mut self) -> bool {
        self.reorder_selected(layering::move_backward)
    }

    fn reorder_selected(&mut self, reorder: fn(&[ShapeId], &[ShapeId]) -> Vec<ShapeId>) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        let next = reorder(self.store.ids(), self.selection.ids());
        if !self.store.set_order(next) {
            return false;
        }
        self.restack();
        self.save_snapshot();
        true
    }

    // --- Grouping ---

    /// Put the selection (two or more shapes) into a fresh group. Returns the group id.
    pub fn group_selected(&mut self) -> Option<String> {
        if self.selection.len() < 2 {
            return None;
        }
        let group = Uuid::new_v4().to_string();
        for id in self.selection.ids().to_vec() {
            if let Some(shape) = self.store.get_mut(&id) {
                shape.data.group_id = Some(group.clone());
            }
        }
        self.save_snapshot();
        Some(group)
    }

    pub fn ungroup_selected(&mut self) -> bool {
        let mut changed = false;
        for id in self.selection.ids().to_vec() {
            if let Some(shape) = self.store.get_mut(&id) {
                changed |= shape.data.group_id.take().is_some();
            }
        }
        if changed {
            self.save_snapshot();
        }
        changed
    }

    // --- Zoom ---

    /// Set the zoom (clamped). Journaled with the next snapshot.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.camera.set_zoom(zoom);
        self.refresh_all_overlays();
    }

    // --- Import / export ---

    /// # Errors
    ///
    /// Returns `DocumentError::Json` if serialisation fails.
    pub fn export_json(&self) -> Result<String, DocumentError> {
        let doc = DiagramDocument::new(self.store.iter().cloned().collect(), self.camera.zoom);
        let json = doc.to_json()?;
        tracing::info!(shapes = doc.shapes.len(), "document exported");
        Ok(json)
    }

    /// Replace the canvas with a document. History restarts from the imported state.
    ///
    /// # Errors
    ///
    /// Returns the parse/validation error; the session is unchanged on error.
    pub fn import_json(&mut self, json: &str) -> Result<(), DocumentError> {
        let doc = DiagramDocument::from_json(json)?;
        self.reset_transient();
        self.dematerialize_all();
        if let Some(max) = doc.max_id() {
            self.next_id = self.next_id.max(max.0);
        }
        let count = doc.shapes.len();
        self.store.load(doc.shapes.into_iter().map(Rc::new));
        for id in self.store.ids().to_vec() {
            self.materialize(id);
        }
        self.selection = Selection::new();
        self.camera.zoom = doc.zoom;
        self.restack();
        let baseline = self.capture();
        self.history.reset(baseline);
        tracing::info!(shapes = count, "document imported");
        Ok(())
    }

    // --- Host synchronisation ---

    fn next_shape_id(&mut self) -> ShapeId {
        self.next_id += 1;
        ShapeId(self.next_id)
    }

    /// Create the host drawable for a shape and draw it.
    fn materialize(&mut self, id: ShapeId) {
        let Some(shape) = self.store.get(&id) else {
            return;
        };
        match self.host.create(shape) {
            Ok(handle) => {
                if let Some(shape) = self.store.get_mut(&id) {
                    shape.handle = Some(handle);
                }
            }
            Err(err) => tracing::warn!(shape_id = %id, %err, "render handle not created"),
        }
        self.render_shape(id);
    }

    fn dematerialize(&mut self, shape: &Shape) {
        if let Some(handle) = shape.handle {
            self.host.remove(handle);
        }
        self.overlays.hide_all(&mut self.host, shape.id);
    }

    fn dematerialize_all(&mut self) {
        for shape in self.store.snapshot() {
            self.dematerialize(&shape);
        }
        self.overlays.clear(&mut self.host);
    }

    fn restack(&mut self) {
        let order: Vec<_> = self.store.iter().filter_map(|s| s.handle).collect();
        self.host.restack(&order);
    }

    /// Push geometry/transform to the host and move visible overlays.
    fn render_shape(&mut self, id: ShapeId) {
        if let Some(shape) = self.store.get(&id) {
            apply_transform(&self.definitions, shape, &mut self.host);
        }
        self.refresh_overlays(id);
    }

    /// Re-render `id` and every edge bound to it. Returns the edges that moved.
    fn after_geometry_change(&mut self, id: ShapeId) -> Vec<ShapeId> {
        self.render_shape(id);
        let edges = connection::sync_connections(&self.definitions, &mut self.store, id);
        for edge in &edges {
            self.render_shape(*edge);
        }
        edges
    }

    /// Whether an edge end is being aimed at a target, so every port is offered.
    fn targeting(&self) -> bool {
        matches!(self.input, InputState::Connecting { .. } | InputState::DraggingConnectorEndpoint { .. })
    }

    fn desired_overlays(&self, shape: &Shape) -> Vec<Overlay> {
        let selected = self.selection.contains(&shape.id);
        let mut out = Vec::new();
        let has_ports = !self.definitions.local_ports(shape).is_empty();
        if has_ports && (selected || self.hovered == Some(shape.id) || self.targeting()) {
            out.push(Overlay::Ports);
        }
        if selected {
            if shape.kind.is_path() {
                out.push(Overlay::ConnectorHandles);
            } else {
                out.push(Overlay::ResizeHandles);
                if self.definitions.ops(shape.kind).corner_handles.is_some() {
                    out.push(Overlay::CornerHandles);
                }
                if shape.kind == ShapeKind::Text {
                    out.push(Overlay::TextOutline);
                }
            }
        }
        out
    }

    fn overlay_points(&self, shape: &Shape, overlay: Overlay) -> Vec<Point> {
        match overlay {
            Overlay::Ports => ports_for_shape(&self.definitions, shape).into_iter().map(|p| p.point).collect(),
            Overlay::ResizeHandles => resize_handle_points(&self.definitions, shape),
            Overlay::CornerHandles => corner_handle_points(&self.definitions, shape),
            Overlay::ConnectorHandles => connector_handle_points(&self.definitions, shape),
            Overlay::TextOutline => world_bounds(&self.definitions, shape).corners().to_vec(),
        }
    }

    /// Bring one shape's overlays in line with its selection/hover state.
    fn refresh_overlays(&mut self, id: ShapeId) {
        let Some(shape) = self.store.get(&id) else {
            self.overlays.hide_all(&mut self.host, id);
            return;
        };
        let desired = self.desired_overlays(shape);
        let updates: Vec<(Overlay, Vec<Point>)> = desired
            .iter()
            .map(|o| (*o, self.overlay_points(shape, *o)))
            .collect();
        for shown in self.overlays.overlays_of(id) {
            if !desired.contains(&shown) {
                self.overlays.hide(&mut self.host, id, shown);
            }
        }
        for (overlay, points) in updates {
            self.overlays.show(&mut self.host, id, overlay, points);
        }
    }

    fn refresh_all_overlays(&mut self) {
        for id in self.store.ids().to_vec() {
            self.refresh_overlays(id);
        }
    }
}
