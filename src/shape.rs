//! Shape model: what exists on the canvas and how shapes reference each other.
//!
//! A [`Shape`] pairs a kind tag with its semantic [`ShapeData`] (geometry,
//! style, transform, text) and its [`Connections`]. Node shapes list the ids
//! of connectors bound to them; edge shapes (`line`, `connector`) carry a
//! `from`/`to` pair of optional [`Anchor`]s.
//!
//! The render handle is an opaque token owned by the host. It is never
//! serialised and never takes part in equality, so two snapshots of the same
//! canvas compare equal even after the host re-created every handle.

#[cfg(test)]
#[path = "shape_test.rs"]
mod shape_test;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};
use crate::render::RenderHandle;

/// Unique identifier for a shape, issued from the session's counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(pub u64);

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shape-{}", self.0)
    }
}

/// Name of a port within its shape's port layout (`"top"`, `"left"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortId(pub String);

impl From<&str> for PortId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The kind of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeKind {
    Rect,
    RoundedRect,
    Circle,
    Triangle,
    /// Two-point straight edge.
    Line,
    /// Free point list; not an edge.
    Polyline,
    /// Edge whose first and last points are anchors; interior points are waypoints.
    Connector,
    Text,
    Icon,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 9] = [
        Self::Rect,
        Self::RoundedRect,
        Self::Circle,
        Self::Triangle,
        Self::Line,
        Self::Polyline,
        Self::Connector,
        Self::Text,
        Self::Icon,
    ];

    /// Position of this kind in [`ShapeKind::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Rect => 0,
            Self::RoundedRect => 1,
            Self::Circle => 2,
            Self::Triangle => 3,
            Self::Line => 4,
            Self::Polyline => 5,
            Self::Connector => 6,
            Self::Text => 7,
            Self::Icon => 8,
        }
    }

    /// Edges bind their endpoints to other shapes.
    #[must_use]
    pub fn is_edge(self) -> bool {
        matches!(self, Self::Line | Self::Connector)
    }

    /// Kinds whose geometry is a point list rather than a box.
    #[must_use]
    pub fn is_path(self) -> bool {
        matches!(self, Self::Line | Self::Connector | Self::Polyline)
    }

    /// Kinds that carry an editable text label.
    #[must_use]
    pub fn supports_text(self) -> bool {
        matches!(self, Self::Rect | Self::RoundedRect | Self::Circle | Self::Triangle | Self::Text)
    }
}

/// Semantic geometry of a shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeGeometry {
    /// Box kinds: position and size.
    Box(Rect),
    /// Path kinds: ordered point list.
    Path { points: Vec<Point> },
}

impl ShapeGeometry {
    #[must_use]
    pub fn as_rect(&self) -> Option<&Rect> {
        match self {
            Self::Box(rect) => Some(rect),
            Self::Path { .. } => None,
        }
    }

    #[must_use]
    pub fn points(&self) -> Option<&[Point]> {
        match self {
            Self::Box(_) => None,
            Self::Path { points } => Some(points),
        }
    }

    pub fn points_mut(&mut self) -> Option<&mut Vec<Point>> {
        match self {
            Self::Box(_) => None,
            Self::Path { points } => Some(points),
        }
    }
}

/// Paint properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self { fill: "#ffffff".into(), stroke: "#1f1a17".into(), stroke_width: 1.0, opacity: 1.0 }
    }
}

/// Rotation, uniform scale, and flips applied about the shape's center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Clockwise rotation in degrees, normalised to `[0, 360)`.
    pub rotation: f64,
    pub scale: f64,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self { rotation: 0.0, scale: 1.0, flip_x: false, flip_y: false }
    }
}

impl Transform {
    /// No rotation, unit scale, no flips.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.rotation.rem_euclid(360.0).abs() < crate::consts::EPSILON
            && (self.scale - 1.0).abs() < crate::consts::EPSILON
            && !self.flip_x
            && !self.flip_y
    }
}

/// Everything about a shape except its identity and links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeData {
    pub geometry: ShapeGeometry,
    #[serde(default)]
    pub style: Style,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ShapeData {
    #[must_use]
    pub fn new(geometry: ShapeGeometry) -> Self {
        Self {
            geometry,
            style: Style::default(),
            transform: Transform::default(),
            corner_radius: None,
            group_id: None,
            text: None,
        }
    }

    /// Largest corner radius the current box allows: `min(width, height) / 2`.
    #[must_use]
    pub fn max_corner_radius(&self) -> f64 {
        self.geometry
            .as_rect()
            .map_or(0.0, |r| (r.width.min(r.height) / 2.0).max(0.0))
    }

    /// Clamp `corner_radius` into `[0, max_corner_radius]`.
    pub fn clamp_corner_radius(&mut self) {
        if let Some(radius) = self.corner_radius {
            let max = self.max_corner_radius();
            let radius = if radius.is_finite() { radius } else { 0.0 };
            self.corner_radius = Some(radius.clamp(0.0, max));
        }
    }
}

/// Which end of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeEnd {
    From,
    To,
}

/// Binding of an edge end to a shape, optionally at a specific port.
/// Without a port the end follows the shape's center.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Anchor {
    pub shape_id: ShapeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_id: Option<PortId>,
}

impl Anchor {
    #[must_use]
    pub fn center(shape_id: ShapeId) -> Self {
        Self { shape_id, port_id: None }
    }

    #[must_use]
    pub fn port(shape_id: ShapeId, port_id: impl Into<PortId>) -> Self {
        Self { shape_id, port_id: Some(port_id.into()) }
    }
}

/// Links between shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Connections {
    /// Ids of the edges bound to this node.
    Node {
        #[serde(default)]
        edges: Vec<ShapeId>,
    },
    /// The edge's `[from, to]` anchors.
    Edge {
        #[serde(default)]
        from: Option<Anchor>,
        #[serde(default)]
        to: Option<Anchor>,
    },
}

impl Connections {
    #[must_use]
    pub fn for_kind(kind: ShapeKind) -> Self {
        if kind.is_edge() {
            Self::Edge { from: None, to: None }
        } else {
            Self::Node { edges: Vec::new() }
        }
    }
}

/// A drawable diagram element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    pub kind: ShapeKind,
    pub data: ShapeData,
    pub connections: Connections,
    #[serde(skip)]
    pub handle: Option<RenderHandle>,
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.kind == other.kind && self.data == other.data && self.connections == other.connections
    }
}

impl Shape {
    #[must_use]
    pub fn new(id: ShapeId, kind: ShapeKind, geometry: ShapeGeometry) -> Self {
        let mut data = ShapeData::new(geometry);
        if kind == ShapeKind::RoundedRect {
            data.corner_radius = Some(0.0);
        }
        Self { id, kind, data, connections: Connections::for_kind(kind), handle: None }
    }

    /// Edge with at least one bound end.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(&self.connections, Connections::Edge { from, to } if from.is_some() || to.is_some())
    }

    #[must_use]
    pub fn anchor(&self, end: EdgeEnd) -> Option<&Anchor> {
        match (&self.connections, end) {
            (Connections::Edge { from, .. }, EdgeEnd::From) => from.as_ref(),
            (Connections::Edge { to, .. }, EdgeEnd::To) => to.as_ref(),
            (Connections::Node { .. }, _) => None,
        }
    }

    /// Replace one end's anchor. Returns false for non-edges.
    pub fn set_anchor(&mut self, end: EdgeEnd, anchor: Option<Anchor>) -> bool {
        match (&mut self.connections, end) {
            (Connections::Edge { from, .. }, EdgeEnd::From) => *from = anchor,
            (Connections::Edge { to, .. }, EdgeEnd::To) => *to = anchor,
            (Connections::Node { .. }, _) => return false,
        }
        true
    }

    /// Ends of this edge bound to `shape_id`.
    #[must_use]
    pub fn ends_bound_to(&self, shape_id: ShapeId) -> Vec<EdgeEnd> {
        [EdgeEnd::From, EdgeEnd::To]
            .into_iter()
            .filter(|end| self.anchor(*end).is_some_and(|a| a.shape_id == shape_id))
            .collect()
    }

    /// Edge ids bound to this node (empty for edges).
    #[must_use]
    pub fn edge_links(&self) -> &[ShapeId] {
        match &self.connections {
            Connections::Node { edges } => edges,
            Connections::Edge { .. } => &[],
        }
    }

    pub fn add_edge_link(&mut self, edge: ShapeId) {
        if let Connections::Node { edges } = &mut self.connections {
            if !edges.contains(&edge) {
                edges.push(edge);
            }
        }
    }

    pub fn remove_edge_link(&mut self, edge: ShapeId) -> bool {
        if let Connections::Node { edges } = &mut self.connections {
            let before = edges.len();
            edges.retain(|e| *e != edge);
            return edges.len() != before;
        }
        false
    }

    #[must_use]
    pub fn points(&self) -> Option<&[Point]> {
        self.data.geometry.points()
    }

    /// Terminal point of a path shape for the given end.
    #[must_use]
    pub fn terminal(&self, end: EdgeEnd) -> Option<Point> {
        let points = self.points()?;
        match end {
            EdgeEnd::From => points.first().copied(),
            EdgeEnd::To => points.last().copied(),
        }
    }

    /// Overwrite the terminal point for `end`. Returns false for box shapes.
    pub fn set_terminal(&mut self, end: EdgeEnd, p: Point) -> bool {
        let Some(points) = self.data.geometry.points_mut() else {
            return false;
        };
        let slot = match end {
            EdgeEnd::From => points.first_mut(),
            EdgeEnd::To => points.last_mut(),
        };
        match slot {
            Some(slot) => {
                *slot = p;
                true
            }
            None => false,
        }
    }
}
