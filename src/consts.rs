//! Shared numeric constants for the diagram engine.
//!
//! Values that hosts may want to tune live in [`crate::config::EditorConfig`];
//! the constants here are its defaults plus fixed limits.

// ── Connections ─────────────────────────────────────────────────

/// Maximum distance (world units) between a release point and a port for the
/// port to capture a connector end.
pub const PORT_SNAP_DISTANCE: f64 = 14.0;

/// Distance within which an inserted connector waypoint snaps onto a port.
pub const WAYPOINT_SNAP_DISTANCE: f64 = 10.0;

/// Distance within which an inserted waypoint aligns to a neighbour's axis.
pub const ALIGN_DISTANCE: f64 = 6.0;

// ── History / clipboard ─────────────────────────────────────────

/// Maximum number of snapshots retained by the history stack.
pub const HISTORY_LIMIT: usize = 50;

/// Offset applied to both axes of pasted shapes.
pub const PASTE_OFFSET: f64 = 20.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit radius in pixels for resize, corner, and connector handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Screen-space slop in pixels for thin path bodies.
pub const HIT_TOLERANCE_PX: f64 = 6.0;

// ── Limits ──────────────────────────────────────────────────────

/// Smallest width or height a resize may produce.
pub const MIN_SHAPE_SIZE: f64 = 1.0;

/// Lower bound for a shape's uniform scale factor.
pub const MIN_SCALE: f64 = 0.1;

/// Upper bound for a shape's uniform scale factor.
pub const MAX_SCALE: f64 = 10.0;

/// Lower bound for the canvas zoom.
pub const MIN_ZOOM: f64 = 0.1;

/// Upper bound for the canvas zoom.
pub const MAX_ZOOM: f64 = 8.0;

/// Largest shape id a document may carry. Ids stay exact in any JSON number
/// reader and leave room for every id the session hands out afterwards.
pub const MAX_SHAPE_ID: u64 = (1 << 53) - 1;

/// Tolerance for treating two floats as equal.
pub const EPSILON: f64 = 1e-9;
