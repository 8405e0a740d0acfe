//! Framework-agnostic engine for editing node-and-edge diagrams.
//!
//! The engine owns the document: a z-ordered store of shapes and the edges
//! that connect them, the selection, a bounded undo/redo journal, and the
//! pointer gesture state machine. It never draws. Everything visual goes
//! through the [`render::RenderHost`] capability the embedding application
//! implements, and input handlers return [`engine::Action`]s for the host to
//! react to.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::EditorSession`], the public API, and gesture handling |
//! | [`shape`] | Shape records, kinds, styles, and connection data |
//! | [`provider`] | Per-kind geometry capabilities (move, resize, bounds, ports) |
//! | [`store`] | Z-ordered shape store with copy-on-write records |
//! | [`selection`] | Ordered selection set and group expansion |
//! | [`history`] | Bounded snapshot journal for undo/redo |
//! | [`connection`] | Ports, anchoring, edge sync, and waypoint insertion |
//! | [`transform`] | Rotate/scale/flip composition and world/local mapping |
//! | [`hit`] | Hit-testing against handles, ports, and shape bodies |
//! | [`overlay`] | Cache of overlays currently shown through the host |
//! | [`clipboard`] | Copy buffer and id-remapping paste |
//! | [`layering`] | Z-order reordering |
//! | [`input`] | Input event types and the gesture state enum |
//! | [`render`] | Render host trait and the headless [`render::NullHost`] |
//! | [`document`] | JSON import/export |
//! | [`config`] | Session tunables with environment overrides |
//! | [`geometry`] | Points, rects, affine matrices, and the camera |
//! | [`consts`] | Shared numeric constants (snap radii, zoom limits, etc.) |

pub mod clipboard;
pub mod config;
pub mod connection;
pub mod consts;
pub mod document;
pub mod engine;
pub mod geometry;
pub mod hit;
pub mod history;
pub mod input;
pub mod layering;
pub mod overlay;
pub mod provider;
pub mod render;
pub mod selection;
pub mod shape;
pub mod store;
pub mod transform;

#[cfg(test)]
#[path = "fixtures_test.rs"]
pub(crate) mod fixtures;
