//! Editor configuration with environment overrides.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::consts::{
    ALIGN_DISTANCE, HANDLE_RADIUS_PX, HISTORY_LIMIT, HIT_TOLERANCE_PX, PASTE_OFFSET, PORT_SNAP_DISTANCE,
    WAYPOINT_SNAP_DISTANCE,
};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a boolean, got '{value}'")]
    InvalidBool { var: &'static str, value: String },
    #[error("history limit must be at least 1")]
    ZeroHistoryLimit,
}

/// Tunables for one editor session.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Max distance for a released connector end to capture a port.
    pub port_snap_distance: f64,
    pub history_limit: usize,
    /// Offset applied to pasted shapes on both axes.
    pub paste_offset: f64,
    pub waypoint_snap_distance: f64,
    pub align_distance: f64,
    /// Handle hit radius in screen pixels.
    pub handle_radius_px: f64,
    /// Path stroke hit slop in screen pixels.
    pub hit_tolerance_px: f64,
    /// Pointer-down on empty canvas starts a box selection.
    pub selection_box_enabled: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            port_snap_distance: PORT_SNAP_DISTANCE,
            history_limit: HISTORY_LIMIT,
            paste_offset: PASTE_OFFSET,
            waypoint_snap_distance: WAYPOINT_SNAP_DISTANCE,
            align_distance: ALIGN_DISTANCE,
            handle_radius_px: HANDLE_RADIUS_PX,
            hit_tolerance_px: HIT_TOLERANCE_PX,
            selection_box_enabled: true,
        }
    }
}

impl EditorConfig {
    /// Build config from environment variables, falling back to defaults.
    ///
    /// Optional:
    /// - `DIAGRAM_PORT_SNAP_DISTANCE`: default 14
    /// - `DIAGRAM_HISTORY_LIMIT`: default 50
    /// - `DIAGRAM_PASTE_OFFSET`: default 20
    /// - `DIAGRAM_WAYPOINT_SNAP_DISTANCE`: default 10
    /// - `DIAGRAM_ALIGN_DISTANCE`: default 6
    /// - `DIAGRAM_SELECTION_BOX`: `true` (default) or `false`
    ///
    /// # Errors
    ///
    /// Returns an error for a non-boolean `DIAGRAM_SELECTION_BOX` or a zero history limit.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EditorConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// See [`EditorConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let history_limit = parse_or(&lookup, "DIAGRAM_HISTORY_LIMIT", defaults.history_limit);
        if history_limit == 0 {
            return Err(ConfigError::ZeroHistoryLimit);
        }
        Ok(Self {
            port_snap_distance: parse_or(&lookup, "DIAGRAM_PORT_SNAP_DISTANCE", defaults.port_snap_distance),
            history_limit,
            paste_offset: parse_or(&lookup, "DIAGRAM_PASTE_OFFSET", defaults.paste_offset),
            waypoint_snap_distance: parse_or(&lookup, "DIAGRAM_WAYPOINT_SNAP_DISTANCE", defaults.waypoint_snap_distance),
            align_distance: parse_or(&lookup, "DIAGRAM_ALIGN_DISTANCE", defaults.align_distance),
            selection_box_enabled: parse_bool(lookup("DIAGRAM_SELECTION_BOX").as_deref(), defaults.selection_box_enabled)?,
            ..defaults
        })
    }
}

fn parse_or<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    let Some(raw) = lookup(key) else {
        return default;
    };
    raw.trim().parse::<T>().unwrap_or(default)
}

fn parse_bool(raw: Option<&str>, default: bool) -> Result<bool, ConfigError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(ConfigError::InvalidBool { var: "DIAGRAM_SELECTION_BOX", value: other.to_string() }),
    }
}
