#![allow(clippy::float_cmp)]

use std::collections::HashMap;

use super::*;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn empty_environment_gives_defaults() {
    let config = EditorConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(config, EditorConfig::default());
    assert_eq!(config.history_limit, 50);
    assert_eq!(config.port_snap_distance, 14.0);
    assert!(config.selection_box_enabled);
}

#[test]
fn overrides_are_parsed() {
    let config = EditorConfig::from_lookup(lookup(&[
        ("DIAGRAM_HISTORY_LIMIT", "10"),
        ("DIAGRAM_PASTE_OFFSET", " 5.5 "),
        ("DIAGRAM_SELECTION_BOX", "off"),
    ]))
    .unwrap();
    assert_eq!(config.history_limit, 10);
    assert_eq!(config.paste_offset, 5.5);
    assert!(!config.selection_box_enabled);
}

#[test]
fn unparseable_number_falls_back() {
    let config = EditorConfig::from_lookup(lookup(&[("DIAGRAM_PORT_SNAP_DISTANCE", "near")])).unwrap();
    assert_eq!(config.port_snap_distance, 14.0);
}

#[test]
fn invalid_bool_is_an_error() {
    let err = EditorConfig::from_lookup(lookup(&[("DIAGRAM_SELECTION_BOX", "maybe")])).unwrap_err();
    assert_eq!(err, ConfigError::InvalidBool { var: "DIAGRAM_SELECTION_BOX", value: "maybe".into() });
}

#[test]
fn zero_history_limit_is_rejected() {
    let err = EditorConfig::from_lookup(lookup(&[("DIAGRAM_HISTORY_LIMIT", "0")])).unwrap_err();
    assert_eq!(err, ConfigError::ZeroHistoryLimit);
}
