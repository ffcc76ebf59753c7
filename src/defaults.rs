//! Built-in option defaults.
//!
//! The defaults tree is the type authority: whatever type an option has
//! here is the type its persisted value is coerced to on load. Provider
//! namespaces (`guides.*`, `routers.*`) extend this tree at runtime
//! through the store's registration contract.

use crate::tree::Tree;
use serde_json::{Value, json};

/// Build the built-in defaults tree.
pub fn builtin() -> Tree {
    let defaults = json!({
        "allow_tile_download": true,
        "auto_center": false,
        "basemap": "mapquest_open",
        "cache_max_age": 36500, // days
        "center": [0.0, 0.0],
        "download_timeout": 10, // seconds
        "geocoder": "mapquest_nominatim",
        "gps_update_interval": 1, // seconds
        "guide": "foursquare",
        // "always", "navigating" or "never".
        "keep_alive": "navigating",
        "overlays": [],
        "router": "mapquest_open",
        "show_routing_narrative": true,
        "zoom": 15,
    });
    match defaults {
        Value::Object(tree) => tree,
        _ => unreachable!("defaults literal is an object"),
    }
}
