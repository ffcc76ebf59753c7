//! Migration of persisted values from earlier versions.
//!
//! Rules are keyed on key presence, never on a stored schema version, and
//! run once against the raw loaded mapping before the merge.

use crate::tree::Tree;

/// Apply all legacy-key migrations to a freshly loaded mapping.
pub fn migrate(values: &mut Tree) {
    // 'tilesource' renamed to 'basemap' in 0.18.
    if !values.contains_key("basemap")
        && let Some(value) = values.remove("tilesource")
    {
        values.insert("basemap".to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> Tree {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_tilesource_renamed_to_basemap() {
        let mut values = tree(json!({"tilesource": "osm"}));
        migrate(&mut values);
        assert_eq!(values.get("basemap"), Some(&json!("osm")));
        assert!(!values.contains_key("tilesource"));
    }

    #[test]
    fn test_existing_basemap_wins() {
        let mut values = tree(json!({"tilesource": "osm", "basemap": "stamen"}));
        migrate(&mut values);
        assert_eq!(values.get("basemap"), Some(&json!("stamen")));
        // The legacy key stays behind as an ordinary unknown key.
        assert_eq!(values.get("tilesource"), Some(&json!("osm")));
    }

    #[test]
    fn test_no_legacy_keys_is_a_no_op() {
        let mut values = tree(json!({"zoom": 12}));
        migrate(&mut values);
        assert_eq!(values, tree(json!({"zoom": 12})));
    }
}
