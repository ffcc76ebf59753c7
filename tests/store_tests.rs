//! Integration tests for reading and writing persisted configuration.
//!
//! Exercises the full load pipeline (migration, comment filtering,
//! validated merge) and the best-effort write path against temp dirs.

use poor_maps_config::{ConfigurationStore, LoadResult, VERSION};
use serde_json::{Value, json};
use std::path::PathBuf;
use tempfile::TempDir;

/// Write `document` as JSON into `dir` and return its path.
fn write_config(dir: &TempDir, document: &Value) -> PathBuf {
    let path = dir.path().join("poor-maps.json");
    std::fs::write(&path, serde_json::to_string_pretty(document).unwrap()).unwrap();
    path
}

/// Read `document` into a fresh store, asserting the file merged.
fn read_into_fresh_store(document: &Value) -> ConfigurationStore {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, document);
    let mut store = ConfigurationStore::new();
    assert!(matches!(
        store.read(Some(&path)),
        LoadResult::Loaded { .. }
    ));
    store
}

mod read_tests {
    use super::*;

    #[test]
    fn merges_values_on_top_of_defaults() {
        let store = read_into_fresh_store(&json!({"zoom": 11, "auto_center": true}));
        assert_eq!(store.get("zoom").unwrap(), json!(11));
        assert!(store.get_bool("auto_center").unwrap());
        // Untouched options keep their defaults.
        assert_eq!(store.get_str("basemap").unwrap(), "mapquest_open");
    }

    #[test]
    fn coerces_values_to_the_type_of_their_default() {
        let store = read_into_fresh_store(&json!({"zoom": "18", "auto_center": "true"}));
        assert_eq!(store.get("zoom").unwrap(), json!(18));
        assert_eq!(store.get_i64("zoom").unwrap(), 18);
        assert!(store.get_bool("auto_center").unwrap());
    }

    #[test]
    fn coerces_list_elements_against_the_first_sample() {
        let store = read_into_fresh_store(&json!({"center": ["60.17", 24]}));
        assert_eq!(store.get("center").unwrap(), json!([60.17, 24.0]));
    }

    #[test]
    fn empty_list_default_skips_coercion() {
        // An empty default list carries no element-type sample, so the
        // loaded list passes through unchanged.
        let store = read_into_fresh_store(&json!({"overlays": [1, "x", true]}));
        assert_eq!(store.get("overlays").unwrap(), json!([1, "x", true]));
    }

    #[test]
    fn bad_value_is_discarded_and_load_continues() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, &json!({"zoom": "not-a-number", "auto_center": true}));
        let mut store = ConfigurationStore::new();
        let LoadResult::Loaded { discarded } = store.read(Some(&path)) else {
            panic!("expected a merged load");
        };
        assert_eq!(discarded.len(), 1);
        assert_eq!(discarded[0].path, "zoom");
        assert_eq!(discarded[0].value, json!("not-a-number"));
        assert_eq!(store.get("zoom").unwrap(), json!(15));
        assert!(store.get_bool("auto_center").unwrap());
    }

    #[test]
    fn nested_discard_reports_the_full_dotted_path() {
        let mut store = ConfigurationStore::new();
        store.register_guide("foo", json!({"radius": 500}));
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, &json!({"guides": {"foo": {"radius": "wide"}}}));
        let LoadResult::Loaded { discarded } = store.read(Some(&path)) else {
            panic!("expected a merged load");
        };
        assert_eq!(discarded.len(), 1);
        assert_eq!(discarded[0].path, "guides.foo.radius");
        assert_eq!(store.get("guides.foo.radius").unwrap(), json!(500));
    }

    #[test]
    fn migrates_tilesource_to_basemap() {
        let store = read_into_fresh_store(&json!({"tilesource": "osm"}));
        assert_eq!(store.get_str("basemap").unwrap(), "osm");
        assert!(!store.contains("tilesource"));
    }

    #[test]
    fn comment_keys_are_ignored_at_every_level() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            &json!({
                "#zoom": 3,
                "guides": {"#foo": {"type": 9}, "bar": {"type": 1}},
            }),
        );
        let mut store = ConfigurationStore::new();
        let LoadResult::Loaded { discarded } = store.read(Some(&path)) else {
            panic!("expected a merged load");
        };
        // Commented-out keys are neither merged nor reported as discarded.
        assert!(discarded.is_empty());
        assert_eq!(store.get("zoom").unwrap(), json!(15));
        assert!(!store.contains("guides.#foo"));
        assert_eq!(store.get("guides.bar.type").unwrap(), json!(1));
    }

    #[test]
    fn unknown_keys_pass_through_without_coercion() {
        let store = read_into_fresh_store(&json!({"experimental": {"flag": "1"}}));
        // No default exists, so the string is stored as-is.
        assert_eq!(store.get("experimental.flag").unwrap(), json!("1"));
    }

    #[test]
    fn registered_defaults_coerce_later_loads() {
        let mut store = ConfigurationStore::new();
        store.register_router("foo", json!({"type": 1}));
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, &json!({"routers": {"foo": {"type": "7"}}}));
        assert!(matches!(store.read(Some(&path)), LoadResult::Loaded { .. }));
        assert_eq!(store.get("routers.foo.type").unwrap(), json!(7));
    }

    #[test]
    fn loaded_values_survive_a_later_registration() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, &json!({"guides": {"foo": {"type": 2}}}));
        let mut store = ConfigurationStore::new();
        assert!(matches!(store.read(Some(&path)), LoadResult::Loaded { .. }));
        store.register_guide("foo", json!({"type": 1, "radius": 500}));
        assert_eq!(store.get("guides.foo.type").unwrap(), json!(2));
        assert_eq!(store.get("guides.foo.radius").unwrap(), json!(500));
    }

    #[test]
    fn section_over_a_leaf_is_discarded() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, &json!({"zoom": {"deep": 1}, "auto_center": true}));
        let mut store = ConfigurationStore::new();
        let LoadResult::Loaded { discarded } = store.read(Some(&path)) else {
            panic!("expected a merged load");
        };
        assert_eq!(discarded.len(), 1);
        assert_eq!(discarded[0].path, "zoom");
        assert_eq!(store.get("zoom").unwrap(), json!(15));
        assert!(store.get_bool("auto_center").unwrap());
    }

    #[test]
    fn absent_file_leaves_defaults_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("poor-maps.json");
        let mut store = ConfigurationStore::new();
        assert!(matches!(store.read(Some(&path)), LoadResult::Absent));
        assert_eq!(store.get("zoom").unwrap(), json!(15));
    }

    #[test]
    fn unparsable_file_leaves_defaults_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("poor-maps.json");
        std::fs::write(&path, "{not json").unwrap();
        let mut store = ConfigurationStore::new();
        assert!(matches!(store.read(Some(&path)), LoadResult::Invalid));
        assert_eq!(store.get("zoom").unwrap(), json!(15));
    }

    #[test]
    fn non_object_top_level_is_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("poor-maps.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        let mut store = ConfigurationStore::new();
        assert!(matches!(store.read(Some(&path)), LoadResult::Invalid));
    }
}

mod write_tests {
    use super::*;

    #[test]
    fn write_injects_the_version_field() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("poor-maps.json");
        let store = ConfigurationStore::new();
        assert!(store.write(Some(&path)));
        let content = std::fs::read_to_string(&path).unwrap();
        let document: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(document.get("version"), Some(&json!(VERSION)));
        assert_eq!(document.get("zoom"), Some(&json!(15)));
    }

    #[test]
    fn write_creates_missing_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("dirs").join("poor-maps.json");
        let store = ConfigurationStore::new();
        assert!(store.write(Some(&path)));
        assert!(path.is_file());
    }

    #[test]
    fn write_swallows_io_failures() {
        let dir = TempDir::new().unwrap();
        // The target is a directory, so the write cannot succeed.
        let store = ConfigurationStore::new();
        assert!(!store.write(Some(dir.path())));
    }

    #[test]
    fn write_then_read_round_trips_modulo_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("poor-maps.json");

        let mut original = ConfigurationStore::new();
        original.set("zoom", json!(11)).unwrap();
        original.set_add("overlays", json!("hillshade")).unwrap();
        original.set("guides.foo.type", json!(2)).unwrap();
        assert!(original.write(Some(&path)));

        let mut restored = ConfigurationStore::new();
        assert!(matches!(restored.read(Some(&path)), LoadResult::Loaded { .. }));

        let mut expected = original.values().clone();
        expected.insert("version".to_string(), json!(VERSION));
        assert_eq!(restored.values(), &expected);
        // The version field reads back as an ordinary untyped option.
        assert_eq!(restored.get_str("version").unwrap(), VERSION);
    }
}
