//! Attribute tree helpers.
//!
//! A tree node is a plain string-keyed JSON object; nested objects are
//! themselves tree nodes, enabling uniform traversal. No path logic lives
//! here; dotted-path decomposition is the store's responsibility.

use serde_json::{Map, Value};

/// One node of an attribute tree.
pub type Tree = Map<String, Value>;

/// Insert `default` under `key` only if absent, returning the resident value.
pub fn setdefault<'a>(tree: &'a mut Tree, key: &str, default: Value) -> &'a mut Value {
    tree.entry(key.to_string()).or_insert(default)
}

/// Setdefault an empty section under `key` and view it as a tree node.
///
/// Returns `None` when the resident value is a leaf of another type; the
/// resident value is left untouched in that case.
pub fn setdefault_section<'a>(tree: &'a mut Tree, key: &str) -> Option<&'a mut Tree> {
    setdefault(tree, key, Value::Object(Map::new())).as_object_mut()
}
