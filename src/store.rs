//! The configuration store.
//!
//! One mutable tree of current option values layered over a canonical
//! defaults tree. Options are addressed with dotted path strings, e.g.
//! `routers.mycoolrouter.type`. Values read from disk are migrated and
//! type-validated against the defaults before they are merged in; values
//! with no matching default pass through untouched.

use crate::coerce::coerce;
use crate::defaults;
use crate::error::{ConfigError, ConfigResult};
use crate::migrate::migrate;
use crate::paths::default_config_file;
use crate::tree::{self, Tree};
use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One option-value pair dropped during a merge, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct DiscardedOption {
    /// Full dotted path of the option.
    pub path: String,
    /// The value as it appeared in the file.
    pub value: Value,
    /// Why the value was rejected.
    pub reason: String,
}

/// Outcome of a `read` call. `read` itself never fails.
#[derive(Debug)]
pub enum LoadResult {
    /// The file was merged; the listed options were dropped individually.
    Loaded { discarded: Vec<DiscardedOption> },
    /// No file at the path; the tree is untouched.
    Absent,
    /// The file could not be read or parsed; the tree is untouched.
    Invalid,
}

/// Hierarchical store of configuration values.
///
/// Constructed once, passed by reference to every collaborator that needs
/// it. Designed for one control flow at a time; callers sharing a store
/// between threads must serialize access externally.
pub struct ConfigurationStore {
    /// Live option values.
    values: Tree,
    /// Type-authoritative defaults, including registered provider options.
    defaults: Tree,
}

impl ConfigurationStore {
    /// Create a store with both trees seeded from the built-in defaults.
    pub fn new() -> Self {
        let defaults = defaults::builtin();
        Self {
            values: defaults.clone(),
            defaults,
        }
    }

    /// The full current-value tree.
    pub fn values(&self) -> &Tree {
        &self.values
    }

    /// The full defaults tree.
    pub fn defaults(&self) -> &Tree {
        &self.defaults
    }

    /// Return a copy of the value of `option`.
    pub fn get(&self, option: &str) -> ConfigResult<Value> {
        Self::lookup(&self.values, option).cloned()
    }

    /// Return a copy of the default value of `option`.
    pub fn get_default(&self, option: &str) -> ConfigResult<Value> {
        Self::lookup(&self.defaults, option).cloned()
    }

    /// Value of a boolean option.
    pub fn get_bool(&self, option: &str) -> ConfigResult<bool> {
        Self::lookup(&self.values, option)?
            .as_bool()
            .ok_or_else(|| mismatch(option, "boolean"))
    }

    /// Value of an integer option.
    pub fn get_i64(&self, option: &str) -> ConfigResult<i64> {
        Self::lookup(&self.values, option)?
            .as_i64()
            .ok_or_else(|| mismatch(option, "integer"))
    }

    /// Value of a float option. Integer values widen.
    pub fn get_f64(&self, option: &str) -> ConfigResult<f64> {
        Self::lookup(&self.values, option)?
            .as_f64()
            .ok_or_else(|| mismatch(option, "float"))
    }

    /// Value of a string option.
    pub fn get_str(&self, option: &str) -> ConfigResult<String> {
        Self::lookup(&self.values, option)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch(option, "string"))
    }

    /// Whether `option` resolves to a value in the current tree.
    pub fn contains(&self, option: &str) -> bool {
        Self::lookup(&self.values, option).is_ok()
    }

    /// Set the value of `option`, creating missing sections on demand.
    ///
    /// The path does not need to exist in the defaults tree and no
    /// coercion is applied; coercion only happens on `read`.
    pub fn set(&mut self, option: &str, value: Value) -> ConfigResult<()> {
        let segments: Vec<&str> = option.split('.').collect();
        let Some((name, sections)) = segments.split_last() else {
            return Err(ConfigError::PathNotFound {
                path: option.to_string(),
            });
        };
        let mut node = &mut self.values;
        for (i, section) in sections.iter().enumerate() {
            node = tree::setdefault_section(node, section).ok_or_else(|| {
                ConfigError::NotASection {
                    path: segments[..=i].join("."),
                }
            })?;
        }
        node.insert((*name).to_string(), value);
        Ok(())
    }

    /// Append `item` to the list at `option` unless an equal element exists.
    pub fn set_add(&mut self, option: &str, item: Value) -> ConfigResult<()> {
        let list = Self::lookup_list_mut(&mut self.values, option)?;
        if !list.contains(&item) {
            list.push(item);
        }
        Ok(())
    }

    /// Whether the list at `option` contains an element equal to `item`.
    pub fn set_contains(&self, option: &str, item: &Value) -> ConfigResult<bool> {
        let list = Self::lookup(&self.values, option)?
            .as_array()
            .ok_or_else(|| ConfigError::NotAList {
                path: option.to_string(),
            })?;
        Ok(list.contains(item))
    }

    /// Remove the first element equal to `item` from the list at `option`.
    ///
    /// A no-op when no equal element is present.
    pub fn set_remove(&mut self, option: &str, item: &Value) -> ConfigResult<()> {
        let list = Self::lookup_list_mut(&mut self.values, option)?;
        if let Some(position) = list.iter().position(|element| element == item) {
            list.remove(position);
        }
        Ok(())
    }

    /// Add configuration `values` for guide `name` where missing.
    ///
    /// e.g. registering `{"type": 1}` for guide `foo` makes the option
    /// available as `guides.foo.type`. Keys already present in either
    /// tree, whether from an earlier load or an earlier registration, are
    /// preserved.
    pub fn register_guide(&mut self, name: &str, values: Value) {
        self.register("guides", name, values);
    }

    /// Add configuration `values` for router `name` where missing.
    ///
    /// e.g. registering `{"type": 1}` for router `foo` makes the option
    /// available as `routers.foo.type`.
    pub fn register_router(&mut self, name: &str, values: Value) {
        self.register("routers", name, values);
    }

    fn register(&mut self, namespace: &str, name: &str, values: Value) {
        let mut entry = Map::new();
        entry.insert(name.to_string(), values);
        let mut incoming = Map::new();
        incoming.insert(namespace.to_string(), Value::Object(entry));
        register_missing(&incoming, &mut self.values, &mut self.defaults);
    }

    /// Read and merge persisted option values from the JSON file at `path`.
    ///
    /// Defaults to the file under the configuration home. A missing,
    /// unreadable or unparsable file leaves the tree untouched. A value
    /// that cannot be coerced to the type of its default is dropped on its
    /// own while the rest of the file is still merged; every drop is
    /// logged and reported in the returned [`LoadResult`].
    pub fn read(&mut self, path: Option<&Path>) -> LoadResult {
        let path = resolve_path(path);
        if !path.is_file() {
            debug!("no configuration file at {}", path.display());
            return LoadResult::Absent;
        }
        let mut document = match load_document(&path) {
            Ok(document) => document,
            Err(error) => {
                warn!("ignoring configuration file {}: {:#}", path.display(), error);
                return LoadResult::Invalid;
            }
        };
        migrate(&mut document);
        let mut discarded = Vec::new();
        merge(&document, &mut self.values, &mut self.defaults, "", &mut discarded);
        for item in &discarded {
            warn!(
                "discarding bad option-value pair ({}, {}): {}",
                item.path, item.value, item.reason
            );
        }
        LoadResult::Loaded { discarded }
    }

    /// Write the current option values as JSON to the file at `path`.
    ///
    /// Defaults to the file under the configuration home, creating parent
    /// directories as needed. A top-level `"version"` field is added with
    /// the running version string. Best effort: failures are logged and
    /// swallowed so that a shutdown or checkpoint never turns into a
    /// crash. Returns whether the file was written.
    pub fn write(&self, path: Option<&Path>) -> bool {
        let path = resolve_path(path);
        let mut document = self.values.clone();
        document.insert(
            "version".to_string(),
            Value::String(crate::VERSION.to_string()),
        );
        match store_document(&document, &path) {
            Ok(()) => true,
            Err(error) => {
                warn!(
                    "failed to write configuration to {}: {:#}",
                    path.display(),
                    error
                );
                false
            }
        }
    }

    /// Walk `root` down to the value at a dotted option path.
    fn lookup<'a>(root: &'a Tree, option: &str) -> ConfigResult<&'a Value> {
        let segments: Vec<&str> = option.split('.').collect();
        let Some((name, sections)) = segments.split_last() else {
            return Err(ConfigError::PathNotFound {
                path: option.to_string(),
            });
        };
        let mut node = root;
        for (i, section) in sections.iter().enumerate() {
            let child = node.get(*section).ok_or_else(|| ConfigError::PathNotFound {
                path: segments[..=i].join("."),
            })?;
            node = child.as_object().ok_or_else(|| ConfigError::NotASection {
                path: segments[..=i].join("."),
            })?;
        }
        node.get(*name).ok_or_else(|| ConfigError::PathNotFound {
            path: option.to_string(),
        })
    }

    /// Mutable variant of [`Self::lookup`].
    fn lookup_mut<'a>(root: &'a mut Tree, option: &str) -> ConfigResult<&'a mut Value> {
        let segments: Vec<&str> = option.split('.').collect();
        let Some((name, sections)) = segments.split_last() else {
            return Err(ConfigError::PathNotFound {
                path: option.to_string(),
            });
        };
        let mut node = root;
        for (i, section) in sections.iter().enumerate() {
            let child = node
                .get_mut(*section)
                .ok_or_else(|| ConfigError::PathNotFound {
                    path: segments[..=i].join("."),
                })?;
            node = child.as_object_mut().ok_or_else(|| ConfigError::NotASection {
                path: segments[..=i].join("."),
            })?;
        }
        node.get_mut(*name).ok_or_else(|| ConfigError::PathNotFound {
            path: option.to_string(),
        })
    }

    fn lookup_list_mut<'a>(root: &'a mut Tree, option: &str) -> ConfigResult<&'a mut Vec<Value>> {
        Self::lookup_mut(root, option)?
            .as_array_mut()
            .ok_or_else(|| ConfigError::NotAList {
                path: option.to_string(),
            })
    }
}

impl Default for ConfigurationStore {
    fn default() -> Self {
        Self::new()
    }
}

fn mismatch(option: &str, expected: &'static str) -> ConfigError {
    ConfigError::TypeMismatch {
        path: option.to_string(),
        expected,
    }
}

fn resolve_path(path: Option<&Path>) -> PathBuf {
    match path {
        Some(path) => path.to_path_buf(),
        None => default_config_file(),
    }
}

/// Load a JSON document as a string-keyed mapping.
fn load_document(path: &Path) -> Result<Tree> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let document: Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    match document {
        Value::Object(tree) => Ok(tree),
        _ => bail!("top level of {} is not an object", path.display()),
    }
}

/// Serialize `document` as pretty JSON, creating parent directories.
fn store_document(document: &Tree, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(document).context("failed to serialize options")?;
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Recursively insert entries from `incoming` that are missing in both trees.
fn register_missing(incoming: &Tree, values: &mut Tree, defaults: &mut Tree) {
    for (key, value) in incoming {
        if let Value::Object(children) = value {
            match (
                tree::setdefault_section(values, key),
                tree::setdefault_section(defaults, key),
            ) {
                (Some(value_section), Some(default_section)) => {
                    register_missing(children, value_section, default_section);
                }
                // A collaborator already stored a leaf here; the resident
                // value wins and the sub-tree below it is skipped.
                _ => debug!("not registering below non-section key '{}'", key),
            }
        } else {
            tree::setdefault(values, key, value.clone());
            tree::setdefault(defaults, key, value.clone());
        }
    }
}

/// Merge loaded `incoming` values into `values`, validated against `defaults`.
///
/// Coercion failures and mismatched section nodes discard the single
/// offending option and the merge continues.
fn merge(
    incoming: &Tree,
    values: &mut Tree,
    defaults: &mut Tree,
    prefix: &str,
    discarded: &mut Vec<DiscardedOption>,
) {
    for (key, value) in incoming {
        // Options commented out by hand are ignored entirely.
        if key.starts_with('#') {
            continue;
        }
        let path = join_path(prefix, key);
        if let Value::Object(children) = value {
            match (
                tree::setdefault_section(values, key),
                tree::setdefault_section(defaults, key),
            ) {
                (Some(value_section), Some(default_section)) => {
                    merge(children, value_section, default_section, &path, discarded);
                }
                _ => discarded.push(DiscardedOption {
                    path,
                    value: value.clone(),
                    reason: "existing option is not a section".to_string(),
                }),
            }
        } else {
            let value = match defaults.get(key) {
                Some(reference) => match coerce(value, reference) {
                    Ok(coerced) => coerced,
                    Err(error) => {
                        discarded.push(DiscardedOption {
                            path,
                            value: value.clone(),
                            reason: error.to_string(),
                        });
                        continue;
                    }
                },
                None => value.clone(),
            };
            values.insert(key.clone(), value);
        }
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}
