//! Hierarchical configuration store with JSON persistence.
//!
//! One mutable tree of current option values is layered over a canonical
//! defaults tree. Options are addressed with dotted path strings
//! (e.g. `routers.mycoolrouter.type`), persisted as a single JSON document,
//! migrated from legacy key names on load, and extended at runtime by
//! provider namespaces registering their own option sub-trees.

pub mod coerce;
pub mod defaults;
pub mod error;
pub mod migrate;
pub mod paths;
pub mod store;
pub mod tree;

pub use error::{CoercionError, ConfigError, ConfigResult};
pub use store::{ConfigurationStore, DiscardedOption, LoadResult};

/// Version string written into persisted configuration files.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
