//! Configuration home discovery.

use std::path::PathBuf;

/// Environment variable overriding the configuration home directory.
pub const CONFIG_HOME_ENV: &str = "POOR_MAPS_CONFIG_HOME";

/// Name of the persisted configuration file.
pub const CONFIG_FILE_NAME: &str = "poor-maps.json";

/// The configuration home directory.
///
/// `$POOR_MAPS_CONFIG_HOME` if set, else `poor-maps` under the per-user
/// configuration directory, else the current directory as a last resort.
pub fn config_home() -> PathBuf {
    std::env::var(CONFIG_HOME_ENV)
        .ok()
        .map(PathBuf::from)
        .or_else(|| dirs::config_dir().map(|dir| dir.join("poor-maps")))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Default location of the persisted configuration file.
pub fn default_config_file() -> PathBuf {
    config_home().join(CONFIG_FILE_NAME)
}
