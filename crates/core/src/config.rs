//! Configuration path utilities for gcp-vm-manager.
//!
//! This module provides functions for resolving the project cache file path
//! and the external tool used for every provider call.

/// Default path for the project/VM cache file
const DEFAULT_CONFIG_PATH: &str = "~/.gcp-vm-manager/config.json";

/// Default provider CLI executable
pub const DEFAULT_GCLOUD: &str = "gcloud";

/// HTTP client used for Cloud Run debug endpoints
pub const CURL: &str = "curl";

/// Version shown in the header and by `--version`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Resolves the configuration file path.
///
/// If a custom path is provided, uses that path. Otherwise, uses the default
/// configuration path. Shell expansions like `~` are resolved.
///
/// # Arguments
///
/// * `config_path_arg` - Optional custom configuration file path
///
/// # Returns
///
/// The resolved path to the configuration file
///
/// # Examples
///
/// ```
/// use gcp_vm_manager_core::config::get_config_path;
///
/// // Use default path
/// let default_path = get_config_path(&None);
///
/// // Use custom path
/// let custom_path = get_config_path(&Some("/path/to/config.json".to_string()));
/// assert_eq!(custom_path, "/path/to/config.json");
/// ```
pub fn get_config_path(config_path_arg: &Option<String>) -> String {
    let config_path = match config_path_arg {
        Some(config_path) => config_path,
        None => DEFAULT_CONFIG_PATH,
    };

    shellexpand::tilde(config_path).to_string()
}

/// Resolves the provider CLI executable, expanding `~` if given.
pub fn get_gcloud_tool(gcloud_arg: &Option<String>) -> String {
    match gcloud_arg {
        Some(tool) if !tool.trim().is_empty() => shellexpand::tilde(tool.trim()).to_string(),
        _ => DEFAULT_GCLOUD.to_string(),
    }
}
