// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

pub const ENV_FEEDVAULT_CONFIG: &str = "FEEDVAULT_CONFIG";
pub const ENV_FEEDVAULT_BASE_URL: &str = "FEEDVAULT_BASE_URL";
pub const ENV_FEEDVAULT_PAGE_SIZE: &str = "FEEDVAULT_PAGE_SIZE";
pub const ENV_FEEDVAULT_LOG_JSON: &str = "FEEDVAULT_LOG_JSON";

/// `FEEDVAULT_CONFIG`, then XDG, then `$HOME/.config`, then `.feedvault/`
/// under the working directory.
#[must_use]
pub fn resolve_feedvault_config_path() -> PathBuf {
    resolve_config_path_with(|key| std::env::var(key).ok())
}

fn resolve_config_path_with<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| {
        lookup(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    if let Some(explicit) = non_empty(ENV_FEEDVAULT_CONFIG) {
        return PathBuf::from(explicit);
    }
    if let Some(xdg_config_home) = non_empty("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg_config_home)
            .join("feedvault")
            .join("config.toml");
    }
    if let Some(home) = non_empty("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join("feedvault")
            .join("config.toml");
    }
    PathBuf::from(".feedvault").join("config.toml")
}
