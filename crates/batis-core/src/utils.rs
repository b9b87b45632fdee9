//! Shared utility functions for Batis crates

use anyhow::anyhow;
use std::path::PathBuf;

/// Get the user's home directory
///
/// Prefers the HOME environment variable over dirs::home_dir() so that
/// tests and sandboxed sessions can point installs somewhere else.
pub fn get_home_dir() -> anyhow::Result<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        if !home.is_empty() {
            return Ok(PathBuf::from(home));
        }
    }

    dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))
}

/// `$XDG_DATA_HOME`, or `~/.local/share` when unset or empty
pub fn xdg_data_home() -> anyhow::Result<PathBuf> {
    match std::env::var("XDG_DATA_HOME") {
        Ok(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => Ok(get_home_dir()?.join(".local").join("share")),
    }
}
