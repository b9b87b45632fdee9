//! Installed-file records
//!
//! The manifest of an installed application is a JSON array of these
//! records, stored at `batis_info/installed_files.json` inside the
//! installed application directory:
//!
//! ```json
//! [
//!   {"path": "/home/me/.local/bin/launch-fooview", "type": "symlink"},
//!   {"path": "/home/me/.local/share/applications/fooview.desktop", "type": "file"}
//! ]
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Manifest file name inside `batis_info`
pub const MANIFEST_FILENAME: &str = "installed_files.json";

/// Kind of filesystem entry an install created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstalledFileKind {
    File,
    Symlink,
    /// Anything written by another tool; removed like a file
    #[serde(other)]
    Other,
}

/// One filesystem side effect of an install
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledFile {
    /// Absolute path that was created
    pub path: PathBuf,

    #[serde(rename = "type")]
    pub kind: InstalledFileKind,
}

impl InstalledFile {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: InstalledFileKind::File,
        }
    }

    pub fn symlink(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: InstalledFileKind::Symlink,
        }
    }
}
