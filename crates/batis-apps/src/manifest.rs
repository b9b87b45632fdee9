//! Installed-file manifest
//!
//! Every file an install creates outside the application directory is
//! appended to an [`InstallLog`]. When the install finishes the log is
//! handed off by value and written to
//! `<installed app>/batis_info/installed_files.json`, which the uninstaller
//! later reads back.

use anyhow::{Context, Result};
use batis_core::types::{InstalledFile, BATIS_INFO_DIR, MANIFEST_FILENAME};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Append-only record of an install's side effects
#[derive(Debug, Default)]
pub struct InstallLog {
    entries: Vec<InstalledFile>,
}

impl InstallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_file(&mut self, path: impl Into<PathBuf>) {
        self.entries.push(InstalledFile::file(path));
    }

    pub fn record_symlink(&mut self, path: impl Into<PathBuf>) {
        self.entries.push(InstalledFile::symlink(path));
    }

    pub fn entries(&self) -> &[InstalledFile] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finish the log, giving up ownership of the records
    pub fn into_entries(self) -> Vec<InstalledFile> {
        self.entries
    }
}

/// Location of the manifest inside an installed application directory
pub fn manifest_path(app_dir: &Path) -> PathBuf {
    app_dir.join(BATIS_INFO_DIR).join(MANIFEST_FILENAME)
}

/// Whether `app_dir` carries a manifest from a previous install
pub fn has_manifest(app_dir: &Path) -> bool {
    manifest_path(app_dir).is_file()
}

/// Write the manifest of an installed application
pub fn write_manifest(app_dir: &Path, entries: &[InstalledFile]) -> Result<PathBuf> {
    let path = manifest_path(app_dir);
    let content =
        serde_json::to_string_pretty(entries).context("Failed to serialize install manifest")?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write manifest {}", path.display()))?;
    debug!("Wrote manifest with {} entries to {:?}", entries.len(), path);
    Ok(path)
}

/// Read the manifest of an installed application
pub fn read_manifest(app_dir: &Path) -> Result<Vec<InstalledFile>> {
    let path = manifest_path(app_dir);
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    let entries: Vec<InstalledFile> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse manifest {}", path.display()))?;
    debug!("Read manifest with {} entries from {:?}", entries.len(), path);
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use batis_core::types::InstalledFileKind;
    use tempfile::TempDir;

    #[test]
    fn test_log_keeps_order() {
        let mut log = InstallLog::new();
        log.record_symlink("/bin/a");
        log.record_file("/share/b.desktop");
        assert_eq!(log.len(), 2);

        let entries = log.into_entries();
        assert_eq!(entries[0].kind, InstalledFileKind::Symlink);
        assert_eq!(entries[1].path, PathBuf::from("/share/b.desktop"));
    }

    #[test]
    fn test_write_then_read() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join(BATIS_INFO_DIR)).unwrap();
        assert!(!has_manifest(temp.path()));

        let mut log = InstallLog::new();
        log.record_file("/x/y.xml");
        write_manifest(temp.path(), log.entries()).unwrap();

        assert!(has_manifest(temp.path()));
        let back = read_manifest(temp.path()).unwrap();
        assert_eq!(back, log.into_entries());
    }

    #[test]
    fn test_read_missing_manifest_fails() {
        let temp = TempDir::new().unwrap();
        assert!(read_manifest(temp.path()).is_err());
    }
}
