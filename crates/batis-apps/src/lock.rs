//! Per-application install lock
//!
//! Installs and uninstalls of the same application name take an exclusive
//! advisory lock on `<application root>/.<name>.lock` for their whole run.
//! The lock is released when the guard is dropped.

use anyhow::{Context, Result};
use fs4::fs_std::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Held exclusive lock for one application name
#[derive(Debug)]
pub struct InstallLock {
    _file: File,
    path: PathBuf,
}

impl InstallLock {
    /// Block until the lock for `name` under `application_root` is ours
    pub fn acquire(application_root: &Path, name: &str) -> Result<Self> {
        fs::create_dir_all(application_root).with_context(|| {
            format!(
                "Failed to create application directory {}",
                application_root.display()
            )
        })?;

        let path = lock_path(application_root, name);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .with_context(|| format!("Failed to open lock file {}", path.display()))?;

        debug!("Waiting for lock {:?}", path);
        file.lock_exclusive()
            .with_context(|| format!("Failed to lock {}", path.display()))?;
        debug!("Acquired lock {:?}", path);

        Ok(Self { _file: file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Location of the lock file for `name`
pub fn lock_path(application_root: &Path, name: &str) -> PathBuf {
    application_root.join(format!(".{}.lock", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_lock_is_exclusive_until_dropped() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("apps");

        let held = InstallLock::acquire(&root, "fooview").unwrap();
        assert_eq!(held.path(), root.join(".fooview.lock"));

        let acquired = Arc::new(AtomicBool::new(false));
        let waiter = {
            let root = root.clone();
            let acquired = Arc::clone(&acquired);
            std::thread::spawn(move || {
                let _lock = InstallLock::acquire(&root, "fooview").unwrap();
                acquired.store(true, Ordering::SeqCst);
            })
        };

        std::thread::sleep(Duration::from_millis(200));
        assert!(!acquired.load(Ordering::SeqCst));

        drop(held);
        waiter.join().unwrap();
        assert!(acquired.load(Ordering::SeqCst));
    }

    #[test]
    fn test_other_names_do_not_block() {
        let temp = TempDir::new().unwrap();
        let _a = InstallLock::acquire(temp.path(), "fooview").unwrap();
        let b = InstallLock::acquire(temp.path(), "barview").unwrap();
        assert_eq!(b.path(), lock_path(temp.path(), "barview"));
    }
}
