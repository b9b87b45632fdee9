//! Application uninstaller
//!
//! Removes every file recorded in an installed application's manifest,
//! rebuilds the caches those files belonged to, and only then deletes the
//! application directory (and with it the manifest).

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use batis_core::types::BATIS_INFO_DIR;
use batis_core::{Error, InstallScheme, SchemeKind};
use tracing::{debug, info};

use crate::lock::InstallLock;
use crate::manifest::read_manifest;
use crate::triggers::{
    collect_warnings, CommandRunner, PendingTriggers, SystemRunner, TriggerOutcome,
};

/// Summary of a finished uninstall
#[derive(Debug)]
pub struct UninstallReport {
    pub appdir: PathBuf,
    /// Manifest entries that were actually removed
    pub removed: usize,
    /// Failed cache rebuilds
    pub warnings: Vec<String>,
}

/// Find an installed application by directory name.
///
/// Schemes are searched in the order given; the first one with a
/// `<application root>/<name>/batis_info` directory wins.
pub fn find_installed_application_in(
    name: &str,
    schemes: &[InstallScheme],
) -> batis_core::Result<(PathBuf, InstallScheme)> {
    for scheme in schemes {
        let appdir = scheme.application_dir(name);
        if appdir.join(BATIS_INFO_DIR).is_dir() {
            debug!("Found {} in {} scheme at {:?}", name, scheme.kind, appdir);
            return Ok((appdir, scheme.clone()));
        }
    }
    Err(Error::unknown_application(name))
}

/// Find an installed application in the user scheme, then the system scheme
pub fn find_installed_application(name: &str) -> batis_core::Result<(PathBuf, InstallScheme)> {
    let schemes = SchemeKind::SEARCH_ORDER
        .iter()
        .map(|kind| InstallScheme::for_kind(*kind))
        .collect::<batis_core::Result<Vec<_>>>()?;
    find_installed_application_in(name, &schemes)
}

/// Removes one installed application
pub struct ApplicationUninstaller {
    appdir: PathBuf,
    scheme: InstallScheme,
    runner: Arc<dyn CommandRunner>,
    pending: PendingTriggers,
    removed: usize,
}

impl ApplicationUninstaller {
    pub fn new(appdir: PathBuf, scheme: InstallScheme) -> Self {
        Self {
            appdir,
            scheme,
            runner: Arc::new(SystemRunner),
            pending: PendingTriggers::default(),
            removed: 0,
        }
    }

    /// Use `runner` for cache-rebuild commands
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Caches that need rebuilding after [`remove_files`](Self::remove_files)
    pub fn pending_triggers(&self) -> &PendingTriggers {
        &self.pending
    }

    /// Remove the files the install created outside the application directory.
    ///
    /// Files that are already gone are skipped; any other failure stops the
    /// uninstall before the manifest is deleted.
    pub fn remove_files(&mut self) -> Result<()> {
        for record in read_manifest(&self.appdir)? {
            let path = &record.path;
            match fs::remove_file(path) {
                Ok(()) => debug!("Removed {:?}", path),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!("Already gone: {:?}", path);
                    continue;
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to remove {}", path.display()))
                }
            }
            self.removed += 1;
            self.classify(path);
        }
        Ok(())
    }

    /// Note which cache a removed path belonged to
    fn classify(&mut self, path: &Path) {
        if path.starts_with(&self.scheme.desktop) {
            self.pending.desktop = Some(self.scheme.desktop.clone());
        } else if path.starts_with(&self.scheme.mimetypes) {
            self.pending.mime = Some(self.scheme.mimetypes.clone());
        } else if let Ok(rest) = path.strip_prefix(&self.scheme.icons) {
            if let Some(Component::Normal(theme)) = rest.components().next() {
                self.pending
                    .icon_themes
                    .insert(theme.to_string_lossy().into_owned());
            }
        }
    }

    /// Rebuild the caches touched by the removed files
    pub fn run_triggers(&mut self) -> Vec<TriggerOutcome> {
        self.pending.fire_all(self.runner.as_ref())
    }

    /// Delete the application directory, manifest included
    pub fn remove_appdir(&self) -> Result<()> {
        fs::remove_dir_all(&self.appdir)
            .with_context(|| format!("Failed to remove {}", self.appdir.display()))
    }

    /// Remove files, run triggers, then remove the application directory
    pub fn run(mut self) -> Result<UninstallReport> {
        self.remove_files()?;
        let outcomes = self.run_triggers();
        self.remove_appdir()?;
        info!("Uninstalled {}", self.appdir.display());

        Ok(UninstallReport {
            appdir: self.appdir,
            removed: self.removed,
            warnings: collect_warnings(&outcomes),
        })
    }
}

/// Uninstall the application called `name` from the first scheme that has it
pub fn uninstall_application(
    name: &str,
    schemes: &[InstallScheme],
    runner: Arc<dyn CommandRunner>,
) -> Result<UninstallReport> {
    let (appdir, scheme) = find_installed_application_in(name, schemes)?;
    let _lock = InstallLock::acquire(&scheme.application, name)?;
    ApplicationUninstaller::new(appdir, scheme)
        .with_runner(runner)
        .run()
}
