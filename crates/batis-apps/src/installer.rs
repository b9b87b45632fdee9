//! Application installer
//!
//! Installs an application directory (or tarball) into an install scheme:
//! system packages, the application tree, command symlinks, icons, MIME
//! packages and desktop files. Every file created outside the application
//! directory is recorded, and the record is written as the installed
//! application's manifest so it can be uninstalled later.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use batis_core::types::{
    DependencyDeclaration, InstalledFile, Metadata, PackageManagerCommand, PrivilegeConfig,
    BATIS_INFO_DIR,
};
use batis_core::{InstallScheme, RuntimeConfig};
use batis_distro::DistroSelector;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::lock::InstallLock;
use crate::manifest::{self, InstallLog};
use crate::progress::{InstallStep, StepProblem, StepReporter};
use crate::tarball::{unpack_app_tarball, UnpackedApp};
use crate::triggers::{collect_warnings, CommandRunner, SystemRunner, Trigger, TriggerOutcome};
use crate::uninstaller::ApplicationUninstaller;
use crate::verifier::is_icon_size;

/// Token in desktop files replaced by the installed application directory
pub const INSTALL_DIR_PLACEHOLDER: &str = "{{INSTALL_DIR}}";

/// Why installing system packages did not work out
pub const NO_DISTRO_MATCH: &str = "no distro match";
pub const INSTALL_FAILED: &str = "install failed";

/// Summary of a finished install
#[derive(Debug)]
pub struct InstallReport {
    /// Directory the application was copied to
    pub install_dir: PathBuf,
    /// Files created outside the application directory, as written to the manifest
    pub manifest: Vec<InstalledFile>,
    /// Soft failures of individual steps
    pub problems: Vec<StepProblem>,
    /// Warnings to show the user, e.g. failed cache rebuilds
    pub warnings: Vec<String>,
}

/// Installs one application into one scheme
pub struct ApplicationInstaller {
    /// Directory containing `batis_info`
    source: PathBuf,
    /// Keeps an unpacked tarball alive while installing from it
    _unpacked: Option<UnpackedApp>,
    scheme: InstallScheme,
    metadata: Metadata,
    log: InstallLog,
    runner: Arc<dyn CommandRunner>,
    distro: Option<DistroSelector>,
    package_managers: Vec<PackageManagerCommand>,
    privilege: PrivilegeConfig,
    trigger_outcomes: Vec<TriggerOutcome>,
    warnings: Vec<String>,
}

impl ApplicationInstaller {
    /// Prepare to install the tarball or directory at `path`
    pub fn new(path: &Path, scheme: InstallScheme, config: &RuntimeConfig) -> Result<Self> {
        let (source, unpacked) = if path.is_file() {
            let unpacked = unpack_app_tarball(path)?;
            (unpacked.path().to_path_buf(), Some(unpacked))
        } else {
            let source = fs::canonicalize(path)
                .with_context(|| format!("Application directory not found: {}", path.display()))?;
            (source, None)
        };

        let metadata = Metadata::load(&source).with_context(|| {
            format!(
                "Failed to read {}/metadata.json in {}",
                BATIS_INFO_DIR,
                source.display()
            )
        })?;

        Ok(Self {
            source,
            _unpacked: unpacked,
            scheme,
            metadata,
            log: InstallLog::new(),
            runner: Arc::new(SystemRunner),
            distro: None,
            package_managers: config.package_managers.clone(),
            privilege: config.privilege.clone(),
            trigger_outcomes: Vec::new(),
            warnings: Vec::new(),
        })
    }

    /// Use `runner` for cache-rebuild commands
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Use an already detected distro instead of probing the system
    pub fn with_distro(mut self, distro: DistroSelector) -> Self {
        self.distro = Some(distro);
        self
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Name of the installed application directory
    pub fn app_dir_name(&self) -> Result<String> {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("{} has no directory name", self.source.display()))
    }

    /// Where the application directory is installed
    pub fn install_dir(&self) -> Result<PathBuf> {
        Ok(self.scheme.application_dir(&self.app_dir_name()?))
    }

    fn relative(&self, parts: &[&str]) -> PathBuf {
        parts
            .iter()
            .fold(self.source.clone(), |path, part| path.join(part))
    }

    fn fire(&mut self, trigger: Trigger) {
        let outcome = trigger.fire(self.runner.as_ref());
        self.trigger_outcomes.push(outcome);
    }

    /// Copy a file to `destination`, replacing whatever is there
    pub fn install_file(&mut self, src: &Path, destination: &Path) -> Result<()> {
        prepare_destination(destination)?;
        fs::copy(src, destination).with_context(|| {
            format!(
                "Failed to copy {} to {}",
                src.display(),
                destination.display()
            )
        })?;
        self.log.record_file(destination);
        Ok(())
    }

    /// Create a symlink at `destination` pointing to `src`, replacing whatever is there
    pub fn install_symlink(&mut self, src: &Path, destination: &Path) -> Result<()> {
        prepare_destination(destination)?;
        std::os::unix::fs::symlink(src, destination).with_context(|| {
            format!(
                "Failed to link {} to {}",
                destination.display(),
                src.display()
            )
        })?;
        self.log.record_symlink(destination);
        Ok(())
    }

    /// Install the distro packages the application depends on.
    ///
    /// Returns the reason when this did not work; the install carries on.
    pub fn install_system_packages(&mut self, backend: bool) -> Result<Option<String>> {
        let Some(deps) = DependencyDeclaration::resolve(&self.source, &self.metadata)? else {
            debug!("No system packages declared; skipping");
            return Ok(None);
        };

        info!("Installing system packages");
        let distro = match self.distro.take() {
            Some(distro) => distro,
            None => DistroSelector::detect(&self.package_managers)?,
        };

        let Some(spec) = distro.select_dependencies_spec(&deps.candidates) else {
            let message = format!(
                "Couldn't find dependencies for this distro. Please ensure these are installed: {}",
                deps.description
            );
            warn!("{}", message);
            self.warnings.push(message);
            self.distro = Some(distro);
            return Ok(Some(NO_DISTRO_MATCH.to_string()));
        };

        info!("Packages to install: {:?}", spec.packages);
        let sudo_cmd = if backend {
            &self.privilege.backend_sudo_command
        } else {
            &self.privilege.sudo_command
        };

        let succeeded = match distro.install_packages(&spec.packages, sudo_cmd, backend) {
            Ok(output) => output.success(),
            Err(e) => {
                warn!("Could not run the package manager: {:#}", e);
                false
            }
        };
        self.distro = Some(distro);

        if succeeded {
            Ok(None)
        } else {
            let message = format!(
                "Installing dependencies failed. Please ensure these are installed: {}",
                deps.description
            );
            warn!("{}", message);
            self.warnings.push(message);
            Ok(Some(INSTALL_FAILED.to_string()))
        }
    }

    /// Copy the application tree into the scheme's application directory.
    ///
    /// A previous install with a manifest is uninstalled first; a directory
    /// without one is deleted.
    pub fn copy_application(&mut self) -> Result<()> {
        let destination = self.install_dir()?;

        if destination.is_dir() {
            if manifest::has_manifest(&destination) {
                info!(
                    "Removing previously installed application at {}",
                    destination.display()
                );
                let report =
                    ApplicationUninstaller::new(destination.clone(), self.scheme.clone())
                        .with_runner(Arc::clone(&self.runner))
                        .run()?;
                self.warnings.extend(report.warnings);
            } else {
                warn!("Removing existing directory {}", destination.display());
                fs::remove_dir_all(&destination).with_context(|| {
                    format!("Failed to remove {}", destination.display())
                })?;
            }
        } else if destination.symlink_metadata().is_ok() {
            warn!("Replacing file at {}", destination.display());
            fs::remove_file(&destination)?;
        }

        info!("Copying application directory to {}", destination.display());
        copy_tree(&self.source, &destination)
    }

    /// Symlink each declared command into the commands directory
    pub fn install_commands(&mut self) -> Result<()> {
        info!(
            "Symlinking commands to {}",
            self.scheme.commands.display()
        );
        let install_dir = self.install_dir()?;
        for command in self.metadata.commands.clone() {
            let target = install_dir.join(&command.target);
            let link = self.scheme.commands.join(&command.name);
            self.install_symlink(&target, &link)?;
        }
        Ok(())
    }

    /// Copy `batis_info/icons/<theme>/<NxN>/<context>/*` into the icon tree
    pub fn install_icons(&mut self) -> Result<()> {
        let icon_dir = self.relative(&[BATIS_INFO_DIR, "icons"]);
        if !icon_dir.is_dir() {
            info!("No icons to install");
            return Ok(());
        }

        info!("Installing icons");
        for (theme, theme_dir) in sorted_subdirs(&icon_dir)? {
            for (size, size_dir) in sorted_subdirs(&theme_dir)? {
                if !is_icon_size(&size) {
                    continue;
                }
                for (context, context_dir) in sorted_subdirs(&size_dir)? {
                    for (name, file) in sorted_files(&context_dir)? {
                        let dest = self
                            .scheme
                            .icons
                            .join(&theme)
                            .join(&size)
                            .join(&context)
                            .join(name);
                        self.install_file(&file, &dest)?;
                    }
                }
            }
            self.fire(Trigger::IconCache(theme));
        }
        Ok(())
    }

    /// Copy `batis_info/mime/*.xml` into the MIME packages directory
    pub fn install_mimetypes(&mut self) -> Result<()> {
        let mime_dir = self.relative(&[BATIS_INFO_DIR, "mime"]);
        let files = files_with_extension(&mime_dir, "xml")?;
        for (name, file) in &files {
            info!("Installing mimetype package file {}", file.display());
            let dest = self.scheme.mime_packages().join(name);
            self.install_file(file, &dest)?;
        }

        if !files.is_empty() {
            self.fire(Trigger::MimeDatabase(self.scheme.mimetypes.clone()));
        }
        Ok(())
    }

    /// Copy `batis_info/desktop/*.desktop`, filling in the install directory
    pub fn install_desktop_files(&mut self) -> Result<()> {
        let install_dir = self.install_dir()?;
        let install_dir = install_dir.to_string_lossy();
        let desktop_dir = self.relative(&[BATIS_INFO_DIR, "desktop"]);
        let files = files_with_extension(&desktop_dir, "desktop")?;

        for (name, file) in &files {
            info!("Installing desktop file {}", file.display());
            let dest = self.scheme.desktop.join(name);
            self.install_file(file, &dest)?;

            let contents = fs::read_to_string(&dest)
                .with_context(|| format!("Failed to read {}", dest.display()))?;
            fs::write(&dest, contents.replace(INSTALL_DIR_PLACEHOLDER, &install_dir))
                .with_context(|| format!("Failed to write {}", dest.display()))?;
        }

        if !files.is_empty() {
            self.fire(Trigger::DesktopDatabase(self.scheme.desktop.clone()));
        }
        Ok(())
    }

    /// Write the install log as the installed application's manifest
    pub fn write_manifest(&mut self) -> Result<Vec<InstalledFile>> {
        let entries = std::mem::take(&mut self.log).into_entries();
        manifest::write_manifest(&self.install_dir()?, &entries)?;
        Ok(entries)
    }

    /// Run every step in order, holding the application's install lock
    pub fn install(mut self, reporter: &mut StepReporter) -> Result<InstallReport> {
        let dir_name = self.app_dir_name()?;
        let _lock = InstallLock::acquire(&self.scheme.application, &dir_name)?;
        let backend = reporter.is_backend();
        let mut problems = Vec::new();

        reporter.step(InstallStep::SystemPackages);
        if let Some(reason) = self.install_system_packages(backend)? {
            let problem = StepProblem {
                step: InstallStep::SystemPackages,
                reason,
            };
            reporter.problem(&problem);
            problems.push(problem);
        }

        reporter.step(InstallStep::CopyDir);
        self.copy_application()?;

        reporter.step(InstallStep::InstallCommands);
        self.install_commands()?;

        reporter.step(InstallStep::InstallIcons);
        self.install_icons()?;

        reporter.step(InstallStep::InstallMimetypes);
        self.install_mimetypes()?;

        reporter.step(InstallStep::InstallDesktop);
        self.install_desktop_files()?;

        reporter.step(InstallStep::WriteManifest);
        let manifest = self.write_manifest()?;

        reporter.finished();

        let mut warnings = self.warnings;
        warnings.extend(collect_warnings(&self.trigger_outcomes));

        Ok(InstallReport {
            install_dir: self.scheme.application_dir(&dir_name),
            manifest,
            problems,
            warnings,
        })
    }
}

/// Create the parent directory and clear whatever sits at `destination`
fn prepare_destination(destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    if destination.symlink_metadata().is_ok() {
        warn!("Replacing file at {}", destination.display());
        fs::remove_file(destination)
            .with_context(|| format!("Failed to remove {}", destination.display()))?;
    }
    Ok(())
}

/// Recursively copy `src` to `dest`, keeping symlinks as symlinks
fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.with_context(|| format!("Failed to walk {}", src.display()))?;
        let relative = entry.path().strip_prefix(src)?;
        let target = dest.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create {}", target.display()))?;
        } else if file_type.is_symlink() {
            let link = fs::read_link(entry.path())?;
            std::os::unix::fs::symlink(&link, &target)
                .with_context(|| format!("Failed to create symlink {}", target.display()))?;
        } else {
            fs::copy(entry.path(), &target).with_context(|| {
                format!(
                    "Failed to copy {} to {}",
                    entry.path().display(),
                    target.display()
                )
            })?;
        }
    }
    Ok(())
}

fn sorted_children(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut children = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let entry = entry?;
        children.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
    }
    children.sort();
    Ok(children)
}

fn sorted_subdirs(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    Ok(sorted_children(dir)?
        .into_iter()
        .filter(|(_, path)| path.is_dir())
        .collect())
}

fn sorted_files(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    Ok(sorted_children(dir)?
        .into_iter()
        .filter(|(_, path)| path.is_file())
        .collect())
}

/// Files in `dir` with the given extension; nothing if `dir` is missing
fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<(String, PathBuf)>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    Ok(sorted_files(dir)?
        .into_iter()
        .filter(|(_, path)| path.extension().is_some_and(|e| e == extension))
        .collect())
}
