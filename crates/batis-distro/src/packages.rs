//! System package installation
//!
//! Picks the dependency spec that applies to the running distribution and
//! installs its packages with the detected package manager.

use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use batis_core::types::{
    DependencySpec, PackageManagerCommand, PACKAGES_PLACEHOLDER, PACKAGES_WSJOIN_PLACEHOLDER,
};
use batis_core::Error;
use sudo::RunningAs;
use tracing::{debug, info};

use crate::platform::{find_distro_name, find_package_manager_command};

/// Result of running the package manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInstallOutput {
    /// Captured stdout, `None` when output went to the terminal
    pub stdout: Option<String>,
    /// Captured stderr, `None` when output went to the terminal
    pub stderr: Option<String>,
    /// Exit code, `None` if the process was killed by a signal
    pub code: Option<i32>,
}

impl PackageInstallOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Detected distro and package manager, with the table they came from
#[derive(Debug, Clone)]
pub struct DistroSelector {
    distro_name: Option<String>,
    package_manager: Option<PackageManagerCommand>,
}

impl DistroSelector {
    /// Detect the distro name and the first available package manager
    pub fn detect(table: &[PackageManagerCommand]) -> Result<Self> {
        let distro_name = find_distro_name()?;
        let package_manager = find_package_manager_command(table).cloned();
        Ok(Self {
            distro_name,
            package_manager,
        })
    }

    /// Build a selector from already known values
    pub fn with_detected(
        distro_name: Option<String>,
        package_manager: Option<PackageManagerCommand>,
    ) -> Self {
        Self {
            distro_name,
            package_manager,
        }
    }

    pub fn distro_name(&self) -> Option<&str> {
        self.distro_name.as_deref()
    }

    pub fn package_manager(&self) -> Option<&PackageManagerCommand> {
        self.package_manager.as_ref()
    }

    /// Select the first candidate that applies to this system.
    ///
    /// A candidate naming a distro matches only on the distro name. A
    /// candidate without one matches on the package manager. A distro match
    /// that leaves out the package manager gets the detected one filled in.
    pub fn select_dependencies_spec(&self, candidates: &[DependencySpec]) -> Option<DependencySpec> {
        let pm_name = self.package_manager.as_ref().map(|pm| pm.name.as_str());

        for spec in candidates {
            if let Some(distro) = &spec.distro_name {
                if Some(distro.as_str()) == self.distro_name.as_deref() {
                    let mut spec = spec.clone();
                    if spec.package_manager.is_none() {
                        spec.package_manager = pm_name.map(str::to_string);
                    }
                    return Some(spec);
                }
                continue;
            }

            if spec.package_manager.is_some() && spec.package_manager.as_deref() == pm_name {
                return Some(spec.clone());
            }
        }

        None
    }

    /// Install `names` with the detected package manager.
    ///
    /// `sudo_cmd` is put in front of the command unless already running as
    /// root. With `capture` the package manager's output is collected instead
    /// of going to the terminal. A non-zero exit status is returned in the
    /// output, not as an error.
    pub fn install_packages(
        &self,
        names: &[String],
        sudo_cmd: &str,
        capture: bool,
    ) -> Result<PackageInstallOutput> {
        let pm = self
            .package_manager
            .as_ref()
            .ok_or(Error::NoPackageManager)?;

        let is_root = matches!(sudo::check(), RunningAs::Root);
        let argv = build_install_argv(pm, names, is_root, sudo_cmd);
        info!("Installing system packages: {}", argv.join(" "));

        let (program, args) = argv
            .split_first()
            .context("Package manager command is empty")?;
        let mut cmd = Command::new(program);
        cmd.args(args);

        if capture {
            let output = cmd
                .stdin(Stdio::null())
                .output()
                .with_context(|| format!("Failed to run {}", program))?;
            Ok(PackageInstallOutput {
                stdout: Some(String::from_utf8_lossy(&output.stdout).into_owned()),
                stderr: Some(String::from_utf8_lossy(&output.stderr).into_owned()),
                code: output.status.code(),
            })
        } else {
            let status = cmd
                .status()
                .with_context(|| format!("Failed to run {}", program))?;
            debug!("{} exited with {:?}", program, status.code());
            Ok(PackageInstallOutput {
                stdout: None,
                stderr: None,
                code: status.code(),
            })
        }
    }
}

/// Expand a package manager argv template for `names`.
///
/// `{packages_wsjoin}` becomes one space-joined argument; `{packages}` is
/// replaced by one argument per package.
pub fn build_install_argv(
    pm: &PackageManagerCommand,
    names: &[String],
    is_root: bool,
    sudo_cmd: &str,
) -> Vec<String> {
    let mut argv = Vec::with_capacity(pm.argv.len() + names.len() + 1);
    if !is_root {
        argv.push(sudo_cmd.to_string());
    }

    for arg in &pm.argv {
        match arg.as_str() {
            PACKAGES_WSJOIN_PLACEHOLDER => argv.push(names.join(" ")),
            PACKAGES_PLACEHOLDER => argv.extend(names.iter().cloned()),
            _ => argv.push(arg.clone()),
        }
    }

    argv
}
