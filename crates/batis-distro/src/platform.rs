//! Platform detection module
//!
//! Detects the Linux distribution, the available package manager and the
//! kernel/architecture pair used to pick downloadable builds.

use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use batis_core::types::PackageManagerCommand;
use tracing::debug;

/// Find the distribution id reported by `lsb_release -i`.
///
/// Returns `None` when `lsb_release` is not installed. Any other failure to
/// run it is an error.
pub fn find_distro_name() -> Result<Option<String>> {
    let output = match Command::new("lsb_release").arg("-i").output() {
        Ok(output) => output,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("lsb_release not found, distro name unknown");
            return Ok(None);
        }
        Err(e) => return Err(e).context("Failed to run lsb_release"),
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let name = parse_lsb_release_id(&stdout);
    debug!("Detected distro name: {:?}", name);
    Ok(name)
}

/// Value of the first `Key: value` line of `lsb_release` output
pub fn parse_lsb_release_id(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| line.split_once(':'))
        .map(|(_, value)| value.trim().to_string())
}

/// First package manager in `table` whose executable is on PATH
pub fn find_package_manager_command(
    table: &[PackageManagerCommand],
) -> Option<&PackageManagerCommand> {
    let found = table.iter().find(|pm| which::which(&pm.name).is_ok());
    debug!("Detected package manager: {:?}", found.map(|pm| &pm.name));
    found
}

/// Like [`find_package_manager_command`], searching `paths` instead of PATH
pub fn find_package_manager_in<'a>(
    table: &'a [PackageManagerCommand],
    paths: &str,
    cwd: &Path,
) -> Option<&'a PackageManagerCommand> {
    table
        .iter()
        .find(|pm| which::which_in(&pm.name, Some(paths), cwd).is_ok())
}

/// Kernel name and machine architecture of the running system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPlatform {
    /// Lowercase kernel name, e.g. `linux`
    pub kernel: String,
    /// Machine name as `uname -m` prints it, e.g. `x86_64` or `i686`
    pub arch: String,
}

impl HostPlatform {
    pub fn new(kernel: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            kernel: kernel.into().to_lowercase(),
            arch: arch.into(),
        }
    }

    /// Detect the platform this binary was built for
    pub fn detect() -> Self {
        let arch = match std::env::consts::ARCH {
            "x86" => "i686",
            "arm" => "armv7l",
            other => other,
        };
        Self::new(std::env::consts::OS, arch)
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kernel, self.arch)
    }
}
