//! Runtime configuration types for operational parameters
//!
//! These types define configuration that controls runtime behavior like
//! network timeouts, privilege escalation and the package manager table.

use serde::{Deserialize, Serialize};

/// Placeholder expanded into one argument per package
pub const PACKAGES_PLACEHOLDER: &str = "{packages}";

/// Placeholder replaced by all packages joined with spaces
pub const PACKAGES_WSJOIN_PLACEHOLDER: &str = "{packages_wsjoin}";

/// Complete runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuntimeConfig {
    /// Network and HTTP configuration
    #[serde(default)]
    pub network: NetworkConfig,

    /// Privilege escalation commands
    #[serde(default)]
    pub privilege: PrivilegeConfig,

    /// Known package managers, probed in order
    #[serde(default = "default_package_managers")]
    pub package_managers: Vec<PackageManagerCommand>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            privilege: PrivilegeConfig::default(),
            package_managers: default_package_managers(),
        }
    }
}

/// Network and HTTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkConfig {
    /// HTTP timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// Download timeout in seconds
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,

    /// Download chunk size in bytes
    #[serde(default = "default_chunk_size")]
    pub download_chunk_size: usize,

    /// User agent string for HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: default_http_timeout(),
            download_timeout_secs: default_download_timeout(),
            download_chunk_size: default_chunk_size(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_http_timeout() -> u64 {
    300 // 5 minutes
}
fn default_download_timeout() -> u64 {
    300 // 5 minutes
}
fn default_chunk_size() -> usize {
    8192
}
fn default_user_agent() -> String {
    format!(
        "batis/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Commands used to gain root for package installation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PrivilegeConfig {
    /// Used when running interactively in a terminal
    #[serde(default = "default_sudo_command")]
    pub sudo_command: String,

    /// Used in backend mode, where there is no terminal to prompt on
    #[serde(default = "default_backend_sudo_command")]
    pub backend_sudo_command: String,
}

impl Default for PrivilegeConfig {
    fn default() -> Self {
        Self {
            sudo_command: default_sudo_command(),
            backend_sudo_command: default_backend_sudo_command(),
        }
    }
}

fn default_sudo_command() -> String {
    "sudo".to_string()
}
fn default_backend_sudo_command() -> String {
    "pkexec".to_string()
}

/// A package manager executable and its non-interactive install argv
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManagerCommand {
    /// Executable probed on PATH
    pub name: String,

    /// argv template containing one packages placeholder
    pub argv: Vec<String>,
}

impl PackageManagerCommand {
    pub fn new(name: &str, argv: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            argv: argv.iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub fn default_package_managers() -> Vec<PackageManagerCommand> {
    vec![
        // Debian, Ubuntu etc.
        PackageManagerCommand::new("apt-get", &["apt-get", "--yes", "install", "{packages}"]),
        // Fedora
        PackageManagerCommand::new("yum", &["yum", "--assumeyes", "install", "{packages}"]),
        // openSUSE
        PackageManagerCommand::new(
            "zypper",
            &["zypper", "--non-interactive", "install", "{packages}"],
        ),
        PackageManagerCommand::new("urpmi", &["urpmi", "--auto", "{packages}"]),
        // Arch
        PackageManagerCommand::new("pacman", &["pacman", "-S", "--noconfirm", "{packages}"]),
        // Slackware
        PackageManagerCommand::new(
            "sbopkg",
            &["sbopkg", "-B", "-e", "stop", "-i", "{packages_wsjoin}"],
        ),
        // Sabayon
        PackageManagerCommand::new("equo", &["equo", "install", "{packages}"]),
        // Gentoo
        PackageManagerCommand::new("emerge", &["emerge", "{packages}"]),
    ]
}
