//! Batis Distro - distribution and package manager support
//!
//! Detects the running Linux distribution and package manager, selects the
//! system package requirements that apply to it and installs them.
//!
//! # Example
//!
//! ```rust,no_run
//! use batis_core::RuntimeConfig;
//! use batis_distro::DistroSelector;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = RuntimeConfig::default();
//!     let selector = DistroSelector::detect(&config.package_managers)?;
//!     println!("{:?}", selector.distro_name());
//!     Ok(())
//! }
//! ```

mod packages;
mod platform;

pub use packages::{build_install_argv, DistroSelector, PackageInstallOutput};
pub use platform::{
    find_distro_name, find_package_manager_command, find_package_manager_in,
    parse_lsb_release_id, HostPlatform,
};
