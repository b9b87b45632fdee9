//! Application management for Batis
//!
//! This crate handles:
//! - Installing application directories and tarballs into an install scheme
//! - Tracking installed files in a per-application manifest
//! - Uninstalling from that manifest
//! - Verifying application packages
//! - Packing and unpacking application tarballs
//! - Listing installed applications

pub mod installer;
pub mod listing;
pub mod lock;
pub mod manifest;
pub mod progress;
pub mod tarball;
pub mod triggers;
pub mod uninstaller;
pub mod verifier;

pub use installer::{ApplicationInstaller, InstallReport};
pub use listing::{installed_applications, installed_names, InstalledApp};
pub use lock::InstallLock;
pub use manifest::InstallLog;
pub use progress::{InstallStep, StepProblem, StepReporter};
pub use tarball::{pack_tarball, unpack_app_tarball, PackOptions, UnpackedApp};
pub use triggers::{CommandRunner, SystemRunner, Trigger, TriggerOutcome};
pub use uninstaller::{
    find_installed_application, find_installed_application_in, uninstall_application,
    ApplicationUninstaller, UninstallReport,
};
pub use verifier::{verify_tarball_or_directory, UnpackedDirVerifier};
