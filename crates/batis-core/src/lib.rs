//! # batis-core
//!
//! Core library for Batis providing:
//! - Package metadata, build index and manifest types
//! - Runtime configuration with hierarchical loading
//! - User and system install schemes
//! - The shared error type

pub mod config;
pub mod error;
pub mod scheme;
pub mod types;
pub mod utils;

pub use config::ConfigLoader;
pub use error::{Error, Result};
pub use scheme::{InstallScheme, SchemeKind};
pub use types::RuntimeConfig;
pub use utils::get_home_dir;
