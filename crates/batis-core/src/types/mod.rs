//! Type definitions for Batis packages, indices, manifests and configuration

mod index;
mod manifest;
mod metadata;
mod runtime_config;

pub use index::*;
pub use manifest::*;
pub use metadata::*;
pub use runtime_config::*;
