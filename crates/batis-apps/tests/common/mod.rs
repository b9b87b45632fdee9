//! Common test utilities for batis-apps
//!
//! - Sample application fixtures
//! - A command runner that records instead of executing
//! - Assertion helpers for install and uninstall

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod assertions;
pub mod fixtures;
pub mod mocks;

pub use assertions::*;
pub use fixtures::*;
pub use mocks::*;
