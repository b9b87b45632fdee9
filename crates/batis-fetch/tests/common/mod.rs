//! Common test utilities for batis-fetch
//!
//! - A packed sample application and its SHA-512
//! - wiremock helpers serving indices and tarballs
//! - A command runner that never executes anything

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod fixtures;
pub mod mock_server;

pub use fixtures::*;
pub use mock_server::*;
