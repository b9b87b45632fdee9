//! Remote application indices for Batis
//!
//! Provides:
//! - Index URL normalisation and loading
//! - Index verification
//! - Build selection by platform and version
//! - Downloads with progress tracking and SHA-512 verification
//! - Installing the selected build

pub mod download;
pub mod index;
pub mod select;
pub mod urlinstall;
pub mod verify_index;

pub use download::{DownloadResult, Downloader};
pub use index::{fetch_index, load_index, prepare_index_url};
pub use select::{filter_eligible, later_version, select_latest};
pub use urlinstall::UrlInstaller;
pub use verify_index::IndexVerifier;
