//! Error types for batis-core

use thiserror::Error;

/// Result type alias using batis-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for Batis
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration format
    #[error("Invalid configuration format: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No installed application with this name
    #[error("Application {name:?} was not found.")]
    UnknownApplication { name: String },

    /// No build in an index can run on this machine
    #[error("No suitable builds were found for this platform ({kernel} {arch})")]
    NoEligibleBuild { kernel: String, arch: String },

    /// Tarball member that would land outside the extraction directory
    #[error("Bad filename in tarball: {name:?}")]
    UnsafeArchiveEntry { name: String },

    /// Application directory without batis_info
    #[error("Could not find batis_info directory in {path}")]
    MissingBatisInfo { path: String },

    /// Downloaded data does not match the published hash
    #[error("Download was corrupted - hash didn't match (expected {expected}, got {actual})")]
    ChecksumMismatch { expected: String, actual: String },

    /// Plain HTTP download without a hash to check it against
    #[error("'sha512' field is required for non-HTTPS downloads: {url}")]
    InsecureDownload { url: String },

    /// None of the known package manager commands is on PATH
    #[error("No supported package manager was found on this system")]
    NoPackageManager,
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an unknown application error
    pub fn unknown_application(name: impl Into<String>) -> Self {
        Self::UnknownApplication { name: name.into() }
    }

    /// Create a no eligible build error
    pub fn no_eligible_build(kernel: impl Into<String>, arch: impl Into<String>) -> Self {
        Self::NoEligibleBuild {
            kernel: kernel.into(),
            arch: arch.into(),
        }
    }

    /// Create an unsafe archive entry error
    pub fn unsafe_archive_entry(name: impl Into<String>) -> Self {
        Self::UnsafeArchiveEntry { name: name.into() }
    }

    /// Create a missing batis_info error
    pub fn missing_batis_info(path: impl Into<String>) -> Self {
        Self::MissingBatisInfo { path: path.into() }
    }

    /// Create a checksum mismatch error
    pub fn checksum_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::ChecksumMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an insecure download error
    pub fn insecure_download(url: impl Into<String>) -> Self {
        Self::InsecureDownload { url: url.into() }
    }

    /// Whether this error means the named application is not installed
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UnknownApplication { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_application_message() {
        let err = Error::unknown_application("fooview");
        assert_eq!(err.to_string(), "Application \"fooview\" was not found.");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_no_eligible_build_carries_platform() {
        let err = Error::no_eligible_build("linux", "sparc64");
        match &err {
            Error::NoEligibleBuild { kernel, arch } => {
                assert_eq!(kernel, "linux");
                assert_eq!(arch, "sparc64");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("sparc64"));
        assert!(!err.is_not_found());
    }
}
