//! Remote build index types (`batis_index.json`)

use serde::{Deserialize, Serialize};

/// File name of a published index
pub const INDEX_FILENAME: &str = "batis_index.json";

/// The only index format this version understands
pub const SUPPORTED_FORMAT_VERSION: [u64; 2] = [1, 0];

/// A published application index
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexDocument {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub byline: String,

    #[serde(default)]
    pub icon_url: String,

    #[serde(default)]
    pub format_version: Vec<u64>,

    pub builds: Vec<BuildDescriptor>,
}

/// One downloadable build of an application
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildDescriptor {
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha512: Option<String>,

    pub version: String,

    /// Kernel name, `any` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernel: Option<String>,

    /// Machine architecture, `any` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
}

impl BuildDescriptor {
    pub fn kernel_or_any(&self) -> &str {
        self.kernel.as_deref().unwrap_or("any")
    }

    pub fn arch_or_any(&self) -> &str {
        self.arch.as_deref().unwrap_or("any")
    }

    /// Whether the build is served over TLS
    pub fn is_https(&self) -> bool {
        self.url.starts_with("https:")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_index() {
        let json = r#"{
            "name": "My App",
            "byline": "Frobulate pufoos",
            "icon_url": "https://example.com/logo.png",
            "format_version": [1, 0],
            "builds": [
                {"url": "https://example.com/a.app.tar.gz", "version": "0.1",
                 "kernel": "Linux", "arch": "x86_64"},
                {"url": "http://example.com/b.app.tar.gz", "version": "0.2", "sha512": "ab"}
            ]
        }"#;
        let index: IndexDocument = serde_json::from_str(json).unwrap();
        assert_eq!(index.format_version, SUPPORTED_FORMAT_VERSION.to_vec());
        assert_eq!(index.builds.len(), 2);
        assert_eq!(index.builds[0].kernel_or_any(), "Linux");
        assert_eq!(index.builds[1].arch_or_any(), "any");
        assert!(index.builds[0].is_https());
        assert!(!index.builds[1].is_https());
    }
}
