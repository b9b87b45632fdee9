//! Package metadata types
//!
//! Mirrors `batis_info/metadata.json` and the optional
//! `batis_info/dependencies.json` of an application directory.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Directory inside every application that holds Batis metadata
pub const BATIS_INFO_DIR: &str = "batis_info";

/// Metadata file name inside `batis_info`
pub const METADATA_FILENAME: &str = "metadata.json";

/// Separate dependency file name inside `batis_info`
pub const DEPENDENCIES_FILENAME: &str = "dependencies.json";

/// Per-package attributes read from `batis_info/metadata.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Metadata {
    /// Display name of the application
    pub name: String,

    /// One-line description
    #[serde(default)]
    pub byline: String,

    /// Icon path relative to the package root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Commands to expose on the user's PATH, in declaration order
    #[serde(default)]
    pub commands: Vec<CommandEntry>,

    /// Inline system package requirements (`null` means none)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_packages: Option<Vec<DependencySpec>>,

    /// Human-readable description of the inline requirements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies_description: Option<String>,

    /// argv used to start the application
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch: Option<Vec<String>>,
}

impl Metadata {
    /// Load metadata from an application directory
    pub fn load(app_dir: &Path) -> Result<Self> {
        let path = app_dir.join(BATIS_INFO_DIR).join(METADATA_FILENAME);
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// A command symlinked into the commands directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandEntry {
    /// File name of the symlink
    pub name: String,

    /// Path of the executable relative to the application directory
    pub target: String,
}

/// One candidate set of distro packages
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DependencySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_manager: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distro_name: Option<String>,

    #[serde(default)]
    pub packages: Vec<String>,
}

/// Contents of `batis_info/dependencies.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DependenciesFile {
    #[serde(default)]
    pub system_packages: Vec<DependencySpec>,

    #[serde(default)]
    pub description: String,
}

/// The system package requirements of an application, wherever declared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDeclaration {
    pub candidates: Vec<DependencySpec>,
    pub description: String,
}

impl DependencyDeclaration {
    /// Resolve declared dependencies for an application directory.
    ///
    /// `dependencies.json` wins over the inline `system_packages` field.
    /// Returns `None` when the application declares no requirements.
    pub fn resolve(app_dir: &Path, metadata: &Metadata) -> Result<Option<Self>> {
        let deps_file = app_dir.join(BATIS_INFO_DIR).join(DEPENDENCIES_FILENAME);
        if deps_file.is_file() {
            let content = std::fs::read_to_string(&deps_file)?;
            let deps: DependenciesFile = serde_json::from_str(&content)?;
            return Ok(Some(Self {
                candidates: deps.system_packages,
                description: deps.description,
            }));
        }

        Ok(metadata.system_packages.as_ref().map(|candidates| Self {
            candidates: candidates.clone(),
            description: metadata.dependencies_description.clone().unwrap_or_default(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
        "name": "Fooview",
        "byline": "View foos",
        "icon": "icon.png",
        "commands": [{"name": "launch-fooview", "target": "run.sh"}],
        "system_packages": [
            {"distro_name": "Ubuntu", "packages": ["python3-pyqt5"]},
            {"package_manager": "pacman", "packages": ["python-pyqt5"]}
        ],
        "dependencies_description": "PyQt5"
    }"#;

    fn write_app(metadata: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        let info = dir.path().join(BATIS_INFO_DIR);
        std::fs::create_dir_all(&info).unwrap();
        std::fs::write(info.join(METADATA_FILENAME), metadata).unwrap();
        dir
    }

    #[test]
    fn test_parse_metadata() {
        let m: Metadata = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(m.name, "Fooview");
        assert_eq!(m.commands.len(), 1);
        assert_eq!(m.commands[0].target, "run.sh");
        let specs = m.system_packages.unwrap();
        assert_eq!(specs[0].distro_name.as_deref(), Some("Ubuntu"));
        assert_eq!(specs[1].package_manager.as_deref(), Some("pacman"));
    }

    #[test]
    fn test_minimal_metadata_defaults() {
        let m: Metadata = serde_json::from_str(r#"{"name": "x"}"#).unwrap();
        assert!(m.commands.is_empty());
        assert!(m.system_packages.is_none());
        assert!(m.launch.is_none());
    }

    #[test]
    fn test_resolve_inline_dependencies() {
        let dir = write_app(SAMPLE);
        let m = Metadata::load(dir.path()).unwrap();
        let decl = DependencyDeclaration::resolve(dir.path(), &m)
            .unwrap()
            .unwrap();
        assert_eq!(decl.candidates.len(), 2);
        assert_eq!(decl.description, "PyQt5");
    }

    #[test]
    fn test_dependencies_file_takes_precedence() {
        let dir = write_app(SAMPLE);
        std::fs::write(
            dir.path().join(BATIS_INFO_DIR).join(DEPENDENCIES_FILENAME),
            r#"{"system_packages": [{"package_manager": "apt-get", "packages": ["zlib1g"]}],
                "description": "zlib"}"#,
        )
        .unwrap();

        let m = Metadata::load(dir.path()).unwrap();
        let decl = DependencyDeclaration::resolve(dir.path(), &m)
            .unwrap()
            .unwrap();
        assert_eq!(decl.candidates.len(), 1);
        assert_eq!(decl.candidates[0].packages, vec!["zlib1g"]);
        assert_eq!(decl.description, "zlib");
    }

    #[test]
    fn test_no_dependencies_declared() {
        let dir = write_app(r#"{"name": "x", "system_packages": null}"#);
        let m = Metadata::load(dir.path()).unwrap();
        assert!(DependencyDeclaration::resolve(dir.path(), &m)
            .unwrap()
            .is_none());
    }
}
