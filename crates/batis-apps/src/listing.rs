//! Listing installed applications

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use batis_core::types::BATIS_INFO_DIR;
use batis_core::{InstallScheme, SchemeKind};
use serde::Serialize;

/// An installed application directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledApp {
    pub name: String,
    pub path: PathBuf,
    #[serde(skip)]
    pub scheme: SchemeKind,
}

/// Applications installed under each scheme, in scheme order.
///
/// Application roots that don't exist yet are skipped.
pub fn installed_applications(schemes: &[InstallScheme]) -> Result<Vec<InstalledApp>> {
    let mut apps = Vec::new();
    for scheme in schemes {
        let root = &scheme.application;
        if !root.is_dir() {
            continue;
        }

        let mut found = Vec::new();
        for entry in
            fs::read_dir(root).with_context(|| format!("Failed to read {}", root.display()))?
        {
            let path = entry?.path();
            if path.join(BATIS_INFO_DIR).is_dir() {
                found.push(InstalledApp {
                    name: path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    path: std::path::absolute(&path)?,
                    scheme: scheme.kind,
                });
            }
        }
        found.sort_by(|a, b| a.name.cmp(&b.name));
        apps.extend(found);
    }
    Ok(apps)
}

/// Sorted names of all installed applications
pub fn installed_names(schemes: &[InstallScheme]) -> Result<Vec<String>> {
    let mut names: Vec<String> = installed_applications(schemes)?
        .into_iter()
        .map(|app| app.name)
        .collect();
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lists_user_then_system_and_skips_missing_roots() {
        let temp = TempDir::new().unwrap();
        let user = InstallScheme::rooted_at(SchemeKind::User, &temp.path().join("u"));
        let system = InstallScheme::rooted_at(SchemeKind::System, &temp.path().join("s"));
        let missing = InstallScheme::rooted_at(SchemeKind::System, &temp.path().join("none"));

        fs::create_dir_all(user.application_dir("zeta").join(BATIS_INFO_DIR)).unwrap();
        fs::create_dir_all(system.application_dir("alpha").join(BATIS_INFO_DIR)).unwrap();
        fs::create_dir_all(user.application_dir("not-an-app")).unwrap();
        fs::write(user.application.join(".zeta.lock"), "").unwrap();

        let apps = installed_applications(&[user, missing, system.clone()]).unwrap();
        assert_eq!(apps.len(), 2);
        assert_eq!(apps[0].name, "zeta");
        assert_eq!(apps[0].scheme, SchemeKind::User);
        assert_eq!(apps[1].path, system.application_dir("alpha"));

        let json = serde_json::to_value(&apps[1]).unwrap();
        assert_eq!(json["name"], "alpha");
        assert!(json.get("scheme").is_none());
    }

    #[test]
    fn test_names_are_sorted() {
        let temp = TempDir::new().unwrap();
        let user = InstallScheme::rooted_at(SchemeKind::User, &temp.path().join("u"));
        let system = InstallScheme::rooted_at(SchemeKind::System, &temp.path().join("s"));
        fs::create_dir_all(user.application_dir("b").join(BATIS_INFO_DIR)).unwrap();
        fs::create_dir_all(system.application_dir("a").join(BATIS_INFO_DIR)).unwrap();

        assert_eq!(installed_names(&[user, system]).unwrap(), ["a", "b"]);
    }
}
