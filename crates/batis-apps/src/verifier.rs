//! Application package verification
//!
//! Checks an unpacked application directory (or a tarball, after unpacking
//! it) and collects human-readable problems. An empty list means the
//! package is valid. Problems never stop the scan; every check runs.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::Result;
use batis_core::types::{BATIS_INFO_DIR, DEPENDENCIES_FILENAME, METADATA_FILENAME};
use batis_core::Error;
use freedesktop_file_parser::EntryType;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::tarball::{is_tarball, unpack_app_tarball};

static MIME_VENDOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z]+-\w+").expect("vendor prefix regex is valid"));

/// Whether `name` is an icon size directory like `48x48`
pub fn is_icon_size(name: &str) -> bool {
    let Some((w, h)) = name.split_once('x') else {
        return false;
    };
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    digits(w) && w == h && w.parse::<u64>().is_ok_and(|n| n > 0)
}

/// Sorted entries of a directory, or nothing if it can't be read
fn sorted_entries(dir: &Path) -> Vec<(String, PathBuf)> {
    let Ok(read) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut entries: Vec<_> = read
        .filter_map(|e| e.ok())
        .map(|e| (e.file_name().to_string_lossy().into_owned(), e.path()))
        .collect();
    entries.sort();
    entries
}

/// Whether the first line that isn't blank or a comment is the `[Desktop Entry]` header
fn starts_with_desktop_entry_group(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .is_some_and(|line| line == "[Desktop Entry]")
}

fn extension_of(name: &str) -> Option<&str> {
    Path::new(name).extension().and_then(|e| e.to_str())
}

/// Verifies an application directory
pub struct UnpackedDirVerifier {
    directory: PathBuf,
}

impl UnpackedDirVerifier {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn relative(&self, parts: &[&str]) -> PathBuf {
        parts
            .iter()
            .fold(self.directory.clone(), |path, part| path.join(part))
    }

    /// Run every check
    pub fn verify(&self) -> Vec<String> {
        debug!("Verifying application directory {:?}", self.directory);
        let mut problems = Vec::new();
        self.verify_batis_info_subdir(&mut problems);
        self.verify_metadata(&mut problems);
        self.verify_desktop_files(&mut problems);
        self.verify_mimetypes(&mut problems);
        self.verify_icons(&mut problems);
        problems
    }

    pub fn verify_batis_info_subdir(&self, problems: &mut Vec<String>) {
        if !self.relative(&[BATIS_INFO_DIR]).is_dir() {
            problems.push("No batis_info subdirectory".to_string());
        }
    }

    pub fn verify_metadata(&self, problems: &mut Vec<String>) {
        let metadata_file = self.relative(&[BATIS_INFO_DIR, METADATA_FILENAME]);
        if !metadata_file.is_file() {
            problems.push("No file batis_info/metadata.json".to_string());
            return;
        }

        let metadata = match read_json(&metadata_file) {
            Ok(Value::Object(m)) => m,
            Ok(other) => {
                problems.push(format!(
                    "batis_info/metadata.json does not contain a JSON object: {}",
                    other
                ));
                return;
            }
            Err(e) => {
                problems.push(format!("batis_info/metadata.json is not valid JSON: {}", e));
                return;
            }
        };

        for field in ["name", "byline"] {
            match metadata.get(field) {
                Some(Value::String(_)) => {}
                Some(other) => problems.push(format!(
                    "{} field in metadata is not a string: {}",
                    field, other
                )),
                None => problems.push(format!("Missing {} field in metadata", field)),
            }
        }

        match metadata.get("icon") {
            None => {}
            Some(Value::String(icon)) => {
                if !self.directory.join(icon).is_file() {
                    problems.push(format!(
                        "Icon file specified in metadata does not exist: {}",
                        icon
                    ));
                }
            }
            Some(other) => problems.push(format!(
                "icon field in metadata is not a string: {}",
                other
            )),
        }

        self.verify_commands(&metadata, problems);
        self.verify_dependencies(&metadata, problems);
    }

    fn verify_commands(&self, metadata: &Map<String, Value>, problems: &mut Vec<String>) {
        let commands = match metadata.get("commands") {
            None => return,
            Some(Value::Array(commands)) => commands,
            Some(other) => {
                problems.push(format!("commands field in metadata is not a list: {}", other));
                return;
            }
        };

        for cmd_info in commands {
            let Value::Object(cmd) = cmd_info else {
                problems.push(format!("Non-object in commands list: {}", cmd_info));
                continue;
            };

            if !cmd.contains_key("name") {
                problems.push(format!("No name field in command info: {}", cmd_info));
            }

            match cmd.get("target") {
                None => problems.push(format!("No target field in command info: {}", cmd_info)),
                Some(Value::String(target)) => {
                    if !self.directory.join(target).is_file() {
                        problems.push(format!(
                            "Command target does not exist in package: {:?}",
                            target
                        ));
                    }
                }
                Some(other) => problems.push(format!("Command target is not a string: {}", other)),
            }
        }
    }

    /// Check `dependencies.json`, or the inline `system_packages` if there is none
    fn verify_dependencies(&self, metadata: &Map<String, Value>, problems: &mut Vec<String>) {
        let deps_file = self.relative(&[BATIS_INFO_DIR, DEPENDENCIES_FILENAME]);
        if deps_file.exists() {
            match read_json(&deps_file) {
                Ok(Value::Object(deps)) => {
                    verify_system_packages(deps.get("system_packages"), problems);
                    verify_description(&deps, "description", problems);
                }
                Ok(other) => problems.push(format!(
                    "batis_info/dependencies.json does not contain a JSON object: {}",
                    other
                )),
                Err(e) => problems.push(format!(
                    "batis_info/dependencies.json is not valid JSON: {}",
                    e
                )),
            }
            return;
        }

        match metadata.get("system_packages") {
            None | Some(Value::Null) => {}
            specs => {
                verify_system_packages(specs, problems);
                verify_description(metadata, "dependencies_description", problems);
            }
        }
    }

    pub fn verify_desktop_files(&self, problems: &mut Vec<String>) {
        let desktop_dir = self.relative(&[BATIS_INFO_DIR, "desktop"]);
        if !desktop_dir.exists() {
            return;
        }
        if !desktop_dir.is_dir() {
            problems.push("batis_info/desktop should be a directory".to_string());
            return;
        }

        for (name, path) in sorted_entries(&desktop_dir) {
            if extension_of(&name) != Some("desktop") {
                problems.push(format!("Non .desktop file in batis_info/desktop: {:?}", name));
                continue;
            }

            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    problems.push(format!("Could not read {}: {}", path.display(), e));
                    continue;
                }
            };
            if !starts_with_desktop_entry_group(&content) {
                problems.push(format!(
                    "Invalid desktop entry file ({}):\nfirst group must be [Desktop Entry]",
                    path.display()
                ));
                continue;
            }
            match freedesktop_file_parser::parse(&content) {
                Ok(file) => {
                    if matches!(file.entry.entry_type, EntryType::Unknown) {
                        problems.push(format!(
                            "Invalid desktop entry file ({}):\nunknown Type",
                            path.display()
                        ));
                    }
                }
                Err(e) => problems.push(format!(
                    "Invalid desktop entry file ({}):\n{:?}",
                    path.display(),
                    e
                )),
            }
        }
    }

    pub fn verify_mimetypes(&self, problems: &mut Vec<String>) {
        let mime_dir = self.relative(&[BATIS_INFO_DIR, "mime"]);
        if !mime_dir.exists() {
            return;
        }
        if !mime_dir.is_dir() {
            problems.push("batis_info/mime should be a directory".to_string());
            return;
        }

        for (name, path) in sorted_entries(&mime_dir) {
            if extension_of(&name) != Some("xml") {
                problems.push(format!("Non .xml file in batis_info/mime: {:?}", name));
                continue;
            }

            let stem = name.trim_end_matches(".xml");
            if !MIME_VENDOR_RE.is_match(stem) {
                problems.push(format!(
                    "Mime file should have vendor prefix (e.g. myorg-foo.xml): {:?}",
                    name
                ));
            }

            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    problems.push(format!("Could not read {}: {}", path.display(), e));
                    continue;
                }
            };
            if let Err(e) = roxmltree::Document::parse(&content) {
                problems.push(format!(
                    "Invalid XML in mime file ({}):\n{}",
                    path.display(),
                    e
                ));
            }
        }
    }

    pub fn verify_icons(&self, problems: &mut Vec<String>) {
        let icon_dir = self.relative(&[BATIS_INFO_DIR, "icons"]);
        if !icon_dir.exists() {
            return;
        }
        if !icon_dir.is_dir() {
            problems.push("batis_info/icons should be a directory".to_string());
            return;
        }

        let themes = sorted_entries(&icon_dir);
        if !themes.is_empty() && !themes.iter().any(|(name, _)| name == "hicolor") {
            let names: Vec<&str> = themes.iter().map(|(n, _)| n.as_str()).collect();
            problems.push(format!(
                "Icon themes do not include hicolor, the default theme: {:?}",
                names
            ));
        }

        for (_, theme_dir) in themes {
            if !theme_dir.is_dir() {
                problems.push(format!(
                    "batis_info/icons should only contain theme directories. {} is not a directory",
                    theme_dir.display()
                ));
                continue;
            }

            for (size, size_dir) in sorted_entries(&theme_dir) {
                if !size_dir.is_dir() {
                    problems.push(format!(
                        "Icon theme directories should only contain size directories. {} is not a directory",
                        size_dir.display()
                    ));
                    continue;
                }
                if !is_icon_size(&size) {
                    problems.push(format!(
                        "Icon size directory does not match pattern NxN: {:?}",
                        size
                    ));
                    continue;
                }

                for (_, context_dir) in sorted_entries(&size_dir) {
                    if !context_dir.is_dir() {
                        problems.push(format!(
                            "Icon size directories should only contain context directories. {} is not a directory.",
                            context_dir.display()
                        ));
                        continue;
                    }

                    for (_, file) in sorted_entries(&context_dir) {
                        if !file.is_file() {
                            problems.push(format!(
                                "Icon context directories should contain icon files. {} is not a file.",
                                file.display()
                            ));
                        }
                    }
                }
            }
        }
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn verify_system_packages(value: Option<&Value>, problems: &mut Vec<String>) {
    let specs = match value {
        Some(Value::Array(specs)) => specs,
        Some(Value::Null) | None => {
            problems.push("system_packages should be a list of package specs".to_string());
            return;
        }
        Some(other) => {
            problems.push(format!("system_packages is neither null nor a list: {}", other));
            return;
        }
    };

    if specs.is_empty() {
        problems.push(
            "system_packages should not be an empty list. \
             If the package really has no requirements, specify \"system_packages\": null"
                .to_string(),
        );
    }

    for spec_value in specs {
        let Value::Object(spec) = spec_value else {
            problems.push(format!("Package spec is not an object: {}", spec_value));
            continue;
        };

        if !spec.contains_key("package_manager") && !spec.contains_key("distro_name") {
            problems.push(format!(
                "Package spec needs at least one of package_manager, distro_name: {}",
                spec_value
            ));
        }

        match spec.get("packages") {
            None => problems.push(format!("Package spec needs packages field: {}", spec_value)),
            Some(Value::Array(_)) => {}
            Some(other) => problems.push(format!(
                "Package spec packages field is not a list: {}",
                other
            )),
        }
    }
}

fn verify_description(map: &Map<String, Value>, field: &str, problems: &mut Vec<String>) {
    match map.get(field) {
        Some(Value::String(_)) => {}
        Some(other) => problems.push(format!("{} is not a string: {}", field, other)),
        None => problems.push(format!("{} field missing", field)),
    }
}

/// Verify a tarball or an application directory
///
/// A directory is checked in place; a file is unpacked first. Unpacking
/// problems with the archive's contents are reported as problems too.
pub fn verify_tarball_or_directory(path: &Path) -> Result<Vec<String>> {
    if path.is_dir() {
        return Ok(UnpackedDirVerifier::new(path).verify());
    }

    if !is_tarball(path) {
        return Ok(vec![format!("{} is not a tar file", path.display())]);
    }

    match unpack_app_tarball(path) {
        Ok(unpacked) => Ok(UnpackedDirVerifier::new(unpacked.path()).verify()),
        Err(e) => match e.downcast_ref::<Error>() {
            Some(err @ (Error::UnsafeArchiveEntry { .. } | Error::MissingBatisInfo { .. })) => {
                Ok(vec![err.to_string()])
            }
            _ => Err(e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn app_with_metadata(metadata: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        let info = temp.path().join(BATIS_INFO_DIR);
        fs::create_dir_all(&info).unwrap();
        fs::write(info.join(METADATA_FILENAME), metadata).unwrap();
        temp
    }

    fn verify(dir: &TempDir) -> Vec<String> {
        UnpackedDirVerifier::new(dir.path()).verify()
    }

    #[test]
    fn test_icon_size() {
        assert!(is_icon_size("48x48"));
        assert!(is_icon_size("256x256"));
        assert!(!is_icon_size("48x32"));
        assert!(!is_icon_size("scalable"));
        assert!(!is_icon_size("0x0"));
        assert!(!is_icon_size("48x48@2"));
        assert!(!is_icon_size("x"));
    }

    #[test]
    fn test_minimal_valid_metadata() {
        let dir = app_with_metadata(r#"{"name": "Foo", "byline": "Does foo"}"#);
        assert_eq!(verify(&dir), Vec::<String>::new());
    }

    #[test]
    fn test_no_batis_info() {
        let temp = TempDir::new().unwrap();
        let problems = verify(&temp);
        assert_eq!(
            problems,
            ["No batis_info subdirectory", "No file batis_info/metadata.json"]
        );
    }

    #[test]
    fn test_invalid_json() {
        let dir = app_with_metadata("{name: ");
        let problems = verify(&dir);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].starts_with("batis_info/metadata.json is not valid JSON"));
    }

    #[test]
    fn test_wrong_types_and_missing_fields() {
        let dir = app_with_metadata(r#"{"name": 5, "icon": "missing.png"}"#);
        let problems = verify(&dir);
        assert_eq!(
            problems,
            [
                "name field in metadata is not a string: 5",
                "Missing byline field in metadata",
                "Icon file specified in metadata does not exist: missing.png",
            ]
        );
    }

    #[test]
    fn test_command_checks() {
        let dir = app_with_metadata(
            r#"{"name": "a", "byline": "b",
                "commands": [{"name": "x", "target": "nope.sh"}, {"target": 3}, "str"]}"#,
        );
        let problems = verify(&dir);
        assert_eq!(problems.len(), 4);
        assert!(problems[0].contains("nope.sh"));
        assert!(problems[1].starts_with("No name field"));
        assert!(problems[2].starts_with("Command target is not a string"));
        assert!(problems[3].starts_with("Non-object in commands list"));
    }

    #[test]
    fn test_inline_dependencies_need_description() {
        let dir = app_with_metadata(
            r#"{"name": "a", "byline": "b",
                "system_packages": [{"packages": "zlib"}, 7]}"#,
        );
        let problems = verify(&dir);
        assert_eq!(problems.len(), 4);
        assert!(problems[0].starts_with("Package spec needs at least one of"));
        assert!(problems[1].starts_with("Package spec packages field is not a list"));
        assert!(problems[2].starts_with("Package spec is not an object"));
        assert_eq!(problems[3], "dependencies_description field missing");
    }

    #[test]
    fn test_empty_dependencies_file() {
        let dir = app_with_metadata(r#"{"name": "a", "byline": "b"}"#);
        fs::write(
            dir.path().join(BATIS_INFO_DIR).join(DEPENDENCIES_FILENAME),
            r#"{"system_packages": [], "description": "nothing"}"#,
        )
        .unwrap();
        let problems = verify(&dir);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].starts_with("system_packages should not be an empty list"));
    }

    #[test]
    fn test_null_system_packages_is_fine() {
        let dir = app_with_metadata(r#"{"name": "a", "byline": "b", "system_packages": null}"#);
        assert!(verify(&dir).is_empty());
    }

    #[test]
    fn test_mime_checks() {
        let dir = app_with_metadata(r#"{"name": "a", "byline": "b"}"#);
        let mime = dir.path().join(BATIS_INFO_DIR).join("mime");
        fs::create_dir_all(&mime).unwrap();
        fs::write(mime.join("example-good.xml"), "<mime-info/>").unwrap();
        fs::write(mime.join("novendor.xml"), "<mime-info>").unwrap();
        fs::write(mime.join("readme.txt"), "").unwrap();

        let problems = verify(&dir);
        assert_eq!(problems.len(), 3);
        assert!(problems[0].starts_with("Mime file should have vendor prefix"));
        assert!(problems[1].starts_with("Invalid XML in mime file"));
        assert!(problems[2].starts_with("Non .xml file in batis_info/mime"));
    }

    #[test]
    fn test_desktop_checks() {
        let dir = app_with_metadata(r#"{"name": "a", "byline": "b"}"#);
        let desktop = dir.path().join(BATIS_INFO_DIR).join("desktop");
        fs::create_dir_all(&desktop).unwrap();
        fs::write(
            desktop.join("good.desktop"),
            "[Desktop Entry]\nType=Application\nName=Good\nExec=good\n",
        )
        .unwrap();
        fs::write(desktop.join("bad.desktop"), "this is not a desktop file").unwrap();
        fs::write(desktop.join("headless.desktop"), "Type=Application\nName=X\n").unwrap();
        fs::write(
            desktop.join("odd.desktop"),
            "[Desktop Entry]\nType=Bogus\nName=X\n",
        )
        .unwrap();
        fs::write(desktop.join("notes.txt"), "").unwrap();

        let problems = verify(&dir);
        assert_eq!(problems.len(), 4, "{:#?}", problems);
        assert!(problems[0].starts_with("Invalid desktop entry file"));
        assert!(problems[0].contains("bad.desktop"));
        assert!(problems[1].contains("headless.desktop"));
        assert!(problems[1].contains("[Desktop Entry]"));
        assert!(problems[2].starts_with("Non .desktop file"));
        assert!(problems[3].contains("odd.desktop"));
        assert!(problems[3].contains("unknown Type"));
    }

    #[test]
    fn test_desktop_entry_group_header() {
        assert!(starts_with_desktop_entry_group(
            "# comment\n\n[Desktop Entry]\nName=A\n"
        ));
        assert!(!starts_with_desktop_entry_group("Name=A\n[Desktop Entry]\n"));
        assert!(!starts_with_desktop_entry_group("[Desktop Action new]\n"));
        assert!(!starts_with_desktop_entry_group(""));
    }

    #[test]
    fn test_icon_structure_problems_do_not_stop_scan() {
        let dir = app_with_metadata(r#"{"name": "a", "byline": "b"}"#);
        let icons = dir.path().join(BATIS_INFO_DIR).join("icons");
        fs::create_dir_all(icons.join("oxygen/48x48/apps")).unwrap();
        fs::write(icons.join("oxygen/48x48/apps/a.png"), "").unwrap();
        fs::create_dir_all(icons.join("oxygen/large")).unwrap();
        fs::write(icons.join("stray.png"), "").unwrap();

        let problems = verify(&dir);
        assert_eq!(problems.len(), 3);
        assert!(problems[0].starts_with("Icon themes do not include hicolor"));
        assert!(problems[1].starts_with("Icon size directory does not match pattern NxN"));
        assert!(problems[2].starts_with("batis_info/icons should only contain theme directories"));
    }

    #[test]
    fn test_non_tar_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.txt");
        fs::write(&path, "plain text").unwrap();

        let problems = verify_tarball_or_directory(&path).unwrap();
        assert_eq!(problems, [format!("{} is not a tar file", path.display())]);
    }
}
