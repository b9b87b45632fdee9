//! Sample application packages

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use batis_core::{InstallScheme, SchemeKind};
use tempfile::TempDir;

pub const SAMPLE_APP: &str = "sampleapp";
pub const SAMPLE_COMMAND: &str = "launch-sampleapp";

const METADATA: &str = r#"{
    "name": "Sample App",
    "byline": "An application used in tests",
    "commands": [{"name": "launch-sampleapp", "target": "run.sh"}],
    "system_packages": null
}"#;

const DESKTOP_ENTRY: &str = "[Desktop Entry]
Type=Application
Name=Fooview
Exec={{INSTALL_DIR}}/run.sh %f
Icon=tango-calculator
MimeType=text/x-example-diff;
";

const MIME_PACKAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<mime-info xmlns="http://www.freedesktop.org/standards/shared-mime-info">
  <mime-type type="text/x-example-diff">
    <comment>Example diff</comment>
    <glob pattern="*.exdiff"/>
  </mime-type>
</mime-info>
"#;

/// A temporary workspace with a sample application and an install root
pub struct Workspace {
    temp: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            temp: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// User scheme rooted inside the workspace
    pub fn scheme(&self) -> InstallScheme {
        InstallScheme::rooted_at(SchemeKind::User, &self.temp.path().join("root"))
    }

    /// Write the sample application under `src/` and return its directory
    pub fn sample_app(&self) -> PathBuf {
        write_sample_app(&self.temp.path().join("src"))
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Write the sample application into `parent/sampleapp`
pub fn write_sample_app(parent: &Path) -> PathBuf {
    let app = parent.join(SAMPLE_APP);
    let info = app.join("batis_info");
    let icon_dir = info.join("icons/hicolor/48x48/apps");

    for dir in [&icon_dir, &info.join("desktop"), &info.join("mime")] {
        fs::create_dir_all(dir).expect("Failed to create fixture directory");
    }

    fs::write(info.join("metadata.json"), METADATA).unwrap();
    fs::write(info.join("desktop/fooview.desktop"), DESKTOP_ENTRY).unwrap();
    fs::write(info.join("mime/example-diff.xml"), MIME_PACKAGE).unwrap();
    fs::write(icon_dir.join("tango-calculator.png"), b"\x89PNG\r\n\x1a\n").unwrap();

    let run = app.join("run.sh");
    fs::write(&run, "#!/bin/sh\necho sample\n").unwrap();
    fs::set_permissions(&run, fs::Permissions::from_mode(0o755)).unwrap();

    app
}
