//! Packed application fixtures

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use batis_apps::{pack_tarball, CommandRunner, PackOptions};
use batis_core::{InstallScheme, SchemeKind};
use serde_json::{json, Value};
use sha2::{Digest, Sha512};
use tempfile::TempDir;

pub const APP_NAME: &str = "fooview";
pub const TARBALL_PATH: &str = "/downloads/fooview-2.0.app.tar.gz";

/// Runner standing in for the `xdg-*` cache tools
pub struct NoopRunner;

impl CommandRunner for NoopRunner {
    fn run(&self, _argv: &[String]) -> Result<Option<i32>, String> {
        Ok(Some(0))
    }
}

pub fn noop_runner() -> Arc<dyn CommandRunner> {
    Arc::new(NoopRunner)
}

/// Writer whose output stays readable after it is handed to a reporter
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Pack a minimal application and return the tarball bytes
pub fn packed_app(temp: &Path) -> Vec<u8> {
    let app = temp.join("build").join(APP_NAME);
    fs::create_dir_all(app.join("batis_info")).unwrap();
    fs::write(
        app.join("batis_info/metadata.json"),
        r#"{"name": "Fooview", "byline": "View foos",
            "commands": [{"name": "fooview", "target": "fooview.sh"}]}"#,
    )
    .unwrap();
    fs::write(app.join("fooview.sh"), "#!/bin/sh\n").unwrap();

    let tarball = pack_tarball(
        &app,
        &PackOptions {
            output: Some(temp.join("fooview.app.tar.gz")),
            ..Default::default()
        },
    )
    .unwrap();
    fs::read(tarball).unwrap()
}

pub fn sha512_hex(data: &[u8]) -> String {
    format!("{:x}", Sha512::digest(data))
}

/// An index with one build per entry of `(url, version, sha512)`
pub fn index_json(builds: &[(String, &str, Option<String>)]) -> Value {
    let builds: Vec<Value> = builds
        .iter()
        .map(|(url, version, sha512)| {
            let mut build = json!({
                "url": url,
                "version": version,
                "kernel": "Linux",
                "arch": "x86_64"
            });
            if let Some(hash) = sha512 {
                build["sha512"] = json!(hash);
            }
            build
        })
        .collect();

    json!({
        "name": "Fooview",
        "byline": "View foos",
        "icon_url": "https://example.com/fooview.png",
        "format_version": [1, 0],
        "builds": builds
    })
}

pub fn scheme_in(temp: &TempDir) -> InstallScheme {
    InstallScheme::rooted_at(SchemeKind::User, &temp.path().join("root"))
}
