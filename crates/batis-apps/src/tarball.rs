//! Application tarballs
//!
//! A packed application is a gzip-compressed tar archive whose single
//! top-level member is the application directory, which contains
//! `batis_info/`.

use std::fs::{self, File};
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use batis_core::types::BATIS_INFO_DIR;
use batis_core::Error;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Archive, Builder, Header};
use tempfile::TempDir;
use tracing::{debug, info};

/// Suffix of packed application files
pub const TARBALL_SUFFIX: &str = ".app.tar.gz";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Launcher added to tarballs so they can be installed without knowing Batis
const INSTALL_SCRIPT: &str = r#"#!/bin/sh
# Install the application in this directory with Batis.
# Pass --system to install for all users.
cd "$(dirname "$0")" || exit 1
exec batis "$@" installtar "$(pwd)"
"#;

/// An application unpacked to a temporary directory
///
/// The directory is deleted when this value is dropped.
#[derive(Debug)]
pub struct UnpackedApp {
    _tempdir: TempDir,
    root: PathBuf,
}

impl UnpackedApp {
    /// Directory containing `batis_info`
    pub fn path(&self) -> &Path {
        &self.root
    }
}

/// Open a tar archive, gzip-compressed or not
fn open_archive(path: &Path) -> Result<Archive<Box<dyn Read>>> {
    let mut file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    let mut magic = [0u8; 2];
    let is_gzip = file.read_exact(&mut magic).is_ok() && magic == GZIP_MAGIC;
    file.seek(SeekFrom::Start(0))?;

    let reader: Box<dyn Read> = if is_gzip {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(Archive::new(reader))
}

/// Whether `path` is a readable tar archive
pub fn is_tarball(path: &Path) -> bool {
    let Ok(mut archive) = open_archive(path) else {
        return false;
    };
    let Ok(mut entries) = archive.entries() else {
        return false;
    };
    matches!(entries.next(), Some(Ok(_)))
}

/// Reject member names that would land outside the extraction directory
fn check_member_name(name: &str) -> Result<()> {
    let path = Path::new(name);
    let escapes = name.starts_with('/')
        || path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir));
    if escapes {
        return Err(Error::unsafe_archive_entry(name).into());
    }
    Ok(())
}

/// Unpack an application tarball to a temporary directory.
///
/// Every member name is checked before anything is extracted.
pub fn unpack_app_tarball(path: &Path) -> Result<UnpackedApp> {
    let mut archive = open_archive(path)?;
    for entry in archive
        .entries()
        .with_context(|| format!("{} is not a tar file", path.display()))?
    {
        let entry = entry.context("Failed to read tarball entry")?;
        let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        check_member_name(&name)?;
    }

    let tempdir = tempfile::Builder::new()
        .prefix("batis-unpack-")
        .tempdir()
        .context("Failed to create temporary directory")?;
    debug!("Unpacking {:?} to {:?}", path, tempdir.path());
    open_archive(path)?
        .unpack(tempdir.path())
        .with_context(|| format!("Failed to extract {}", path.display()))?;

    let root = find_app_root(tempdir.path())?
        .ok_or_else(|| Error::missing_batis_info(path.display().to_string()))?;

    Ok(UnpackedApp {
        _tempdir: tempdir,
        root,
    })
}

/// The extraction directory itself, or its only child, if it holds `batis_info`
fn find_app_root(target: &Path) -> Result<Option<PathBuf>> {
    if target.join(BATIS_INFO_DIR).is_dir() {
        return Ok(Some(target.to_path_buf()));
    }

    let contents: Vec<PathBuf> = fs::read_dir(target)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    if let [only] = contents.as_slice() {
        if only.join(BATIS_INFO_DIR).is_dir() {
            return Ok(Some(only.clone()));
        }
    }
    Ok(None)
}

/// Options for [`pack_tarball`]
#[derive(Debug, Clone, Default)]
pub struct PackOptions {
    /// Output file, `./<name>.app.tar.gz` by default
    pub output: Option<PathBuf>,
    /// Top-level directory name, the source directory's name by default
    pub name: Option<String>,
    /// Add an `install.sh` launcher
    pub install_script: bool,
}

/// Pack an application directory into a tarball, returning its path
pub fn pack_tarball(directory: &Path, options: &PackOptions) -> Result<PathBuf> {
    let directory = std::path::absolute(directory)
        .with_context(|| format!("Invalid directory {}", directory.display()))?;
    let name = match &options.name {
        Some(name) => name.clone(),
        None => directory
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("{} has no directory name", directory.display()))?,
    };

    let output = options
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}{}", name, TARBALL_SUFFIX)));
    if output.exists() {
        fs::remove_file(&output)
            .with_context(|| format!("Failed to replace {}", output.display()))?;
    }

    info!("Creating tarball {}", output.display());
    // Built outside the source tree, so an output path inside it is never archived
    let staging = tempfile::Builder::new()
        .prefix("batis-pack-")
        .tempfile()
        .context("Failed to create temporary tarball")?;
    let file = staging.reopen().context("Failed to open temporary tarball")?;
    let mut tar = Builder::new(GzEncoder::new(file, Compression::default()));
    tar.follow_symlinks(false);
    tar.append_dir_all(&name, &directory)
        .with_context(|| format!("Failed to add {} to tarball", directory.display()))?;

    if options.install_script {
        info!("Adding install.sh script");
        let mut header = Header::new_gnu();
        header.set_size(INSTALL_SCRIPT.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        tar.append_data(
            &mut header,
            format!("{}/install.sh", name),
            INSTALL_SCRIPT.as_bytes(),
        )?;
    }

    tar.into_inner()
        .and_then(|encoder| encoder.finish())
        .context("Failed to finish tarball")?;

    fs::copy(staging.path(), &output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    Ok(output)
}
