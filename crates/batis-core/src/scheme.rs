//! Install schemes
//!
//! A scheme maps each destination category an install writes to onto an
//! absolute directory. The user scheme follows the XDG base directory
//! layout, the system scheme uses the usual shared locations under
//! `/usr/local` and `/opt`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::utils::{get_home_dir, xdg_data_home};

/// Which set of destinations to install into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemeKind {
    User,
    System,
}

impl SchemeKind {
    /// Order in which installed applications are looked up
    pub const SEARCH_ORDER: [SchemeKind; 2] = [SchemeKind::User, SchemeKind::System];

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemeKind::User => "user",
            SchemeKind::System => "system",
        }
    }
}

impl fmt::Display for SchemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(SchemeKind::User),
            "system" => Ok(SchemeKind::System),
            other => Err(Error::invalid_config(format!(
                "Unknown install scheme: {other}"
            ))),
        }
    }
}

/// Destination directories for one install or uninstall run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallScheme {
    pub kind: SchemeKind,
    /// Parent of installed application directories
    pub application: PathBuf,
    /// Where command symlinks go
    pub commands: PathBuf,
    /// `.desktop` files
    pub desktop: PathBuf,
    /// Root of the icon theme tree
    pub icons: PathBuf,
    /// Root of the shared MIME database
    pub mimetypes: PathBuf,
}

impl InstallScheme {
    /// Resolve the scheme from the current environment
    pub fn for_kind(kind: SchemeKind) -> Result<Self> {
        match kind {
            SchemeKind::User => Self::user(),
            SchemeKind::System => Ok(Self::system()),
        }
    }

    fn user() -> Result<Self> {
        let data = xdg_data_home().map_err(|e| Error::invalid_config(e.to_string()))?;
        let home = get_home_dir().map_err(|e| Error::invalid_config(e.to_string()))?;
        Ok(Self {
            kind: SchemeKind::User,
            application: data.join("installed-applications"),
            commands: home.join(".local").join("bin"),
            desktop: data.join("applications"),
            icons: data.join("icons"),
            mimetypes: data.join("mime"),
        })
    }

    fn system() -> Self {
        let share = Path::new("/usr/local/share");
        Self {
            kind: SchemeKind::System,
            application: PathBuf::from("/opt"),
            commands: PathBuf::from("/usr/local/bin"),
            desktop: share.join("applications"),
            icons: share.join("icons"),
            mimetypes: share.join("mime"),
        }
    }

    /// Every category rooted under one directory, for tests and staging
    pub fn rooted_at(kind: SchemeKind, root: &Path) -> Self {
        Self {
            kind,
            application: root.join("installed-applications"),
            commands: root.join("bin"),
            desktop: root.join("applications"),
            icons: root.join("icons"),
            mimetypes: root.join("mime"),
        }
    }

    /// Where MIME package XML files are copied
    pub fn mime_packages(&self) -> PathBuf {
        self.mimetypes.join("packages")
    }

    /// Directory an application with this directory name installs to
    pub fn application_dir(&self, dir_name: &str) -> PathBuf {
        self.application.join(dir_name)
    }
}
