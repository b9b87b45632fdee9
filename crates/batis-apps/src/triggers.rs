//! Cache-rebuild triggers
//!
//! Installing or removing desktop files, MIME packages and icons leaves the
//! desktop's caches stale. The external `xdg-*`/`update-*` tools that fix
//! this are best-effort: a failure is reported back as a [`TriggerOutcome`]
//! and turned into a warning, never an error.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::{debug, warn};

/// Runs an external command and reports its exit code
///
/// Implementations other than [`SystemRunner`] exist so tests can record
/// the commands instead of touching the real desktop caches.
pub trait CommandRunner: Send + Sync {
    /// Run `argv`, returning the exit code or a message if it could not start
    fn run(&self, argv: &[String]) -> Result<Option<i32>, String>;
}

/// Runs commands on the host
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, argv: &[String]) -> Result<Option<i32>, String> {
        let (program, args) = argv.split_first().ok_or("empty command")?;
        debug!("Running {}", argv.join(" "));
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .status()
            .map(|status| status.code())
            .map_err(|e| format!("{}: {}", program, e))
    }
}

/// A cache that needs rebuilding
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Trigger {
    /// `update-desktop-database <dir>`
    DesktopDatabase(PathBuf),
    /// `update-mime-database <dir>`
    MimeDatabase(PathBuf),
    /// `xdg-icon-resource forceupdate --theme <theme>`
    IconCache(String),
}

impl Trigger {
    pub fn argv(&self) -> Vec<String> {
        match self {
            Trigger::DesktopDatabase(dir) => vec![
                "update-desktop-database".to_string(),
                dir.to_string_lossy().into_owned(),
            ],
            Trigger::MimeDatabase(dir) => vec![
                "update-mime-database".to_string(),
                dir.to_string_lossy().into_owned(),
            ],
            Trigger::IconCache(theme) => vec![
                "xdg-icon-resource".to_string(),
                "forceupdate".to_string(),
                "--theme".to_string(),
                theme.clone(),
            ],
        }
    }

    /// Run this trigger, never failing
    pub fn fire(&self, runner: &dyn CommandRunner) -> TriggerOutcome {
        let status = match runner.run(&self.argv()) {
            Ok(Some(0)) => TriggerStatus::Succeeded,
            Ok(code) => TriggerStatus::Failed(code),
            Err(message) => TriggerStatus::Unavailable(message),
        };
        let outcome = TriggerOutcome {
            trigger: self.clone(),
            status,
        };
        if let Some(warning) = outcome.warning() {
            warn!("{}", warning);
        }
        outcome
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv().join(" "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerStatus {
    Succeeded,
    /// Ran but exited non-zero (`None` when killed by a signal)
    Failed(Option<i32>),
    /// Could not be started, usually because the tool is not installed
    Unavailable(String),
}

/// What happened when a trigger was fired
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerOutcome {
    pub trigger: Trigger,
    pub status: TriggerStatus,
}

impl TriggerOutcome {
    pub fn succeeded(&self) -> bool {
        self.status == TriggerStatus::Succeeded
    }

    /// Human-readable warning for a failed trigger
    pub fn warning(&self) -> Option<String> {
        match &self.status {
            TriggerStatus::Succeeded => None,
            TriggerStatus::Failed(Some(code)) => {
                Some(format!("`{}` exited with status {}", self.trigger, code))
            }
            TriggerStatus::Failed(None) => {
                Some(format!("`{}` was terminated by a signal", self.trigger))
            }
            TriggerStatus::Unavailable(message) => {
                Some(format!("Could not run `{}`: {}", self.trigger, message))
            }
        }
    }
}

/// Collect the warnings of every failed trigger
pub fn collect_warnings(outcomes: &[TriggerOutcome]) -> Vec<String> {
    outcomes.iter().filter_map(TriggerOutcome::warning).collect()
}

/// Caches touched by a set of removed files
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PendingTriggers {
    pub desktop: Option<PathBuf>,
    pub mime: Option<PathBuf>,
    pub icon_themes: BTreeSet<String>,
}

impl PendingTriggers {
    pub fn is_empty(&self) -> bool {
        self.desktop.is_none() && self.mime.is_none() && self.icon_themes.is_empty()
    }

    /// Desktop database first, then MIME, then one icon update per theme
    pub fn triggers(&self) -> Vec<Trigger> {
        let mut triggers = Vec::new();
        if let Some(dir) = &self.desktop {
            triggers.push(Trigger::DesktopDatabase(dir.clone()));
        }
        if let Some(dir) = &self.mime {
            triggers.push(Trigger::MimeDatabase(dir.clone()));
        }
        triggers.extend(self.icon_themes.iter().cloned().map(Trigger::IconCache));
        triggers
    }

    pub fn fire_all(&self, runner: &dyn CommandRunner) -> Vec<TriggerOutcome> {
        self.triggers().iter().map(|t| t.fire(runner)).collect()
    }
}
