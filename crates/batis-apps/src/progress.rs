//! Install progress reporting
//!
//! In backend mode the installer writes one `step: <name>` line per step,
//! `problem: <step>: <reason>` for soft failures and `finished` at the end,
//! so a supervising process can follow along without parsing log output.

use std::fmt;
use std::io::{self, Write};

use tracing::info;

/// The steps of a full install, in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstallStep {
    SystemPackages,
    CopyDir,
    InstallCommands,
    InstallIcons,
    InstallMimetypes,
    InstallDesktop,
    WriteManifest,
}

impl InstallStep {
    pub const ALL: [InstallStep; 7] = [
        InstallStep::SystemPackages,
        InstallStep::CopyDir,
        InstallStep::InstallCommands,
        InstallStep::InstallIcons,
        InstallStep::InstallMimetypes,
        InstallStep::InstallDesktop,
        InstallStep::WriteManifest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InstallStep::SystemPackages => "system_packages",
            InstallStep::CopyDir => "copy_dir",
            InstallStep::InstallCommands => "install_commands",
            InstallStep::InstallIcons => "install_icons",
            InstallStep::InstallMimetypes => "install_mimetypes",
            InstallStep::InstallDesktop => "install_desktop",
            InstallStep::WriteManifest => "write_manifest",
        }
    }
}

impl fmt::Display for InstallStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A soft failure of one install step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepProblem {
    pub step: InstallStep,
    pub reason: String,
}

impl fmt::Display for StepProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.step, self.reason)
    }
}

/// Where progress goes
pub enum StepReporter {
    /// Steps are logged at info level
    Log,
    /// Machine-readable lines for a supervising process
    Backend(Box<dyn Write + Send>),
}

impl StepReporter {
    /// Backend reporter writing to stdout
    pub fn backend_stdout() -> Self {
        StepReporter::Backend(Box::new(io::stdout()))
    }

    pub fn is_backend(&self) -> bool {
        matches!(self, StepReporter::Backend(_))
    }

    pub fn step(&mut self, step: InstallStep) {
        match self {
            StepReporter::Log => info!("Step: {}", step),
            StepReporter::Backend(out) => emit(out, &format!("step: {}", step)),
        }
    }

    pub fn problem(&mut self, problem: &StepProblem) {
        if let StepReporter::Backend(out) = self {
            emit(out, &format!("problem: {}", problem));
        }
    }

    pub fn finished(&mut self) {
        match self {
            StepReporter::Log => info!("Installation finished"),
            StepReporter::Backend(out) => emit(out, "finished"),
        }
    }
}

impl fmt::Debug for StepReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepReporter::Log => f.write_str("StepReporter::Log"),
            StepReporter::Backend(_) => f.write_str("StepReporter::Backend"),
        }
    }
}

// A closed pipe means the supervisor went away; the install carries on.
fn emit(out: &mut Box<dyn Write + Send>, line: &str) {
    let _ = writeln!(out, "{}", line).and_then(|_| out.flush());
}
