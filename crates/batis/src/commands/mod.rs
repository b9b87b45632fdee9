//! CLI command implementations

pub mod completions;
pub mod install;
pub mod installtar;
pub mod list;
pub mod pack;
pub mod uninstall;
pub mod verify;
pub mod verify_index;

use anyhow::{Context, Result};
use batis_apps::{InstallReport, StepReporter};
use batis_core::{ConfigLoader, InstallScheme, RuntimeConfig, SchemeKind};

use crate::output;

/// Load the runtime configuration from defaults, config file and environment
pub(crate) fn load_runtime_config() -> Result<RuntimeConfig> {
    ConfigLoader::new()
        .context("Failed to locate configuration directory")?
        .load_runtime_config()
        .context("Failed to load runtime config")
}

/// Schemes to search: the one asked for, else user then system
pub(crate) fn schemes_for(kind: Option<SchemeKind>) -> Result<Vec<InstallScheme>> {
    let kinds = match kind {
        Some(kind) => vec![kind],
        None => SchemeKind::SEARCH_ORDER.to_vec(),
    };
    kinds
        .into_iter()
        .map(|kind| InstallScheme::for_kind(kind).map_err(Into::into))
        .collect()
}

pub(crate) fn reporter(backend: bool) -> StepReporter {
    if backend {
        StepReporter::backend_stdout()
    } else {
        StepReporter::Log
    }
}

/// Tell the user how an install went; backend mode already printed its steps
pub(crate) fn print_install_report(report: &InstallReport, backend: bool) {
    if backend {
        return;
    }

    for warning in &report.warnings {
        output::warning(warning);
    }

    let name = report
        .install_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    output::header(&format!("Installed {}", name));
    output::kv("Location", &report.install_dir.display().to_string());
    output::kv("Files outside the application", &report.manifest.len().to_string());
}

/// Print verification problems and exit non-zero if there were any
pub(crate) fn report_problems(problems: &[String], subject: &str) {
    if problems.is_empty() {
        output::success(&format!("No problems found in {}", subject));
        return;
    }

    for problem in problems {
        println!("{}", problem);
    }
    println!();
    output::error(&format!("{} problems found in {}", problems.len(), subject));
    std::process::exit(1);
}
