//! Uninstall command

use std::sync::Arc;

use anyhow::Result;
use batis_apps::{uninstall_application, SystemRunner};
use batis_core::SchemeKind;

use super::schemes_for;
use crate::cli::UninstallArgs;
use crate::output;

pub fn run(args: UninstallArgs, scheme: Option<SchemeKind>) -> Result<()> {
    let schemes = schemes_for(scheme)?;
    let report = uninstall_application(&args.name, &schemes, Arc::new(SystemRunner))?;

    for warning in &report.warnings {
        output::warning(warning);
    }
    output::success(&format!("Uninstalled {}", report.appdir.display()));
    Ok(())
}
