//! Install a local tarball or directory

use anyhow::Result;
use batis_apps::ApplicationInstaller;
use batis_core::{InstallScheme, SchemeKind};
use tracing::debug;

use super::{load_runtime_config, print_install_report, reporter};
use crate::cli::InstallTarArgs;

pub fn run(args: InstallTarArgs, scheme: Option<SchemeKind>) -> Result<()> {
    let config = load_runtime_config()?;
    let scheme = InstallScheme::for_kind(scheme.unwrap_or(SchemeKind::User))?;
    debug!("Installing {:?} into the {} scheme", args.path, scheme.kind);

    let mut reporter = reporter(args.backend);
    let report = ApplicationInstaller::new(&args.path, scheme, &config)?.install(&mut reporter)?;

    print_install_report(&report, args.backend);
    Ok(())
}
