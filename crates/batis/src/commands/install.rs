//! Install command

use anyhow::Result;
use batis_core::{InstallScheme, SchemeKind};
use batis_fetch::UrlInstaller;
use tracing::debug;

use super::{load_runtime_config, print_install_report, reporter};
use crate::cli::InstallArgs;

pub async fn run(args: InstallArgs, scheme: Option<SchemeKind>) -> Result<()> {
    let config = load_runtime_config()?;
    let scheme = InstallScheme::for_kind(scheme.unwrap_or(SchemeKind::User))?;
    debug!("Installing from {} into the {} scheme", args.url, scheme.kind);

    let mut reporter = reporter(args.backend);
    let report = UrlInstaller::new(scheme, config)?
        .with_progress(!args.backend)
        .install(&args.url, &mut reporter)
        .await?;

    print_install_report(&report, args.backend);
    Ok(())
}
