//! Verify an application tarball or directory

use anyhow::Result;
use batis_apps::verify_tarball_or_directory;

use super::report_problems;
use crate::cli::VerifyArgs;

pub fn run(args: VerifyArgs) -> Result<()> {
    let problems = verify_tarball_or_directory(&args.path)?;
    report_problems(&problems, &args.path.display().to_string());
    Ok(())
}
