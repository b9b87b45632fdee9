//! Verify a batis_index.json file

use anyhow::Result;
use batis_fetch::{load_index, Downloader, IndexVerifier};

use super::{load_runtime_config, report_problems};
use crate::cli::VerifyIndexArgs;

pub async fn run(args: VerifyIndexArgs) -> Result<()> {
    let config = load_runtime_config()?;
    let downloader = Downloader::new(&config.network)?;

    let contents = load_index(&downloader, &args.url).await?;
    let problems = IndexVerifier::new(&contents).verify();
    report_problems(&problems, &args.url);
    Ok(())
}
