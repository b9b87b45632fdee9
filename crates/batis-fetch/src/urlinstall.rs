//! Install an application from an index URL
//!
//! Fetch the index, pick the latest build for this machine, download it
//! (checking its SHA-512 when the index publishes one) and install the
//! tarball.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use batis_apps::{ApplicationInstaller, CommandRunner, InstallReport, StepReporter};
use batis_core::types::BuildDescriptor;
use batis_core::{Error, InstallScheme, RuntimeConfig};
use batis_distro::{DistroSelector, HostPlatform};
use tracing::{debug, info};

use crate::download::Downloader;
use crate::index::{fetch_index, prepare_index_url};
use crate::select::{filter_eligible, select_latest};

/// File name of the downloaded tarball inside its temporary directory
const DOWNLOAD_NAME: &str = "app.tar.gz";

/// Installs applications published with a `batis_index.json`
pub struct UrlInstaller {
    downloader: Downloader,
    platform: HostPlatform,
    scheme: InstallScheme,
    config: RuntimeConfig,
    runner: Option<Arc<dyn CommandRunner>>,
    distro: Option<DistroSelector>,
}

impl UrlInstaller {
    pub fn new(scheme: InstallScheme, config: RuntimeConfig) -> Result<Self> {
        Ok(Self {
            downloader: Downloader::new(&config.network)?,
            platform: HostPlatform::detect(),
            scheme,
            config,
            runner: None,
            distro: None,
        })
    }

    /// Select builds for `platform` instead of this machine
    pub fn with_platform(mut self, platform: HostPlatform) -> Self {
        self.platform = platform;
        self
    }

    /// Enable or disable the download progress bar
    pub fn with_progress(mut self, show: bool) -> Self {
        self.downloader = self.downloader.with_progress(show);
        self
    }

    /// Use `runner` for cache-rebuild commands
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    /// Use an already detected distro instead of probing the system
    pub fn with_distro(mut self, distro: DistroSelector) -> Self {
        self.distro = Some(distro);
        self
    }

    /// The build that would be installed from the index at `index_url`
    pub async fn choose_build(&self, index_url: &str) -> Result<BuildDescriptor> {
        let index = fetch_index(&self.downloader, index_url).await?;
        let eligible = filter_eligible(&index.builds, &self.platform)?;
        let build = select_latest(eligible)
            .cloned()
            .ok_or_else(|| Error::no_eligible_build(&self.platform.kernel, &self.platform.arch))?;
        info!("Selected {} version {}", build.url, build.version);
        Ok(build)
    }

    /// Install from a user-supplied location; see [`prepare_index_url`]
    pub async fn install(self, url: &str, reporter: &mut StepReporter) -> Result<InstallReport> {
        let index_url = prepare_index_url(url);
        self.install_from_index(&index_url, reporter).await
    }

    /// Install from the index at exactly `index_url`
    pub async fn install_from_index(
        self,
        index_url: &str,
        reporter: &mut StepReporter,
    ) -> Result<InstallReport> {
        let build = self.choose_build(index_url).await?;
        if build.sha512.is_none() && !build.is_https() {
            return Err(Error::insecure_download(&build.url).into());
        }

        let tempdir = tempfile::Builder::new()
            .prefix("batis-download-")
            .tempdir()
            .context("Failed to create temporary directory")?;
        let tarball = tempdir.path().join(DOWNLOAD_NAME);

        let download = self.downloader.download_to(&build.url, &tarball).await?;
        match &build.sha512 {
            Some(expected) => {
                download.verify_sha512(expected)?;
                debug!("SHA-512 matches for {}", build.url);
            }
            None => debug!("No SHA-512 published; relying on HTTPS"),
        }

        // The install itself is blocking filesystem and process work
        let Self {
            scheme,
            config,
            runner,
            distro,
            ..
        } = self;
        let mut owned_reporter = std::mem::replace(reporter, StepReporter::Log);
        let (result, owned_reporter) = tokio::task::spawn_blocking(move || {
            let result = install_tarball(
                &tarball,
                scheme,
                &config,
                runner,
                distro,
                &mut owned_reporter,
            );
            (result, owned_reporter)
        })
        .await
        .context("Install task failed")?;
        *reporter = owned_reporter;
        drop(tempdir);
        result
    }
}

fn install_tarball(
    tarball: &Path,
    scheme: InstallScheme,
    config: &RuntimeConfig,
    runner: Option<Arc<dyn CommandRunner>>,
    distro: Option<DistroSelector>,
    reporter: &mut StepReporter,
) -> Result<InstallReport> {
    let mut installer = ApplicationInstaller::new(tarball, scheme, config)?;
    if let Some(runner) = runner {
        installer = installer.with_runner(runner);
    }
    if let Some(distro) = distro {
        installer = installer.with_distro(distro);
    }
    installer.install(reporter)
}
