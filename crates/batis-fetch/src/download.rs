//! Downloads with progress tracking and SHA-512 verification
//!
//! # Example
//!
//! ```no_run
//! use batis_core::types::NetworkConfig;
//! use batis_fetch::Downloader;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let downloader = Downloader::new(&NetworkConfig::default())?;
//!     let result = downloader
//!         .download_to("https://example.com/app.app.tar.gz", "/tmp/app.tar.gz".as_ref())
//!         .await?;
//!
//!     println!("Downloaded {} bytes, sha512 {}", result.size, result.sha512);
//!     Ok(())
//! }
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use batis_core::types::NetworkConfig;
use batis_core::Error;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::CONTENT_LENGTH;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha512};
use tracing::{debug, info};

/// Result of a download
#[derive(Debug, Clone)]
pub struct DownloadResult {
    /// Where the data was written
    pub path: PathBuf,

    /// Bytes received
    pub size: u64,

    /// Lowercase hex SHA-512 of the data
    pub sha512: String,
}

impl DownloadResult {
    /// Check the download against a published hash (case-insensitive)
    pub fn verify_sha512(&self, expected: &str) -> batis_core::Result<()> {
        if self.sha512.eq_ignore_ascii_case(expected) {
            Ok(())
        } else {
            Err(Error::checksum_mismatch(expected, &self.sha512))
        }
    }
}

/// HTTP client for indices and application tarballs
#[derive(Debug, Clone)]
pub struct Downloader {
    client: reqwest::Client,
    download_timeout: Duration,
    write_buffer: usize,
    show_progress: bool,
}

impl Downloader {
    /// Create a downloader using the configured timeouts and user agent
    pub fn new(network: &NetworkConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&network.user_agent)
            .connect_timeout(Duration::from_secs(network.http_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            download_timeout: Duration::from_secs(network.download_timeout_secs),
            write_buffer: network.download_chunk_size.max(1),
            show_progress: true,
        })
    }

    /// Enable or disable the progress bar
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// GET `url` and parse the body as JSON
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("Fetching {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?
            .error_for_status()
            .with_context(|| format!("Failed to fetch {}", url))?;

        response
            .json::<T>()
            .await
            .with_context(|| format!("Invalid JSON from {}", url))
    }

    /// Stream `url` into `target`, hashing as it arrives
    pub async fn download_to(&self, url: &str, target: &Path) -> Result<DownloadResult> {
        info!("Downloading {}", url);
        let response = self
            .client
            .get(url)
            .timeout(self.download_timeout)
            .send()
            .await
            .context("Failed to send download request")?
            .error_for_status()
            .with_context(|| format!("Download of {} failed", url))?;

        let total_size = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|len| len.to_str().ok())
            .and_then(|len| len.parse::<u64>().ok());
        let progress = self.show_progress.then(|| progress_bar(total_size));

        let file = File::create(target)
            .with_context(|| format!("Failed to create {}", target.display()))?;
        // Disk writes happen in `download-chunk-size` blocks
        let mut file = BufWriter::with_capacity(self.write_buffer, file);
        let mut hasher = Sha512::new();
        let mut received = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("Failed to read download chunk")?;
            file.write_all(&chunk)
                .with_context(|| format!("Failed to write {}", target.display()))?;
            hasher.update(&chunk);
            received += chunk.len() as u64;

            if let Some(pb) = &progress {
                pb.set_position(received);
            }
        }
        file.flush()
            .with_context(|| format!("Failed to write {}", target.display()))?;

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        let sha512 = format!("{:x}", hasher.finalize());
        debug!("Downloaded {} bytes, sha512 {}", received, sha512);

        Ok(DownloadResult {
            path: target.to_path_buf(),
            size: received,
            sha512,
        })
    }
}

fn progress_bar(total_size: Option<u64>) -> ProgressBar {
    match total_size {
        Some(total) => {
            let pb = ProgressBar::new(total);
            if let Ok(style) = ProgressStyle::default_bar().template(
                "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
            ) {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb
        }
        None => ProgressBar::new_spinner(),
    }
}
