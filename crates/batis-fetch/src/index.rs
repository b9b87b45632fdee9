//! Locating and loading `batis_index.json`

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use batis_core::types::{IndexDocument, INDEX_FILENAME};
use serde_json::Value;
use tracing::debug;

use crate::download::Downloader;

/// Normalise a user-supplied index location to an HTTPS URL.
///
/// `example.com/app` becomes `https://example.com/app/batis_index.json`;
/// `http://` is upgraded to `https://`; URLs ending in `.json` keep their
/// file name.
pub fn prepare_index_url(url: &str) -> String {
    let mut url = if !url.contains("//") {
        format!("https://{}", url)
    } else if let Some(rest) = url.strip_prefix("http://") {
        format!("https://{}", rest)
    } else {
        url.to_string()
    };

    if !url.ends_with(".json") {
        url = format!("{}/{}", url.trim_end_matches('/'), INDEX_FILENAME);
    }
    url
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load an index as raw JSON from a local file or from its URL
pub async fn load_index(downloader: &Downloader, path_or_url: &str) -> Result<Value> {
    let path = Path::new(path_or_url);
    if !is_http_url(path_or_url) && path.is_file() {
        debug!("Reading index from {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        return serde_json::from_str(&content)
            .with_context(|| format!("{} is not valid JSON", path.display()));
    }

    downloader.get_json(&prepare_index_url(path_or_url)).await
}

/// Fetch and parse the index at an already prepared URL
pub async fn fetch_index(downloader: &Downloader, url: &str) -> Result<IndexDocument> {
    downloader
        .get_json::<IndexDocument>(url)
        .await
        .with_context(|| format!("Failed to load index from {}", url))
}
