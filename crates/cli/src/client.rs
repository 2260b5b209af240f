//! Snapshot loading from a file or an HTTP endpoint

use crate::snapshot::Snapshot;
use anyhow::{Context, Result};
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Where the snapshot comes from
#[derive(Debug, Clone)]
pub enum SnapshotSource {
    File(PathBuf),
    Url(Url),
}

impl SnapshotSource {
    /// Load the snapshot; each call replaces whatever was loaded before
    pub async fn load(&self) -> Result<Snapshot> {
        match self {
            SnapshotSource::File(path) => {
                debug!(path = %path.display(), "Reading snapshot file");
                let content = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read snapshot file {}", path.display()))?;
                Snapshot::from_json(&content)
            }
            SnapshotSource::Url(url) => SnapshotClient::new()?.fetch(url.clone()).await,
        }
    }
}

/// HTTP client for snapshot endpoints
pub struct SnapshotClient {
    client: Client,
}

impl SnapshotClient {
    /// Create a new snapshot client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Fetch a snapshot document
    pub async fn fetch(&self, url: Url) -> Result<Snapshot> {
        debug!(%url, "Fetching snapshot");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse snapshot")
    }
}

/// Parse a snapshot URL given on the command line or in the config
pub fn parse_url(value: &str) -> Result<Url> {
    Url::parse(value).context("Invalid snapshot URL")
}
