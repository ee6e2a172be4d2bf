//! Workbook fetcher with an ordered URL fallback chain and a single-slot cache
//!
//! Download attempts run strictly in order and the loop exits at the first
//! success. The cache file always reflects the most recent successful
//! download, never a partial one; it is only read back when the network is
//! entirely unavailable.

use crate::config::PipelineConfig;
use crate::error::IngestError;
use reqwest::blocking::Client;
use reqwest::header::{CACHE_CONTROL, USER_AGENT};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How much of a failing response body is kept for diagnostics.
const BODY_PREVIEW_CHARS: usize = 200;

/// Substitute the file identifier into a download URL template.
pub fn expand_template(template: &str, file_id: &str) -> String {
    template.replace("{id}", file_id)
}

pub struct WorkbookFetcher {
    client: Client,
    index_url: String,
    url_templates: Vec<String>,
    cache_path: PathBuf,
    user_agent: String,
}

impl WorkbookFetcher {
    pub fn new(config: &PipelineConfig) -> Result<Self, IngestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            index_url: config.index_url.clone(),
            url_templates: config.download_url_templates.clone(),
            cache_path: config.cache_path.clone(),
            user_agent: config.user_agent.clone(),
        })
    }

    /// Fetch the file index CSV.
    pub fn fetch_index(&self) -> Result<String, IngestError> {
        debug!(url = %self.index_url, "fetching file index");
        let response = self
            .client
            .get(&self.index_url)
            .header(USER_AGENT, &self.user_agent)
            .header(CACHE_CONTROL, "no-store")
            .send()?
            .error_for_status()?;
        let text = response.text()?;
        debug!(bytes = text.len(), "index CSV fetched");
        Ok(text)
    }

    /// Download the workbook for `file_id`, falling back to the cached copy
    /// if every URL template fails.
    pub fn download(&self, file_id: &str) -> Result<Vec<u8>, IngestError> {
        match self.download_from_network(file_id) {
            Ok(bytes) => Ok(bytes),
            Err(IngestError::AllDownloadsFailed { last_error }) => {
                warn!(%last_error, "all download URLs failed, trying cached workbook");
                self.read_cache_or(last_error)
            }
            Err(other) => Err(other),
        }
    }

    /// Try every URL template in order; first success status wins.
    fn download_from_network(&self, file_id: &str) -> Result<Vec<u8>, IngestError> {
        let mut last_error = String::from("no download URLs configured");

        for (attempt, template) in self.url_templates.iter().enumerate() {
            let url = expand_template(template, file_id);
            debug!(attempt = attempt + 1, total = self.url_templates.len(), %url, "trying download URL");

            match self.try_url(&url) {
                Ok(bytes) => {
                    info!(bytes = bytes.len(), %url, "workbook downloaded");
                    // Persist before returning; a write failure must not
                    // fail the fetch.
                    self.write_cache(&bytes);
                    return Ok(bytes);
                }
                Err(reason) => {
                    warn!(attempt = attempt + 1, %reason, "download attempt failed");
                    last_error = reason;
                }
            }
        }

        Err(IngestError::AllDownloadsFailed { last_error })
    }

    fn try_url(&self, url: &str) -> Result<Vec<u8>, String> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if status.is_success() {
            let bytes = response.bytes().map_err(|e| e.to_string())?;
            Ok(bytes.to_vec())
        } else {
            // Body read only for a diagnostic preview, then discarded.
            let body = response.text().unwrap_or_default();
            let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
            Err(format!("status {status}: {preview}"))
        }
    }

    fn write_cache(&self, bytes: &[u8]) {
        if let Err(e) = fs::write(&self.cache_path, bytes) {
            warn!(path = %self.cache_path.display(), error = %e, "failed to persist workbook cache");
        } else {
            debug!(path = %self.cache_path.display(), bytes = bytes.len(), "workbook cache updated");
        }
    }

    /// Read the cached workbook directly. Used when the index yields no
    /// candidate file at all.
    pub fn read_cache(&self) -> Result<Vec<u8>, IngestError> {
        let bytes = fs::read(&self.cache_path)?;
        info!(path = %self.cache_path.display(), bytes = bytes.len(), "serving cached workbook");
        Ok(bytes)
    }

    fn read_cache_or(&self, network_error: String) -> Result<Vec<u8>, IngestError> {
        match fs::read(&self.cache_path) {
            Ok(bytes) => {
                info!(path = %self.cache_path.display(), bytes = bytes.len(), "serving cached workbook");
                Ok(bytes)
            }
            Err(cache_err) => Err(IngestError::CacheUnavailable {
                network: network_error,
                cache: cache_err.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fetcher_with(cache_path: PathBuf, templates: Vec<String>) -> WorkbookFetcher {
        let config = PipelineConfig {
            cache_path,
            download_url_templates: templates,
            ..PipelineConfig::default()
        };
        WorkbookFetcher::new(&config).unwrap()
    }

    #[test]
    fn template_expansion_replaces_id() {
        assert_eq!(
            expand_template("https://drive.google.com/uc?export=download&id={id}", "abc123"),
            "https://drive.google.com/uc?export=download&id=abc123"
        );
    }

    #[test]
    fn cache_roundtrip() {
        let dir = TempDir::new().unwrap();
        let cache = dir.path().join("attendance-latest.xlsx");
        let fetcher = fetcher_with(cache.clone(), Vec::new());

        fetcher.write_cache(b"workbook bytes");
        assert_eq!(fetcher.read_cache().unwrap(), b"workbook bytes");

        // Last writer wins.
        fetcher.write_cache(b"newer");
        assert_eq!(fetcher.read_cache().unwrap(), b"newer");
    }

    #[test]
    fn empty_template_list_falls_back_to_cache() {
        let dir = TempDir::new().unwrap();
        let cache = dir.path().join("attendance-latest.xlsx");
        std::fs::write(&cache, b"cached copy").unwrap();

        let fetcher = fetcher_with(cache, Vec::new());
        assert_eq!(fetcher.download("any-id").unwrap(), b"cached copy");
    }

    #[test]
    fn missing_cache_surfaces_both_errors() {
        let dir = TempDir::new().unwrap();
        let fetcher = fetcher_with(dir.path().join("never-written.xlsx"), Vec::new());

        let err = fetcher.download("any-id").unwrap_err();
        assert_eq!(err.status_code(), 502);
        match err {
            IngestError::CacheUnavailable { network, cache } => {
                assert!(network.contains("no download URLs configured"));
                assert!(!cache.is_empty());
            }
            other => panic!("expected CacheUnavailable, got {other:?}"),
        }
    }
}
