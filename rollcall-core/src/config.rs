//! Pipeline configuration loaded from TOML

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for one ingestion pipeline instance.
///
/// Every field carries a default so a partial TOML file (or none at all)
/// still yields a usable configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// CSV export URL treated as the file index.
    pub index_url: String,
    /// Download URL templates tried strictly in order; `{id}` is replaced
    /// by the file identifier.
    pub download_url_templates: Vec<String>,
    /// Single-slot cache of the last successfully downloaded workbook.
    pub cache_path: PathBuf,
    /// Browser-like User-Agent sent with every request; some drive hosts
    /// refuse the default client string.
    pub user_agent: String,
    /// How many leading rows are scanned for the header anchor.
    pub header_scan_rows: u32,
    /// Cap on materialized data rows.
    pub max_rows: u32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            index_url: String::new(),
            download_url_templates: vec![
                "https://drive.google.com/uc?export=download&id={id}".to_string(),
                "https://www.googleapis.com/drive/v3/files/{id}?alt=media".to_string(),
                "https://drive.google.com/u/0/uc?id={id}&export=download".to_string(),
            ],
            cache_path: PathBuf::from("attendance-latest.xlsx"),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            header_scan_rows: 20,
            max_rows: 1000,
            timeout_secs: 30,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: PipelineConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_three_download_templates() {
        let config = PipelineConfig::default();
        assert_eq!(config.download_url_templates.len(), 3);
        assert!(
            config
                .download_url_templates
                .iter()
                .all(|t| t.contains("{id}"))
        );
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: PipelineConfig =
            toml::from_str("index_url = \"https://example.com/index.csv\"").unwrap();
        assert_eq!(config.index_url, "https://example.com/index.csv");
        assert_eq!(config.header_scan_rows, 20);
        assert_eq!(config.max_rows, 1000);
        assert_eq!(config.cache_path, PathBuf::from("attendance-latest.xlsx"));
    }
}
