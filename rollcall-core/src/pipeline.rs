//! End-to-end orchestration of one ingestion request
//!
//! Request-scoped and sequential: index fetch, locate, download with
//! fallback, parse, classify. There is no cancellation and no retry layer
//! beyond the fetcher's bounded URL chain; the sequence runs to completion
//! or to the first error.

use crate::classify;
use crate::config::PipelineConfig;
use crate::error::IngestError;
use crate::fetch::WorkbookFetcher;
use crate::index;
use crate::reader;
use crate::report::AttendanceReport;
use crate::resolve;
use tracing::{info, warn};

pub struct Pipeline {
    config: PipelineConfig,
    fetcher: WorkbookFetcher,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, IngestError> {
        let fetcher = WorkbookFetcher::new(&config)?;
        Ok(Self { config, fetcher })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full chain and produce the report envelope.
    pub fn run(&self) -> Result<AttendanceReport, IngestError> {
        info!("ingestion started");
        let csv_text = self.fetcher.fetch_index()?;

        let bytes = match index::locate_latest(&csv_text) {
            Ok(file_id) => self.fetcher.download(&file_id)?,
            Err(IngestError::NoIndexEntry) => {
                // Recoverable only if a previous download left a cache behind.
                warn!("no synced file in index, trying cached workbook");
                self.fetcher.read_cache().map_err(|cache_err| {
                    IngestError::CacheUnavailable {
                        network: IngestError::NoIndexEntry.to_string(),
                        cache: cache_err.to_string(),
                    }
                })?
            }
            Err(other) => return Err(other),
        };

        self.ingest_bytes(&bytes)
    }

    /// Parse and classify a workbook already in memory. Used by [`run`] and
    /// for ingesting a local file without touching the network.
    ///
    /// [`run`]: Pipeline::run
    pub fn ingest_bytes(&self, bytes: &[u8]) -> Result<AttendanceReport, IngestError> {
        let sheet = reader::read_workbook_bytes(bytes)?;
        let table = resolve::resolve(&sheet, self.config.header_scan_rows, self.config.max_rows)?;
        let summary = classify::aggregate(&table)?;
        info!(
            last_updated = %summary.date_of_record,
            total_employees = summary.total_rows,
            "ingestion complete"
        );
        Ok(AttendanceReport::from_summary(&summary))
    }
}
