//! Error taxonomy for the ingestion pipeline

use thiserror::Error;

/// Everything that can go wrong between the index fetch and the final report.
///
/// The structural workbook failures (`HeaderNotFound`, `NoDateColumns`,
/// `EmptyFile`) are never retried: the same bad file would be fetched again.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The index CSV yielded no valid, synced candidate file.
    #[error("no synced attendance file found in the index")]
    NoIndexEntry,

    /// Every download URL failed or returned a non-success status.
    #[error("all download URLs failed; last error: {last_error}")]
    AllDownloadsFailed { last_error: String },

    /// Network download failed and the cached workbook could not be read
    /// either. Carries both causes for operator diagnosis.
    #[error("download failed ({network}); cache fallback failed ({cache})")]
    CacheUnavailable { network: String, cache: String },

    /// No row within the scan window contained the anchor column name.
    #[error("no header row containing EmployeeCode within the first {rows_scanned} rows")]
    HeaderNotFound { rows_scanned: u32 },

    /// Header resolved but zero columns classified as date columns. Carries
    /// the resolved header names and the first data row so the failure
    /// payload can show what the sheet actually looked like.
    #[error("no date columns found among {} resolved columns", columns.len())]
    NoDateColumns {
        columns: Vec<String>,
        sample_row: Vec<String>,
    },

    /// Zero data rows below the header.
    #[error("workbook contains no data rows below the header")]
    EmptyFile,

    #[error("failed to parse workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl IngestError {
    /// HTTP-style status code for the collaborating report surface.
    pub fn status_code(&self) -> u16 {
        match self {
            IngestError::HeaderNotFound { .. }
            | IngestError::NoDateColumns { .. }
            | IngestError::EmptyFile => 400,
            IngestError::AllDownloadsFailed { .. } | IngestError::CacheUnavailable { .. } => 502,
            _ => 500,
        }
    }
}
