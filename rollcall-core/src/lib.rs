//! Attendance ingestion and header-resolution pipeline
//!
//! Locates the newest monthly workbook in a CSV file index, downloads it
//! through an ordered URL fallback chain backed by a single-slot cache,
//! recovers the tabular schema from the raw workbook bytes (header row
//! position, date-column format, and date-serial encoding are all unknown
//! ahead of time), and classifies every employee row into overlapping
//! organizational buckets for the reporting layer.

pub mod classify;
pub mod config;
pub mod error;
pub mod fetch;
pub mod index;
pub mod pipeline;
pub mod reader;
pub mod report;
pub mod resolve;

pub use classify::{AttendanceSummary, Bucket, Status, Tally};
pub use config::PipelineConfig;
pub use error::IngestError;
pub use pipeline::Pipeline;
pub use report::{AttendanceCounts, AttendanceReport, ErrorReport};
pub use resolve::{AttendanceRecord, ResolvedTable, StandardColumn};
