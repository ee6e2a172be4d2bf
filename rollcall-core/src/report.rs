//! JSON envelopes consumed by the dashboard, PDF, and email collaborators

use crate::classify::{AttendanceSummary, Bucket};
use crate::error::IngestError;
use serde::Serialize;

/// Success payload of one ingestion request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceReport {
    pub success: bool,
    /// Date of record: the most recent date column of the workbook.
    pub last_updated: String,
    pub total_employees: usize,
    pub attendance: AttendanceCounts,
    pub debug: TaxonomyDebug,
}

/// De-duplicated taxonomy actually observed in the export, kept in the
/// response for debugging sheets with unexpected department or designation
/// spellings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyDebug {
    pub unique_departments: Vec<String>,
    pub unique_locations: Vec<String>,
    pub unique_designations: Vec<String>,
}

/// Flat named counters, one total/present/absent triple per bucket.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceCounts {
    pub basement_rollers_total: u32,
    pub basement_rollers_present: u32,
    pub basement_rollers_absent: u32,

    pub basement_supervisors_total: u32,
    pub basement_supervisors_present: u32,
    pub basement_supervisors_absent: u32,

    pub basement_gummers_total: u32,
    pub basement_gummers_present: u32,
    pub basement_gummers_absent: u32,

    pub first_floor_rollers_total: u32,
    pub first_floor_rollers_present: u32,
    pub first_floor_rollers_absent: u32,

    pub first_floor_supervisors_total: u32,
    pub first_floor_supervisors_present: u32,
    pub first_floor_supervisors_absent: u32,

    pub first_floor_gummers_total: u32,
    pub first_floor_gummers_present: u32,
    pub first_floor_gummers_absent: u32,

    pub supervisors_total: u32,
    pub supervisors_present: u32,
    pub supervisors_absent: u32,

    pub quality_total: u32,
    pub quality_present: u32,
    pub quality_absent: u32,

    pub packing_total: u32,
    pub packing_present: u32,
    pub packing_absent: u32,

    pub filter_makers_total: u32,
    pub filter_makers_present: u32,
    pub filter_makers_absent: u32,

    pub filter_folders_total: u32,
    pub filter_folders_present: u32,
    pub filter_folders_absent: u32,
}

impl AttendanceReport {
    pub fn from_summary(summary: &AttendanceSummary) -> Self {
        Self {
            success: true,
            last_updated: summary.date_of_record.clone(),
            total_employees: summary.total_rows,
            attendance: AttendanceCounts::from_summary(summary),
            debug: TaxonomyDebug {
                unique_departments: summary.unique_departments.clone(),
                unique_locations: summary.unique_locations.clone(),
                unique_designations: summary.unique_designations.clone(),
            },
        }
    }
}

impl AttendanceCounts {
    pub fn from_summary(summary: &AttendanceSummary) -> Self {
        let basement_rollers = summary.tally(Bucket::BasementRollers);
        let basement_supervisors = summary.tally(Bucket::BasementSupervisors);
        let basement_gummers = summary.tally(Bucket::BasementGummers);
        let first_floor_rollers = summary.tally(Bucket::FirstFloorRollers);
        let first_floor_supervisors = summary.tally(Bucket::FirstFloorSupervisors);
        let first_floor_gummers = summary.tally(Bucket::FirstFloorGummers);
        let supervisors = summary.tally(Bucket::AllSupervisors);
        let quality = summary.tally(Bucket::Quality);
        let packing = summary.tally(Bucket::Packing);
        let filter_makers = summary.tally(Bucket::FilterMakers);
        let filter_folders = summary.tally(Bucket::FilterFolders);

        Self {
            basement_rollers_total: basement_rollers.total,
            basement_rollers_present: basement_rollers.present,
            basement_rollers_absent: basement_rollers.absent,

            basement_supervisors_total: basement_supervisors.total,
            basement_supervisors_present: basement_supervisors.present,
            basement_supervisors_absent: basement_supervisors.absent,

            basement_gummers_total: basement_gummers.total,
            basement_gummers_present: basement_gummers.present,
            basement_gummers_absent: basement_gummers.absent,

            first_floor_rollers_total: first_floor_rollers.total,
            first_floor_rollers_present: first_floor_rollers.present,
            first_floor_rollers_absent: first_floor_rollers.absent,

            first_floor_supervisors_total: first_floor_supervisors.total,
            first_floor_supervisors_present: first_floor_supervisors.present,
            first_floor_supervisors_absent: first_floor_supervisors.absent,

            first_floor_gummers_total: first_floor_gummers.total,
            first_floor_gummers_present: first_floor_gummers.present,
            first_floor_gummers_absent: first_floor_gummers.absent,

            supervisors_total: supervisors.total,
            supervisors_present: supervisors.present,
            supervisors_absent: supervisors.absent,

            quality_total: quality.total,
            quality_present: quality.present,
            quality_absent: quality.absent,

            packing_total: packing.total,
            packing_present: packing.present,
            packing_absent: packing.absent,

            filter_makers_total: filter_makers.total,
            filter_makers_present: filter_makers.present,
            filter_makers_absent: filter_makers.absent,

            filter_folders_total: filter_folders.total,
            filter_folders_present: filter_folders.present,
            filter_folders_absent: filter_folders.absent,
        }
    }
}

/// Structured failure payload, verbose by design: ingestion failures are
/// expected to need human inspection of the source spreadsheet.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub error: String,
    pub message: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns_found: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_row: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ErrorReport {
    pub fn from_error(err: &IngestError) -> Self {
        let (error, suggestion, columns_found, sample_row) = match err {
            IngestError::NoDateColumns {
                columns,
                sample_row,
            } => (
                "No date columns found in workbook",
                Some(
                    "Check that the header row carries EmployeeCode, EmployeeName, \
                     DepartmentName, Designation, Location, Shift followed by date columns",
                ),
                Some(columns.clone()),
                Some(sample_row.clone()),
            ),
            IngestError::HeaderNotFound { .. } => (
                "Header row not found",
                Some(
                    "The export looks structurally incompatible; verify the sheet carries an \
                     EmployeeCode column within its leading rows",
                ),
                None,
                None,
            ),
            IngestError::EmptyFile => ("Empty file", None, None, None),
            IngestError::NoIndexEntry => ("No synced file found", None, None, None),
            IngestError::AllDownloadsFailed { .. } | IngestError::CacheUnavailable { .. } => (
                "Cannot download workbook",
                Some("Make sure the file is publicly accessible (anyone with the link can view)"),
                None,
                None,
            ),
            _ => ("Failed to fetch attendance", None, None, None),
        };

        Self {
            error: error.to_string(),
            message: err.to_string(),
            status: err.status_code(),
            columns_found,
            sample_row,
            suggestion: suggestion.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Tally;
    use std::collections::BTreeMap;

    fn summary() -> AttendanceSummary {
        let mut tallies = BTreeMap::new();
        tallies.insert(
            Bucket::BasementRollers,
            Tally {
                total: 5,
                present: 4,
                absent: 1,
            },
        );
        AttendanceSummary {
            tallies,
            date_of_record: "2024-06-01".to_string(),
            total_rows: 5,
            unique_departments: vec!["PROD".to_string()],
            unique_locations: vec!["BASEMENT".to_string()],
            unique_designations: vec!["ROLLER".to_string()],
        }
    }

    #[test]
    fn report_serializes_with_camel_case_keys() {
        let report = AttendanceReport::from_summary(&summary());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["lastUpdated"], "2024-06-01");
        assert_eq!(json["totalEmployees"], 5);
        assert_eq!(json["attendance"]["basementRollersTotal"], 5);
        assert_eq!(json["attendance"]["basementRollersPresent"], 4);
        assert_eq!(json["attendance"]["basementRollersAbsent"], 1);
        assert_eq!(json["attendance"]["supervisorsTotal"], 0);
        assert_eq!(json["debug"]["uniqueLocations"][0], "BASEMENT");
    }

    #[test]
    fn no_date_columns_error_carries_columns_sample_row_and_suggestion() {
        let err = IngestError::NoDateColumns {
            columns: vec!["EmployeeCode".to_string(), "Remarks".to_string()],
            sample_row: vec!["E1".to_string(), "ok".to_string()],
        };
        let payload = ErrorReport::from_error(&err);
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["status"], 400);
        assert_eq!(json["columnsFound"][1], "Remarks");
        assert_eq!(json["sampleRow"][0], "E1");
        assert!(json["suggestion"].as_str().unwrap().contains("EmployeeCode"));
    }

    #[test]
    fn generic_errors_omit_optional_fields() {
        let err = IngestError::EmptyFile;
        let json = serde_json::to_value(ErrorReport::from_error(&err)).unwrap();
        assert_eq!(json["error"], "Empty file");
        assert_eq!(json["status"], 400);
        assert!(json.get("columnsFound").is_none());
        assert!(json.get("sampleRow").is_none());
        assert!(json.get("suggestion").is_none());
    }
}
