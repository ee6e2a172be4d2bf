//! Row classifier and bucket aggregator
//!
//! The most recent date column is taken as the attendance date of record.
//! Each row is tested against every bucket rule independently; buckets overlap
//! by design (a basement supervisor counts in both the basement-supervisor
//! and the all-supervisors buckets).

use crate::error::IngestError;
use crate::resolve::{AttendanceRecord, ResolvedTable, StandardColumn};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Attendance status for one row, derived from two fuzzy predicates.
///
/// The legacy predicates are not mutually exclusive: a value starting with
/// `P` counts as present even when it is not literally "PRESENT" (so
/// "PENDING" classifies Present), and a value can satisfy both sides at
/// once. Both-true is kept as its own tag instead of being silently fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Present,
    Absent,
    Ambiguous,
    Unknown,
}

impl Status {
    /// Legacy dual-increment compatibility: ambiguous rows count on both
    /// sides.
    pub fn counts_present(self) -> bool {
        matches!(self, Status::Present | Status::Ambiguous)
    }

    pub fn counts_absent(self) -> bool {
        matches!(self, Status::Absent | Status::Ambiguous)
    }
}

/// Classify a raw status string, case-insensitively.
pub fn classify_status(raw: &str) -> Status {
    let status = raw.trim().to_uppercase();
    let present = status == "PRESENT"
        || status == "P"
        || status.starts_with('P')
        || status.contains("PRESENT");
    let absent = status == "ABSENT"
        || status == "A"
        || status.starts_with('A')
        || status.contains("ABSENT");

    match (present, absent) {
        (true, true) => Status::Ambiguous,
        (true, false) => Status::Present,
        (false, true) => Status::Absent,
        (false, false) => Status::Unknown,
    }
}

/// Uppercase-trimmed facts about one row; the only inputs bucket rules see.
#[derive(Debug, Clone)]
pub struct RowFacts {
    pub department: String,
    pub location: String,
    pub designation: String,
}

impl RowFacts {
    fn from_record(record: &AttendanceRecord) -> Self {
        Self {
            department: norm(record.standard(StandardColumn::DepartmentName)),
            location: norm(record.standard(StandardColumn::Location)),
            designation: norm(record.standard(StandardColumn::Designation)),
        }
    }
}

fn norm(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Organizational buckets. Not mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Bucket {
    BasementRollers,
    BasementSupervisors,
    BasementGummers,
    FirstFloorRollers,
    FirstFloorSupervisors,
    FirstFloorGummers,
    AllSupervisors,
    Quality,
    Packing,
    FilterMakers,
    FilterFolders,
}

/// Bucket membership rules, evaluated independently per row. This table is
/// the single source of truth for bucket semantics.
pub const BUCKET_RULES: &[(Bucket, fn(&RowFacts) -> bool)] = &[
    (Bucket::BasementRollers, |f| {
        f.location == "BASEMENT" && f.designation == "ROLLER"
    }),
    (Bucket::BasementSupervisors, |f| {
        f.location == "BASEMENT" && f.designation == "SUPERVISOR"
    }),
    (Bucket::BasementGummers, |f| {
        f.location == "BASEMENT" && f.designation == "GUMMER"
    }),
    (Bucket::FirstFloorRollers, |f| {
        f.location == "1ST FLOOR" && f.designation == "ROLLER"
    }),
    (Bucket::FirstFloorSupervisors, |f| {
        f.location == "1ST FLOOR" && f.designation == "SUPERVISOR"
    }),
    (Bucket::FirstFloorGummers, |f| {
        f.location == "1ST FLOOR" && f.designation == "GUMMER"
    }),
    (Bucket::AllSupervisors, |f| f.designation == "SUPERVISOR"),
    (Bucket::Quality, |f| f.designation == "CHECKER"),
    (Bucket::Packing, |f| {
        f.designation.contains("PACK") || f.department == "PACKING"
    }),
    (Bucket::FilterMakers, |f| {
        f.designation.contains("FILTER MAKER")
    }),
    (Bucket::FilterFolders, |f| {
        f.designation.contains("FILTER FOLDER")
    }),
];

/// Present/absent/total counters for one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub total: u32,
    pub present: u32,
    pub absent: u32,
}

impl Tally {
    fn record(&mut self, status: Status) {
        self.total += 1;
        if status.counts_present() {
            self.present += 1;
        }
        if status.counts_absent() {
            self.absent += 1;
        }
    }
}

/// Immutable result of folding all rows.
#[derive(Debug, Clone)]
pub struct AttendanceSummary {
    pub tallies: BTreeMap<Bucket, Tally>,
    pub date_of_record: String,
    pub total_rows: usize,
    pub unique_departments: Vec<String>,
    pub unique_locations: Vec<String>,
    pub unique_designations: Vec<String>,
}

impl AttendanceSummary {
    pub fn tally(&self, bucket: Bucket) -> Tally {
        self.tallies.get(&bucket).copied().unwrap_or_default()
    }
}

/// Fold the resolved rows into bucket tallies keyed on the most recent date
/// column.
pub fn aggregate(table: &ResolvedTable) -> Result<AttendanceSummary, IngestError> {
    let date_of_record = table
        .last_date_column()
        .ok_or_else(|| IngestError::NoDateColumns {
            columns: table.column_names(),
            sample_row: table
                .rows
                .first()
                .map(|row| {
                    table
                        .columns
                        .iter()
                        .map(|c| row.get(&c.name).to_string())
                        .collect()
                })
                .unwrap_or_default(),
        })?
        .to_string();

    info!(date_of_record = %date_of_record, rows = table.rows.len(), "aggregating attendance");

    let mut tallies: BTreeMap<Bucket, Tally> = BTreeMap::new();
    let mut departments = BTreeSet::new();
    let mut locations = BTreeSet::new();
    let mut designations = BTreeSet::new();
    let mut status_values = BTreeSet::new();
    let (mut present_rows, mut absent_rows, mut unknown_rows) = (0usize, 0usize, 0usize);

    for record in &table.rows {
        let facts = RowFacts::from_record(record);
        let raw_status = record.get(&date_of_record);
        let status = classify_status(raw_status);

        let normalized_status = norm(raw_status);
        if !normalized_status.is_empty() {
            status_values.insert(normalized_status.clone());
        }
        match status {
            Status::Present | Status::Ambiguous => present_rows += 1,
            Status::Absent => absent_rows += 1,
            Status::Unknown if !normalized_status.is_empty() => unknown_rows += 1,
            Status::Unknown => {}
        }

        if !facts.department.is_empty() {
            departments.insert(facts.department.clone());
        }
        if !facts.location.is_empty() {
            locations.insert(facts.location.clone());
        }
        if !facts.designation.is_empty() {
            designations.insert(facts.designation.clone());
        }

        for (bucket, matches) in BUCKET_RULES {
            if matches(&facts) {
                tallies.entry(*bucket).or_default().record(status);
            }
        }
    }

    debug!(
        present_rows,
        absent_rows,
        unknown_rows,
        distinct_statuses = status_values.len(),
        "status taxonomy observed"
    );

    Ok(AttendanceSummary {
        tallies,
        date_of_record,
        total_rows: table.rows.len(),
        unique_departments: departments.into_iter().collect(),
        unique_locations: locations.into_iter().collect(),
        unique_designations: designations.into_iter().collect(),
    })
}
