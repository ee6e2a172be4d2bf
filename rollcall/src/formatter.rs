//! Output formatters for the attendance report

use anyhow::Result;
use colored::*;
use rollcall_core::{AttendanceReport, ErrorReport};

/// Print the report in human-readable format, grouped by floor section.
pub fn print_human(report: &AttendanceReport) {
    println!(
        "{}",
        format!("Attendance for {}", report.last_updated).bold()
    );
    println!("{} {}", "Employees:".bold(), report.total_employees);
    println!();

    let counts = &report.attendance;

    print_section(
        "Basement",
        &[
            (
                "Rollers",
                counts.basement_rollers_total,
                counts.basement_rollers_present,
                counts.basement_rollers_absent,
            ),
            (
                "Supervisors",
                counts.basement_supervisors_total,
                counts.basement_supervisors_present,
                counts.basement_supervisors_absent,
            ),
            (
                "Gummers",
                counts.basement_gummers_total,
                counts.basement_gummers_present,
                counts.basement_gummers_absent,
            ),
        ],
    );

    print_section(
        "First floor",
        &[
            (
                "Rollers",
                counts.first_floor_rollers_total,
                counts.first_floor_rollers_present,
                counts.first_floor_rollers_absent,
            ),
            (
                "Supervisors",
                counts.first_floor_supervisors_total,
                counts.first_floor_supervisors_present,
                counts.first_floor_supervisors_absent,
            ),
            (
                "Gummers",
                counts.first_floor_gummers_total,
                counts.first_floor_gummers_present,
                counts.first_floor_gummers_absent,
            ),
        ],
    );

    print_section(
        "Across floors",
        &[
            (
                "Supervisors",
                counts.supervisors_total,
                counts.supervisors_present,
                counts.supervisors_absent,
            ),
            (
                "Quality checkers",
                counts.quality_total,
                counts.quality_present,
                counts.quality_absent,
            ),
            (
                "Packing",
                counts.packing_total,
                counts.packing_present,
                counts.packing_absent,
            ),
            (
                "Filter makers",
                counts.filter_makers_total,
                counts.filter_makers_present,
                counts.filter_makers_absent,
            ),
            (
                "Filter folders",
                counts.filter_folders_total,
                counts.filter_folders_present,
                counts.filter_folders_absent,
            ),
        ],
    );

    print_taxonomy(report);
}

fn print_section(title: &str, rows: &[(&str, u32, u32, u32)]) {
    println!("{}", format!("{title}:").bold().underline());
    for (label, total, present, absent) in rows {
        if *total == 0 {
            continue;
        }
        println!(
            "  {} {} / {} {}",
            format!("{label}:").bold(),
            present.to_string().green(),
            total,
            format!("({absent} absent)").red()
        );
    }
    println!();
}

fn print_taxonomy(report: &AttendanceReport) {
    println!("{}", "Observed taxonomy:".bold().underline());
    println!(
        "  {} {}",
        "Departments:".bold(),
        report.debug.unique_departments.join(", ").cyan()
    );
    println!(
        "  {} {}",
        "Locations:".bold(),
        report.debug.unique_locations.join(", ").cyan()
    );
    println!(
        "  {} {}",
        "Designations:".bold(),
        report.debug.unique_designations.join(", ").cyan()
    );
}

/// Print the full report envelope as JSON.
pub fn print_json(report: &AttendanceReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

pub fn print_error_human(payload: &ErrorReport) {
    eprintln!("{} {}", "Error:".red().bold(), payload.error.bold());
    eprintln!("  {}", payload.message);
    if let Some(columns) = &payload.columns_found {
        eprintln!("  {} {}", "Columns found:".bold(), columns.join(", "));
    }
    if let Some(sample) = &payload.sample_row {
        eprintln!("  {} {}", "First row:".bold(), sample.join(", "));
    }
    if let Some(suggestion) = &payload.suggestion {
        eprintln!("  {} {}", "Suggestion:".yellow().bold(), suggestion);
    }
}

pub fn print_error_json(payload: &ErrorReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(payload)?);
    Ok(())
}
