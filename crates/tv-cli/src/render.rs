//! Report rendering: the `.xlsx` workbook and the terminal summary.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, FormatBorder, Workbook, Worksheet};
use tv_core::{CalendarEvent, DiscrepancyReport, SkippedRecord, TimesheetEntry};

pub const EXTRA_SHEET: &str = "Extra Entries";
pub const MISSING_SHEET: &str = "Missing Entries";
pub const SUMMARY_SHEET: &str = "Summary";
pub const NO_DISCREPANCIES: &str = "No discrepancies found";

const EXTRA_HEADERS: [&str; 4] = ["date", "start", "end", "project"];
const MISSING_HEADERS: [&str; 3] = ["start", "end", "summary"];

fn extra_row(entry: &TimesheetEntry) -> Vec<String> {
    vec![
        entry.date.to_string(),
        entry.interval.start().to_rfc3339(),
        entry.interval.end().to_rfc3339(),
        entry.project.clone(),
    ]
}

fn missing_row(event: &CalendarEvent) -> Vec<String> {
    vec![
        event.interval.start().to_rfc3339(),
        event.interval.end().to_rfc3339(),
        event.summary.clone(),
    ]
}

/// Writes the report workbook.
///
/// One sheet per non-empty discrepancy list. A clean report still produces a
/// valid workbook, with a single summary sheet saying so.
pub fn write_workbook(report: &DiscrepancyReport, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    if report.is_clean() {
        let worksheet = workbook.add_worksheet().set_name(SUMMARY_SHEET)?;
        worksheet.write(0, 0, NO_DISCREPANCIES)?;
        worksheet.set_column_width(0, 24)?;
    } else {
        if !report.extra_entries.is_empty() {
            let rows: Vec<_> = report.extra_entries.iter().map(extra_row).collect();
            write_table(workbook.add_worksheet(), EXTRA_SHEET, &EXTRA_HEADERS, &rows)?;
        }
        if !report.missing_entries.is_empty() {
            let rows: Vec<_> = report.missing_entries.iter().map(missing_row).collect();
            write_table(workbook.add_worksheet(), MISSING_SHEET, &MISSING_HEADERS, &rows)?;
        }
    }

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed to write report {}", path.display()))?;
    tracing::debug!(path = %path.display(), "wrote report workbook");
    Ok(())
}

#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    reason = "column indices and cell widths are far below u16 and f64 limits"
)]
fn write_table(
    worksheet: &mut Worksheet,
    name: &str,
    headers: &[&str],
    rows: &[Vec<String>],
) -> Result<()> {
    worksheet.set_name(name)?;

    let header_format = Format::new().set_bold().set_border(FormatBorder::Thin);
    let mut widths: Vec<usize> = headers.iter().map(|header| header.chars().count()).collect();

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_with_format(0, col as u16, *header, &header_format)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    for (idx, row) in rows.iter().enumerate() {
        let row_num = idx as u32 + 1;
        for (col, value) in row.iter().enumerate() {
            worksheet.write(row_num, col as u16, value.as_str())?;
            widths[col] = widths[col].max(value.chars().count());
        }
    }

    for (col, width) in widths.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width as f64 + 2.0)?;
    }
    Ok(())
}

/// Writes the human-readable summary of a validation run.
pub fn write_summary<W: Write>(
    writer: &mut W,
    report: &DiscrepancyReport,
    skipped: &[SkippedRecord],
) -> std::io::Result<()> {
    if report.is_clean() {
        writeln!(writer, "No discrepancies found. Timesheet matches calendar.")?;
    } else {
        if report.missing_entries.is_empty() {
            writeln!(writer, "No missing entries.")?;
        } else {
            writeln!(writer, "Missing entries (in calendar but not in timesheet):")?;
            for event in &report.missing_entries {
                writeln!(writer, "  - {}: {}", event.interval, event.summary)?;
            }
        }

        if report.extra_entries.is_empty() {
            writeln!(writer, "No extra entries.")?;
        } else {
            writeln!(writer, "Extra entries (in timesheet but not in calendar):")?;
            for entry in &report.extra_entries {
                writeln!(writer, "  - {}: {}", entry.interval, entry.project)?;
            }
        }
    }

    write_skipped(writer, skipped)
}

/// Lists records dropped during normalization, if any.
pub fn write_skipped<W: Write>(writer: &mut W, skipped: &[SkippedRecord]) -> std::io::Result<()> {
    if skipped.is_empty() {
        return Ok(());
    }
    let noun = if skipped.len() == 1 { "record" } else { "records" };
    writeln!(writer, "Skipped {} invalid {noun}:", skipped.len())?;
    for record in skipped {
        writeln!(writer, "  - {record}")?;
    }
    Ok(())
}
