//! Report rendering: console table or delimited file.

use std::path::{Path, PathBuf};

use chrono::Local;
use docreport_shared::{DocReportError, Report, Result};

/// Timestamp suffix for report file names.
const FILE_TIMESTAMP: &str = "%Y-%m-%d_%H-%M-%S";

// ---------------------------------------------------------------------------
// Console table
// ---------------------------------------------------------------------------

/// Render a report as an aligned console table.
pub(crate) fn render_table(report: &Report) -> String {
    let mut widths: Vec<usize> = report
        .headers
        .iter()
        .map(|h| h.chars().count())
        .collect();
    for row in &report.rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    push_rule(&mut out, &widths);
    push_table_row(&mut out, &report.headers, &widths);
    push_rule(&mut out, &widths);
    for row in &report.rows {
        push_table_row(&mut out, row, &widths);
    }
    push_rule(&mut out, &widths);
    out
}

fn push_rule(out: &mut String, widths: &[usize]) {
    for width in widths {
        out.push('+');
        out.push_str(&"-".repeat(width + 2));
    }
    out.push_str("+\n");
}

fn push_table_row(out: &mut String, cells: &[String], widths: &[usize]) {
    for (cell, width) in cells.iter().zip(widths) {
        let pad = width.saturating_sub(cell.chars().count());
        out.push_str("| ");
        out.push_str(cell);
        out.push_str(&" ".repeat(pad));
        out.push(' ');
    }
    out.push_str("|\n");
}

// ---------------------------------------------------------------------------
// Delimited file
// ---------------------------------------------------------------------------

/// Write a report to `<results_dir>/<mode>_<timestamp>.csv`.
/// Returns the path of the written file.
pub(crate) fn write_csv_file(report: &Report, results_dir: &Path, mode: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(results_dir).map_err(|e| DocReportError::io(results_dir, e))?;

    let timestamp = Local::now().format(FILE_TIMESTAMP);
    let path = results_dir.join(format!("{mode}_{timestamp}.csv"));

    let mut buf = String::new();
    push_csv_row(&mut buf, &report.headers);
    for row in &report.rows {
        push_csv_row(&mut buf, row);
    }

    std::fs::write(&path, buf).map_err(|e| DocReportError::io(&path, e))?;
    Ok(path)
}

fn needs_quotes(cell: &str) -> bool {
    cell.contains(',') || cell.contains('"') || cell.contains('\n') || cell.contains('\r')
}

fn push_csv_row(out: &mut String, cells: &[String]) {
    let mut first = true;
    for cell in cells {
        if !first {
            out.push(',');
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}
