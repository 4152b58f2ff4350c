//! Core domain types for docreport reports.

use url::Url;

// ---------------------------------------------------------------------------
// PepRecord
// ---------------------------------------------------------------------------

/// One fully assembled proposal record from the index table.
///
/// `declared_status` is the raw abbreviation scraped from the index row;
/// `real_status` is the full status string scraped from the proposal's own
/// page. The two are cross-validated against the scraped legend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PepRecord {
    /// Raw status abbreviation from the index row (type letter + status letter).
    pub declared_status: String,
    /// Proposal number — unique per aggregation run, dedup key.
    pub number: u32,
    /// Proposal title.
    pub title: String,
    /// Comma-separated author list as shown in the index.
    pub authors: String,
    /// Canonical absolute link to the proposal's own page.
    pub link: Url,
    /// Full status string from the proposal page's definition list.
    pub real_status: String,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// A tabular report: ordered headers plus rows of cells.
///
/// All report generators produce this shape; the CLI decides whether it is
/// rendered as a console table or written as a delimited file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Column headers, in display order.
    pub headers: Vec<String>,
    /// Data rows; each row has one cell per header.
    pub rows: Vec<Vec<String>>,
}

impl Report {
    /// Create an empty report with the given headers.
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a data row.
    pub fn push_row<S: Into<String>>(&mut self, row: impl IntoIterator<Item = S>) {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    /// Number of data rows (headers excluded).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the report has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
