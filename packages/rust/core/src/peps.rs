//! Proposal index aggregation and status cross-validation.
//!
//! The proposal index carries a status legend (single-letter code → full
//! description) and a category table of rows. Each row's declared status
//! abbreviation is cross-checked against the full status scraped from the
//! proposal's own page, with the legend as the translation table. Most
//! mismatches are benign (a proposal recently changed status) and are only
//! logged; an unrecognized *code* means the legend itself is out of sync
//! with the page format and aborts the whole run.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use scraper::{ElementRef, Selector};
use tracing::{debug, info, instrument};
use url::Url;

use docreport_crawler::html::{element_text, find_tag, require_attr};
use docreport_crawler::{CachedClient, load_document};
use docreport_shared::{DocReportError, PepRecord, Report, Result};

use crate::progress::ProgressReporter;
use crate::resolve;

/// Sentinel code used when the declared status has no second character.
const NO_LETTER: &str = "<No letter>";

/// Definition-list label carrying the real status on a proposal page.
const STATUS_LABEL: &str = "Status:";

static LIST_ITEMS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").expect("li"));
static TABLE_ROWS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("tr"));
static ANCHORS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").expect("a"));
static TERMS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("dt").expect("dt"));
static DEFINITIONS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("dd").expect("dd"));

/// Single-letter status code → full status description.
pub type StatusLegend = BTreeMap<String, String>;

/// Outcome of cross-validating one record against the legend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusCheck {
    /// Declared and real status agree on their first letter.
    Consistent,
    /// First letters differ; `expected` is the legend's full description.
    Mismatch { expected: String },
}

// ---------------------------------------------------------------------------
// Legend
// ---------------------------------------------------------------------------

/// Scan a legend container for `(label, definition)` list items.
///
/// Every `<li>` must carry a `<strong>` label and an `<em>` definition — the
/// legend format is rigid. Keys are validated to be exactly one character so
/// the second-character code rule below stays sound against format drift.
pub fn extract_legend(container: ElementRef<'_>) -> Result<StatusLegend> {
    let mut legend = StatusLegend::new();
    for item in container.select(&LIST_ITEMS) {
        let label = element_text(find_tag(item, "strong", &[])?);
        let definition = element_text(find_tag(item, "em", &[])?);
        legend.insert(label, definition);
    }

    for key in legend.keys() {
        if key.chars().count() != 1 {
            return Err(DocReportError::legend(format!(
                "legend key {key:?} is not a single letter"
            )));
        }
    }
    Ok(legend)
}

// ---------------------------------------------------------------------------
// Cross-validation
// ---------------------------------------------------------------------------

/// The documented substring rule: the status code is the *second* character
/// of the declared abbreviation (the first is the proposal type). A declared
/// status too short to have one resolves to the `"<No letter>"` sentinel,
/// which no well-formed legend contains.
pub fn status_code(declared_status: &str) -> String {
    declared_status
        .chars()
        .nth(1)
        .map(|c| c.to_string())
        .unwrap_or_else(|| NO_LETTER.to_string())
}

/// Compare a record's declared status code against the legend and the real
/// status from the proposal's own page. Never mutates the record.
///
/// An unknown code is fatal ([`DocReportError::StatusMismatch`]); a
/// first-letter disagreement is a soft verdict the caller logs and ignores.
pub fn check_status(record: &PepRecord, legend: &StatusLegend) -> Result<StatusCheck> {
    let code = status_code(&record.declared_status);
    let expected = legend
        .get(&code)
        .ok_or_else(|| DocReportError::StatusMismatch {
            number: record.number,
            declared: record.declared_status.clone(),
            real: record.real_status.clone(),
        })?;

    if expected.chars().next() == record.real_status.chars().next() {
        Ok(StatusCheck::Consistent)
    } else {
        Ok(StatusCheck::Mismatch {
            expected: expected.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Record builder
// ---------------------------------------------------------------------------

/// The four leading fields of a row's flattened text, one per line.
/// Whitespace-only segments between cells are markup artifacts, not fields.
fn row_fields(row: ElementRef<'_>) -> Vec<String> {
    element_text(row)
        .split('\n')
        .filter(|segment| !segment.trim().is_empty())
        .map(String::from)
        .collect()
}

/// Build one proposal record from an index row.
///
/// Rows without a hyperlink anchor are header/separator rows and are
/// skipped (`Ok(None)`). Anything else must carry exactly four leading
/// fields: declared status, number, title, authors.
async fn build_record(
    client: &CachedClient,
    row: ElementRef<'_>,
    base_url: &Url,
) -> Result<Option<PepRecord>> {
    let Some(anchor) = row.select(&ANCHORS).next() else {
        return Ok(None);
    };
    let href = require_attr(anchor, "href")?;

    let fields = row_fields(row);
    if fields.len() < 4 {
        return Err(DocReportError::MalformedRow {
            detail: format!("expected 4 fields, got {}: {fields:?}", fields.len()),
        });
    }

    let number = fields[1].trim().parse::<u32>().map_err(|_| {
        DocReportError::MalformedRow {
            detail: format!("proposal number {:?} is not an integer", fields[1]),
        }
    })?;

    let link = resolve(base_url, href)?;
    let real_status = real_status(client, &link).await?;

    Ok(Some(PepRecord {
        declared_status: fields[0].clone(),
        number,
        title: fields[2].clone(),
        authors: fields[3].clone(),
        link,
        real_status,
    }))
}

/// Scrape the full status string from a proposal's own page.
async fn real_status(client: &CachedClient, link: &Url) -> Result<String> {
    let doc = load_document(client, link).await?;
    let section = find_tag(doc.root_element(), "section", &[("id", "pep-content")])?;
    let dl = find_tag(section, "dl", &[])?;

    let terms = dl.select(&TERMS).map(element_text);
    let definitions = dl.select(&DEFINITIONS).map(element_text);
    let entries: BTreeMap<String, String> = terms.zip(definitions).collect();

    entries
        .get(STATUS_LABEL)
        .cloned()
        .ok_or_else(|| DocReportError::MissingField {
            label: STATUS_LABEL.to_string(),
            url: link.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

/// Walk every row of the proposal index, cross-validate each record, and
/// reduce to lexicographically ordered `(status, count)` rows plus a final
/// `Total` of unique proposal numbers.
///
/// Records are keyed by number; a duplicate number overwrites the earlier
/// row (last-write-wins, matching the index's own map-by-number shape).
#[instrument(skip_all, fields(url = %peps_url))]
pub async fn pep_report(
    client: &CachedClient,
    peps_url: &Url,
    progress: &dyn ProgressReporter,
) -> Result<Report> {
    progress.phase("Loading proposal index");
    let doc = load_document(client, peps_url).await?;
    let article = find_tag(doc.root_element(), "section", &[("id", "pep-content")])?;

    let legend_section = find_tag(article, "section", &[("id", "pep-status-key")])?;
    let legend = extract_legend(legend_section)?;
    debug!(codes = legend.len(), "status legend loaded");

    let index = find_tag(article, "section", &[("id", "index-by-category")])?;
    let rows: Vec<ElementRef<'_>> = index.select(&TABLE_ROWS).collect();
    let total = rows.len();

    progress.phase("Fetching proposals");
    let mut peps: BTreeMap<u32, PepRecord> = BTreeMap::new();
    for (i, row) in rows.into_iter().enumerate() {
        let Some(record) = build_record(client, row, peps_url).await? else {
            continue;
        };
        progress.page_fetched(record.link.as_str(), i + 1, total);

        match check_status(&record, &legend)? {
            StatusCheck::Consistent => {}
            StatusCheck::Mismatch { expected } => {
                info!(
                    link = %record.link,
                    real = %record.real_status,
                    expected = %expected,
                    "mismatched statuses"
                );
            }
        }

        if let Some(previous) = peps.insert(record.number, record) {
            debug!(number = previous.number, "duplicate proposal number, keeping later row");
        }
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in peps.values() {
        *counts.entry(record.real_status.as_str()).or_default() += 1;
    }

    let mut report = Report::new(["Status", "Count"]);
    for (status, count) in &counts {
        report.push_row([status.to_string(), count.to_string()]);
    }
    report.push_row(["Total".to_string(), peps.len().to_string()]);

    progress.done();
    Ok(report)
}
