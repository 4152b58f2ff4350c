//! Version-status report from the index sidebar.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Selector;
use tracing::{error, instrument};
use url::Url;

use docreport_crawler::html::{element_text, find_tag, require_attr};
use docreport_crawler::{CachedClient, load_document};
use docreport_shared::{DocReportError, Report, Result};

static LISTS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("ul").expect("ul"));
static ANCHORS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").expect("a"));

/// The sidebar list that carries the version entries ends with this link.
const ALL_VERSIONS_MARKER: &str = "All versions";

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Python (?P<version>\d\.\d+) \((?P<status>.*)\)").expect("version pattern")
});

/// Emit `(documentation link, version, status)` for every entry of the
/// sidebar's version list. Anchors that don't match the version pattern keep
/// their full text as the version and an empty status.
#[instrument(skip_all, fields(url = %docs_url))]
pub async fn latest_versions(client: &CachedClient, docs_url: &Url) -> Result<Report> {
    let doc = load_document(client, docs_url).await?;
    let sidebar = find_tag(doc.root_element(), "div", &[("class", "sphinxsidebarwrapper")])?;

    let version_list = sidebar
        .select(&LISTS)
        .find(|ul| element_text(*ul).contains(ALL_VERSIONS_MARKER));
    let Some(version_list) = version_list else {
        error!(url = %docs_url, "no version list found in sidebar");
        return Err(DocReportError::NoContent {
            url: docs_url.to_string(),
        });
    };

    let mut report = Report::new(["Documentation link", "Version", "Status"]);
    for anchor in version_list.select(&ANCHORS) {
        let href = require_attr(anchor, "href")?;
        let text = element_text(anchor);
        let (version, status) = match VERSION_PATTERN.captures(&text) {
            Some(caps) => (caps["version"].to_string(), caps["status"].to_string()),
            None => (text.clone(), String::new()),
        };
        report.push_row([href.to_string(), version, status]);
    }
    Ok(report)
}
