//! Archive download: locate the `.pdf-a4.zip` link on the downloads page
//! and save the archive under the local downloads directory.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, instrument};
use url::Url;

use docreport_crawler::html::{find_link_matching, find_tag, require_attr};
use docreport_crawler::{CachedClient, load_document};
use docreport_shared::{DocReportError, Result};

use crate::resolve;

static ARCHIVE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".+pdf-a4\.zip$").expect("archive pattern"));

/// Download the A4 PDF archive. The file name is the archive URL's final
/// path segment; returns the path it was saved to.
#[instrument(skip_all, fields(url = %docs_url))]
pub async fn download(
    client: &CachedClient,
    docs_url: &Url,
    downloads_dir: &Path,
) -> Result<PathBuf> {
    let downloads_url = resolve(docs_url, "download.html")?;
    let doc = load_document(client, &downloads_url).await?;

    let main = find_tag(doc.root_element(), "div", &[("role", "main")])?;
    let table = find_tag(main, "table", &[])?;
    let anchor = find_link_matching(table, &ARCHIVE_PATTERN)?;
    let archive_url = resolve(&downloads_url, require_attr(anchor, "href")?)?;

    let filename = archive_url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| {
            DocReportError::parse(format!("archive URL {archive_url} has no file name"))
        })?;

    std::fs::create_dir_all(downloads_dir).map_err(|e| DocReportError::io(downloads_dir, e))?;
    let archive_path = downloads_dir.join(filename);

    let body = client
        .fetch_bytes(&archive_url)
        .await
        .ok_or_else(|| DocReportError::NoContent {
            url: archive_url.to_string(),
        })?;
    std::fs::write(&archive_path, &body).map_err(|e| DocReportError::io(&archive_path, e))?;

    info!(path = %archive_path.display(), "archive downloaded and saved");
    Ok(archive_path)
}
