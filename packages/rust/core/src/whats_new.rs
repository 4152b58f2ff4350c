//! Release-notes report: one row per dated "what's new" article.

use std::sync::LazyLock;

use scraper::{ElementRef, Selector};
use tracing::instrument;
use url::Url;

use docreport_crawler::html::{element_text, find_tag, require_attr};
use docreport_crawler::{CachedClient, load_document};
use docreport_shared::{Report, Result};

use crate::progress::ProgressReporter;
use crate::resolve;

static TOCTREE_ITEMS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li.toctree-l1").expect("toctree selector"));

/// Walk the what's-new index and emit `(link, title, editor/author)` rows,
/// one per article page.
#[instrument(skip_all, fields(url = %docs_url))]
pub async fn whats_new(
    client: &CachedClient,
    docs_url: &Url,
    progress: &dyn ProgressReporter,
) -> Result<Report> {
    let whats_new_url = resolve(docs_url, "whatsnew/")?;

    progress.phase("Loading what's-new index");
    let doc = load_document(client, &whats_new_url).await?;
    let main_section = find_tag(
        doc.root_element(),
        "section",
        &[("id", "what-s-new-in-python")],
    )?;
    let toctree = find_tag(main_section, "div", &[("class", "toctree-wrapper compound")])?;

    let sections: Vec<ElementRef<'_>> = toctree.select(&TOCTREE_ITEMS).collect();
    let total = sections.len();

    progress.phase("Fetching articles");
    let mut report = Report::new(["Article link", "Title", "Editor, author"]);
    for (i, section) in sections.into_iter().enumerate() {
        let anchor = find_tag(section, "a", &[])?;
        let href = require_attr(anchor, "href")?;
        let version_link = resolve(&whats_new_url, href)?;
        progress.page_fetched(version_link.as_str(), i + 1, total);

        let page = load_document(client, &version_link).await?;
        let h1 = find_tag(page.root_element(), "h1", &[])?;
        let dl = find_tag(page.root_element(), "dl", &[])?;
        let dl_text = element_text(dl).replace('\n', " ");

        report.push_row([version_link.to_string(), element_text(h1), dl_text]);
    }

    progress.done();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::SilentProgress;
    use docreport_cache::HttpCache;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const INDEX: &str = r#"<html><body>
    <section id="what-s-new-in-python">
      <div class="toctree-wrapper compound">
        <ul>
          <li class="toctree-l1"><a href="3.13.html">What's new in 3.13</a></li>
          <li class="toctree-l1"><a href="3.12.html">What's new in 3.12</a></li>
        </ul>
      </div>
    </section>
    </body></html>"#;

    fn article(version: &str, editor: &str) -> String {
        format!(
            r#"<html><body>
            <h1>What's new in Python {version}</h1>
            <dl><dt>Editor:</dt>
<dd>{editor}</dd></dl>
            </body></html>"#
        )
    }

    async fn test_client(tag: &str) -> CachedClient {
        let tmp = std::env::temp_dir().join(format!(
            "docreport_whatsnew_{tag}_{}.db",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&tmp);
        let cache = HttpCache::open(&tmp).await.expect("open cache");
        CachedClient::new(cache).expect("build client")
    }

    #[tokio::test]
    async fn one_row_per_article() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/whatsnew/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(INDEX))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/3/whatsnew/3.13.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(article("3.13", "Editor A")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/3/whatsnew/3.12.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(article("3.12", "Editor B")))
            .mount(&server)
            .await;

        let client = test_client("rows").await;
        let docs_url = Url::parse(&format!("{}/3/", server.uri())).unwrap();
        let report = whats_new(&client, &docs_url, &SilentProgress).await.unwrap();

        assert_eq!(report.len(), 2);
        assert_eq!(
            report.rows[0][0],
            format!("{}/3/whatsnew/3.13.html", server.uri())
        );
        assert_eq!(report.rows[0][1], "What's new in Python 3.13");
        // Definition-list newlines are flattened to spaces.
        assert!(report.rows[0][2].contains("Editor: Editor A"));
        assert!(!report.rows[0][2].contains('\n'));
    }

    #[tokio::test]
    async fn broken_article_page_aborts_report() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/whatsnew/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(INDEX))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/3/whatsnew/3.13.html"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = test_client("broken").await;
        let docs_url = Url::parse(&format!("{}/3/", server.uri())).unwrap();
        let err = whats_new(&client, &docs_url, &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            docreport_shared::DocReportError::NoContent { .. }
        ));
    }
}
