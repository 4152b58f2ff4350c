//! First-match tag location over parsed documents.
//!
//! The site's pages are queried with a tag name plus exact attribute
//! constraints; a miss is a typed [`DocReportError::TagNotFound`] naming the
//! requested tag and filter, fatal to the report being generated.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

use docreport_shared::{DocReportError, Result};

static ANCHOR_WITH_HREF: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector"));

/// Return the first descendant of `scope` matching `tag` and all attribute
/// constraints.
///
/// A `class` constraint matches class-list membership (every listed class
/// must be present); any other attribute must match exactly.
pub fn find_tag<'a>(
    scope: ElementRef<'a>,
    tag: &str,
    attrs: &[(&str, &str)],
) -> Result<ElementRef<'a>> {
    let selector = selector_for(tag, attrs)?;
    scope
        .select(&selector)
        .next()
        .ok_or_else(|| DocReportError::TagNotFound {
            tag: tag.to_string(),
            attrs: format_attrs(attrs),
        })
}

/// Return the first anchor under `scope` whose `href` matches `pattern`.
pub fn find_link_matching<'a>(scope: ElementRef<'a>, pattern: &Regex) -> Result<ElementRef<'a>> {
    scope
        .select(&ANCHOR_WITH_HREF)
        .find(|el| {
            el.value()
                .attr("href")
                .is_some_and(|href| pattern.is_match(href))
        })
        .ok_or_else(|| DocReportError::TagNotFound {
            tag: "a".to_string(),
            attrs: format!("href matching /{pattern}/"),
        })
}

/// Get a required attribute off an element.
pub fn require_attr<'a>(el: ElementRef<'a>, name: &str) -> Result<&'a str> {
    el.value().attr(name).ok_or_else(|| {
        DocReportError::parse(format!(
            "<{}> element lacks required attribute {name:?}",
            el.value().name()
        ))
    })
}

/// Flattened descendant text of an element, in document order.
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

fn selector_for(tag: &str, attrs: &[(&str, &str)]) -> Result<Selector> {
    let mut css = String::from(tag);
    for (name, value) in attrs {
        if *name == "class" {
            for class in value.split_whitespace() {
                css.push('.');
                css.push_str(class);
            }
        } else {
            css.push_str(&format!("[{name}=\"{value}\"]"));
        }
    }
    Selector::parse(&css)
        .map_err(|e| DocReportError::parse(format!("invalid selector {css:?}: {e}")))
}

fn format_attrs(attrs: &[(&str, &str)]) -> String {
    attrs
        .iter()
        .map(|(name, value)| format!("{name}=\"{value}\""))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    const FIXTURE: &str = r#"<html><body>
        <section id="downloads">
            <div class="toctree-wrapper compound">
                <ul>
                    <li class="toctree-l1"><a href="3.13.html">What's new in 3.13</a></li>
                </ul>
            </div>
            <table>
                <tr><td><a href="archives/doc.epub">epub</a></td></tr>
                <tr><td><a href="archives/doc-pdf-a4.zip">pdf (A4)</a></td></tr>
            </table>
        </section>
        <a name="no-href">anchor without href</a>
    </body></html>"#;

    #[test]
    fn finds_by_id() {
        let doc = Html::parse_document(FIXTURE);
        let section = find_tag(doc.root_element(), "section", &[("id", "downloads")]).unwrap();
        assert_eq!(section.value().name(), "section");
    }

    #[test]
    fn finds_by_class_list() {
        let doc = Html::parse_document(FIXTURE);
        let div = find_tag(
            doc.root_element(),
            "div",
            &[("class", "toctree-wrapper compound")],
        )
        .unwrap();
        assert_eq!(element_text(div).trim(), "What's new in 3.13");
    }

    #[test]
    fn miss_names_tag_and_filter() {
        let doc = Html::parse_document(FIXTURE);
        let err = find_tag(doc.root_element(), "section", &[("id", "absent")]).unwrap_err();
        match &err {
            DocReportError::TagNotFound { tag, attrs } => {
                assert_eq!(tag, "section");
                assert_eq!(attrs, r#"id="absent""#);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn first_match_wins() {
        let doc = Html::parse_document(FIXTURE);
        let anchor = find_tag(doc.root_element(), "a", &[]).unwrap();
        assert_eq!(require_attr(anchor, "href").unwrap(), "3.13.html");
    }

    #[test]
    fn link_matching_pattern() {
        let doc = Html::parse_document(FIXTURE);
        let pattern = Regex::new(r".+pdf-a4\.zip$").unwrap();
        let anchor = find_link_matching(doc.root_element(), &pattern).unwrap();
        assert_eq!(
            require_attr(anchor, "href").unwrap(),
            "archives/doc-pdf-a4.zip"
        );
    }

    #[test]
    fn link_matching_miss() {
        let doc = Html::parse_document(FIXTURE);
        let pattern = Regex::new(r"\.tar\.gz$").unwrap();
        let err = find_link_matching(doc.root_element(), &pattern).unwrap_err();
        assert!(matches!(err, DocReportError::TagNotFound { .. }));
        assert!(err.to_string().contains("tar"));
    }

    #[test]
    fn missing_attribute_rejected() {
        let doc = Html::parse_document(FIXTURE);
        let anchor = find_tag(doc.root_element(), "a", &[("name", "no-href")]).unwrap();
        assert!(require_attr(anchor, "href").is_err());
    }
}
