//! Server-rendered HTML fragments.
//!
//! The tracker sends opaque HTML snippets. The only structural query we
//! ever run is locating the `.download-list` section inside the downloads
//! fragment; everything else is flattened to plain text before display so
//! device-provided markup is never re-emitted as markup.

use scraper::{ElementRef, Html, Selector};

const BLOCK_TAGS: [&str; 9] = ["h1", "h2", "h3", "h4", "h5", "h6", "p", "li", "div"];

fn has_block_descendant(el: ElementRef<'_>) -> bool {
    el.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|d| BLOCK_TAGS.contains(&d.value().name()))
}

/// Extracts the inner content of the element carrying class
/// `download-list` from a downloads fragment.
///
/// Returns `None` if the fragment has no such element. Callers treat that
/// as a no-op, not an error: the previously rendered list stays put.
#[must_use]
pub fn extract_download_list(html: &str) -> Option<String> {
    let doc = Html::parse_fragment(html);
    let selector = Selector::parse(".download-list").ok()?;
    let section = doc.select(&selector).next()?;
    Some(section.inner_html())
}

/// Flattens a fragment to display lines, one per leaf block element.
///
/// A leaf block is a block-level element with no block-level children;
/// collecting at the leaves avoids emitting a container's text twice.
#[must_use]
pub fn fragment_lines(html: &str) -> Vec<String> {
    let doc = Html::parse_fragment(html);
    let Ok(blocks) = Selector::parse("h1, h2, h3, h4, h5, h6, p, li, div") else {
        return Vec::new();
    };

    let mut lines: Vec<String> = doc
        .select(&blocks)
        .filter(|el| !has_block_descendant(*el))
        .map(|el| {
            el.text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect();

    // Inline-only fragment: fall back to the bare text
    if lines.is_empty() {
        let text: String = doc
            .root_element()
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !text.is_empty() {
            lines.push(text);
        }
    }

    lines
}

/// Extracts the entries of a download-list fragment, one per link or list
/// item.
#[must_use]
pub fn list_entries(html: &str) -> Vec<String> {
    let doc = Html::parse_fragment(html);
    let Ok(items) = Selector::parse("a, li") else {
        return Vec::new();
    };

    let entries: Vec<String> = doc
        .select(&items)
        .map(|el| {
            el.text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|e| !e.is_empty())
        .collect();

    if entries.is_empty() {
        fragment_lines(html)
    } else {
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_finds_download_list() {
        let html = r#"<div class="download-list"><a>file1.gpx</a></div>"#;
        assert_eq!(
            extract_download_list(html).as_deref(),
            Some("<a>file1.gpx</a>")
        );
    }

    #[test]
    fn extract_miss_is_none() {
        assert_eq!(extract_download_list("<div>no list here</div>"), None);
        assert_eq!(extract_download_list(""), None);
    }

    #[test]
    fn extract_ignores_surrounding_markup() {
        let html = r#"<html><body><h1>Downloads</h1>
            <div class="download-list"><a href="/trip_1.csv">trip_1.csv</a></div>
            </body></html>"#;
        let inner = extract_download_list(html).unwrap();
        assert!(inner.contains("trip_1.csv"));
        assert!(!inner.contains("Downloads"));
    }

    #[test]
    fn fragment_lines_flattens_status_page() {
        let html = r#"<div class='gps-data'>
            <h2>GPS Live Data</h2>
            <p>Latitude: <b>51.501476</b></p>
            <p>Longitude: <b>-0.140634</b></p>
        </div>"#;
        let lines = fragment_lines(html);
        assert_eq!(
            lines,
            vec![
                "GPS Live Data",
                "Latitude: 51.501476",
                "Longitude: -0.140634",
            ]
        );
    }

    #[test]
    fn fragment_lines_skips_container_duplicates() {
        let html = "<div><div><p>only once</p></div></div>";
        assert_eq!(fragment_lines(html), vec!["only once"]);
    }

    #[test]
    fn fragment_lines_inline_fallback() {
        assert_eq!(fragment_lines("waiting for fix..."), vec!["waiting for fix..."]);
        assert!(fragment_lines("").is_empty());
    }

    #[test]
    fn list_entries_one_per_link() {
        let html = r#"<a href="/a.csv">trip_a.csv</a><a href="/b.csv">trip_b.csv</a>"#;
        assert_eq!(list_entries(html), vec!["trip_a.csv", "trip_b.csv"]);
    }

    #[test]
    fn list_entries_falls_back_to_text() {
        assert_eq!(list_entries("no recorded trips"), vec!["no recorded trips"]);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn never_panics_on_arbitrary_input(html in ".{0,256}") {
                let _ = extract_download_list(&html);
                let _ = fragment_lines(&html);
                let _ = list_entries(&html);
            }
        }
    }
}
