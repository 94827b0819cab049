//! HTML helpers for collectors: visible-text flattening, snippet selection,
//! link harvesting, and meta-tag lookup.
//!
//! Collectors feed page text into the field extractor; nothing here performs
//! network I/O.

use scraper::{Html, Selector};

/// Flatten a document to whitespace-collapsed visible text.
pub fn document_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();

    for text in document.root_element().text() {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(trimmed);
    }

    out
}

/// Collect the text of every element matching any of the given selectors,
/// in document order, skipping blanks. Selectors that fail to parse are
/// skipped rather than failing the page.
pub fn select_all_text(html: &str, selectors: &[&str]) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut snippets = Vec::new();

    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        for element in document.select(&selector) {
            let text = element.text().collect::<Vec<_>>().join(" ");
            let text = collapse_whitespace(&text);
            if !text.is_empty() {
                snippets.push(text);
            }
        }
    }

    snippets
}

/// Harvest hrefs containing `host_fragment`, deduplicated in document order.
///
/// Search engines wrap outbound results in redirect links
/// (`.../l/?uddg=<encoded target>`); those are unwrapped before matching so
/// the caller always sees the destination URL.
pub fn find_links(html: &str, host_fragment: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let anchor = Selector::parse("a[href]").expect("static selector must parse");
    let mut links = Vec::new();

    for element in document.select(&anchor) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let resolved = unwrap_redirect(href);
        if resolved.contains(host_fragment)
            && resolved.starts_with("http")
            && !links.contains(&resolved)
        {
            links.push(resolved);
        }
    }

    links
}

/// Content of a `<meta property=...>` or `<meta name=...>` tag.
pub fn meta_content(html: &str, key: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = format!("meta[property=\"{key}\"], meta[name=\"{key}\"]");
    let selector = Selector::parse(&selector).ok()?;

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("content"))
        .map(collapse_whitespace)
        .find(|content| !content.is_empty())
}

fn unwrap_redirect(href: &str) -> String {
    if let Some(position) = href.find("uddg=") {
        let encoded = &href[position + "uddg=".len()..];
        let encoded = encoded.split('&').next().unwrap_or(encoded);
        if let Ok(decoded) = urlencoding::decode(encoded) {
            return decoded.into_owned();
        }
    }

    href.to_owned()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
