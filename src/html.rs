//! Small query helpers over `scraper` documents

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::ScrapeError;

pub fn selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::InvalidSelector(format!("{}: {}", css, e)))
}

/// Trimmed text content of an element
pub fn text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Trimmed text content, leaving out anything inside `<script>`/`<style>`
pub fn text_without_scripts(element: ElementRef<'_>) -> String {
    let mut out = String::new();

    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let in_script = node
            .ancestors()
            .take_while(|ancestor| ancestor.id() != element.id())
            .filter_map(ElementRef::wrap)
            .any(|ancestor| matches!(ancestor.value().name(), "script" | "noscript" | "style"));
        if !in_script {
            out.push_str(text);
        }
    }

    out.trim().to_string()
}

/// Child cells (`td`) of a table row, in document order
pub fn cells<'a>(row: ElementRef<'a>, td: &Selector) -> Vec<ElementRef<'a>> {
    row.select(td).collect()
}

pub fn first<'a>(document: &'a Html, selector: &Selector) -> Option<ElementRef<'a>> {
    document.select(selector).next()
}

/// Resolve `href` against `base`, keeping only http(s) targets.
///
/// Empty, fragment-only, `javascript:`, `mailto:` and `tel:` links are dropped.
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
    {
        return None;
    }

    let absolute = base.join(href).ok()?;
    matches!(absolute.scheme(), "http" | "https").then_some(absolute)
}
