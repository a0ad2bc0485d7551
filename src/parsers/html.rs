use crate::error::{HarvestError, Result};
use scraper::{ElementRef, Html, Selector};

/// Compiles a CSS selector, reporting a bad pattern as a layout mismatch
pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| HarvestError::ParseMismatch(format!("invalid selector {:?}: {}", css, e)))
}

/// Collapses an element's text nodes into a single space-separated string
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Number of elements matching `css`
pub fn count(doc: &Html, css: &str) -> Result<usize> {
    let sel = selector(css)?;
    Ok(doc.select(&sel).count())
}

/// Whether at least one element matches `css`
pub fn exists(doc: &Html, css: &str) -> Result<bool> {
    let sel = selector(css)?;
    Ok(doc.select(&sel).next().is_some())
}

/// Text of every element matching `css`, in document order
pub fn texts(doc: &Html, css: &str) -> Result<Vec<String>> {
    let sel = selector(css)?;
    let found = doc.select(&sel).map(element_text).collect::<Vec<_>>();
    ::log::trace!("{} matched {} elements", css, found.len());
    Ok(found)
}

/// Text of the first element matching `css`; no match is a layout mismatch
pub fn first_text(doc: &Html, css: &str) -> Result<String> {
    let sel = selector(css)?;
    doc.select(&sel)
        .next()
        .map(element_text)
        .ok_or_else(|| HarvestError::missing(css))
}

/// Outer markup of the first element matching `css`
pub fn outer_html(doc: &Html, css: &str) -> Result<String> {
    let sel = selector(css)?;
    doc.select(&sel)
        .next()
        .map(|e| e.html())
        .ok_or_else(|| HarvestError::missing(css))
}

/// Text of the parent of the first `<span>` whose own text contains `needle`
pub fn parent_text_of_span(doc: &Html, needle: &str) -> Option<String> {
    let sel = selector("span").ok()?;
    doc.select(&sel)
        .find(|span| span.text().any(|t| t.contains(needle)))
        .and_then(|span| span.parent())
        .and_then(ElementRef::wrap)
        .map(element_text)
}
