//! Parsed HTML pages and the lookups the extractors run against them

use scraper::{ElementRef, Html, Selector};

/// A parsed HTML page, owned by the extraction that fetched it
pub struct PageDocument {
    html: Html,
}

impl PageDocument {
    /// Parse a full HTML document
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }

    /// First element in the document matching `selector`
    pub fn find(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.html.select(selector).next()
    }
}

/// First descendant of `element` matching `selector`
pub fn find_in<'a>(element: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    element.select(selector).next()
}

/// Concatenated text of an element, untouched
pub fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Text pieces of an element, each trimmed, empty ones dropped, concatenated
pub fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Text nodes of an element joined by `separator`, then trimmed
pub fn joined_text(element: ElementRef<'_>, separator: &str) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(separator)
        .trim()
        .to_string()
}

/// Whether the element's class list contains `class`
pub fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}
