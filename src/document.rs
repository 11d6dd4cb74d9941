//! Thin helpers over the `scraper` DOM.
//!
//! The extractor never mutates a document; everything here reads text out of
//! an already-parsed tree.

use scraper::node::Node;
use scraper::{ElementRef, Html};

/// Elements that start a new line when flattening text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol",
    "p", "section", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Elements whose text is never visible.
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

pub fn parse(html: &str) -> Html {
    Html::parse_document(html)
}

/// Flatten an element's visible text, one line per block-level element.
/// Runs of whitespace inside a line collapse to one space and blank lines are dropped.
pub fn block_text(element: ElementRef) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);
    normalize_lines(&raw)
}

/// Visible text of an inline element on a single line
pub fn inline_text(element: ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

fn collect_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_TAGS.contains(&name) {
                    continue;
                }
                let is_block = BLOCK_TAGS.contains(&name);
                if is_block {
                    out.push('\n');
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
                if is_block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn normalize_lines(text: &str) -> String {
    text.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn is_tag(element: &ElementRef, tag: &str) -> bool {
    element.value().name().eq_ignore_ascii_case(tag)
}

/// Parent element, skipping non-element parents such as the document root.
pub fn parent_element<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    element.parent().and_then(ElementRef::wrap)
}

/// Closest ancestor with the given tag name.
pub fn nearest_ancestor<'a>(element: &ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| is_tag(ancestor, tag))
}

/// Direct `td`/`th` children of a row, one collapsed string per cell
pub fn row_cells(row: &ElementRef) -> Vec<String> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| is_tag(cell, "td") || is_tag(cell, "th"))
        .map(|cell| collapse_whitespace(&block_text(cell)))
        .collect()
}
