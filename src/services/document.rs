//! Label-oriented view over a parsed HTML page.
//!
//! The portal's pages have no stable ids, so values are found by the text of
//! a neighbouring label cell. This wrapper owns the `scraper` tree and exposes
//! only the navigation the extractors need.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

const CELL_TAGS: &[&str] = &["td", "th"];
const ROW_TAGS: &[&str] = &["tr"];

/// A parsed HTML page.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// First element matching `selector`, in document order.
    pub fn select_first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.html.select(selector).next()
    }

    /// All elements matching `selector`, in document order.
    pub fn select_all(&self, selector: &Selector) -> Vec<ElementRef<'_>> {
        self.html.select(selector).collect()
    }

    /// Element directly containing the first text node that matches `pattern`.
    ///
    /// Text inside `<script>` and `<style>` is never a label.
    pub fn find_text_matching(&self, pattern: &Regex) -> Option<ElementRef<'_>> {
        self.html.root_element().descendants().find_map(|node| {
            let text = node.value().as_text()?;
            if !pattern.is_match(&**text) {
                return None;
            }
            let parent = node.parent().and_then(ElementRef::wrap)?;
            match parent.value().name() {
                "script" | "style" => None,
                _ => Some(parent),
            }
        })
    }

    /// First element matching `selector` whose own text (direct text children)
    /// matches `pattern`.
    pub fn find_element_with_own_text(
        &self,
        selector: &Selector,
        pattern: &Regex,
    ) -> Option<ElementRef<'_>> {
        self.html
            .select(selector)
            .find(|el| pattern.is_match(&own_text(*el)))
    }
}

/// Nearest `td`/`th` at or above `element`.
pub fn enclosing_cell(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    enclosing(element, CELL_TAGS)
}

/// Nearest `tr` at or above `element`.
pub fn enclosing_row(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    enclosing(element, ROW_TAGS)
}

fn enclosing<'a>(element: ElementRef<'a>, names: &[&str]) -> Option<ElementRef<'a>> {
    if names.contains(&element.value().name()) {
        return Some(element);
    }
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| names.contains(&el.value().name()))
}

/// The first cell after `cell` among its siblings.
pub fn next_sibling_cell(cell: ElementRef<'_>) -> Option<ElementRef<'_>> {
    cell.next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| CELL_TAGS.contains(&el.value().name()))
}

/// Every `td` below `row`, in document order.
pub fn row_cells<'a>(row: ElementRef<'a>, td: &Selector) -> Vec<ElementRef<'a>> {
    row.select(td).collect()
}

/// Concatenated, trimmed text of `element` and its descendants.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn own_text(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|child| child.value().as_text().map(|t| String::from(&**t)))
        .collect()
}
