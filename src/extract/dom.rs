//! DOM snapshot helpers: rendered text, rendered size, ancestor walking.
//!
//! The snapshot is plain HTML, so layout facts the live page knew about are
//! carried over as attributes stamped by the page host before capture
//! (see `scraping::host::size_annotation_script`).

use crate::core::config::ContainerBounds;
use scraper::{ElementRef, Html, Selector};

/// `offsetHeight` of the element at snapshot time.
pub const HEIGHT_ATTR: &str = "data-harvest-h";
/// `offsetWidth` of the element at snapshot time.
pub const WIDTH_ATTR: &str = "data-harvest-w";

const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "svg", "template", "head"];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "button", "dd", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr",
    "ul",
];

/// Rendered size `(height, width)` in px; unannotated elements read as 0×0.
pub fn element_size(el: &ElementRef<'_>) -> (u32, u32) {
    let read = |attr: &str| {
        el.value()
            .attr(attr)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .map(|v| v.max(0.0) as u32)
            .unwrap_or(0)
    };
    (read(HEIGHT_ATTR), read(WIDTH_ATTR))
}

fn is_large_enough(el: &ElementRef<'_>, bounds: ContainerBounds) -> bool {
    let (height, width) = element_size(el);
    height > bounds.min_height && width >= bounds.min_width
}

/// Finds the container that holds one whole entity around an anchor node.
pub trait ContainerLocator {
    /// Never fails: when no ancestor within `bounds.max_depth` is large
    /// enough, the last visited ancestor is returned as-is.
    fn enclosing_container<'a>(
        &self,
        anchor: ElementRef<'a>,
        bounds: ContainerBounds,
    ) -> ElementRef<'a>;
}

/// Walks up until the rendered height exceeds the threshold.
#[derive(Debug, Default, Clone, Copy)]
pub struct RenderedSizeLocator;

impl ContainerLocator for RenderedSizeLocator {
    fn enclosing_container<'a>(
        &self,
        anchor: ElementRef<'a>,
        bounds: ContainerBounds,
    ) -> ElementRef<'a> {
        let mut card = anchor;
        for _ in 0..bounds.max_depth {
            let Some(parent) = card.parent().and_then(ElementRef::wrap) else {
                break;
            };
            card = parent;
            if is_large_enough(&card, bounds) {
                break;
            }
        }
        card
    }
}

/// The page's main content region: `[role=main]`, else `<body>`, else the root.
pub fn main_region(document: &Html) -> ElementRef<'_> {
    for css in ["[role=main]", "body"] {
        if let Ok(selector) = Selector::parse(css) {
            if let Some(el) = document.select(&selector).next() {
                return el;
            }
        }
    }
    document.root_element()
}

/// Text of a subtree laid out line-wise, roughly like `innerText`: block
/// elements start new lines, whitespace inside a line is collapsed, empty
/// lines are dropped.
pub fn rendered_text(el: &ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(el, &mut raw);
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// `rendered_text` split into its lines.
pub fn rendered_lines(el: &ElementRef<'_>) -> Vec<String> {
    rendered_text(el).lines().map(str::to_string).collect()
}

fn collect_text(element: &ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            let tag_name = child_element.value().name();
            if SKIPPED_TAGS.contains(&tag_name) || child_element.value().attr("hidden").is_some()
            {
                continue;
            }
            if tag_name == "br" {
                out.push('\n');
                continue;
            }
            let block = BLOCK_TAGS.contains(&tag_name);
            if block {
                out.push('\n');
            }
            collect_text(&child_element, out);
            if block {
                out.push('\n');
            }
        } else if let Some(text_node) = child.value().as_text() {
            // Source newlines inside a text run are layout whitespace, not breaks.
            out.push_str(&text_node.text.replace(['\n', '\r'], " "));
        }
    }
}

/// Trimmed, whitespace-collapsed text of one element, single line.
pub fn inline_text(el: &ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
