//! Table of contents extraction from rendered HTML.

use serde::Serialize;

use crate::dom::{Fragment, Node};

/// A table of contents entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineEntry {
    /// Heading level (1-6)
    pub level: u8,
    /// Inner markup of the heading
    pub content: String,
}

/// Collect the headings that sit directly at the top level of `html`.
///
/// Only the fragment's own children are inspected. A heading wrapped in
/// another element (a `<div>` from a custom renderer, a `<details>` block)
/// is not part of the outline.
pub fn extract_outline(html: &str) -> Vec<OutlineEntry> {
    Fragment::parse(html)
        .nodes
        .iter()
        .filter_map(|node| match node {
            Node::Element(element) => heading_level(&element.name).map(|level| OutlineEntry {
                level,
                content: element.inner_html(),
            }),
            Node::Text(_) | Node::Comment(_) | Node::Doctype(_) => None,
        })
        .collect()
}

fn heading_level(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}
