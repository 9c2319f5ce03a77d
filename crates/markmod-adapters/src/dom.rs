//! Owned HTML fragment tree.
//!
//! Rendered markdown is parsed with html5ever in body-fragment mode and
//! copied into a plain tagged tree. Every pass gets its own parse, so a
//! rewrite for one framework can never leak into another.

use std::fmt::Write;

use html5ever::tendril::TendrilSink;
use html5ever::{local_name, namespace_url, ns, parse_fragment, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// A node in an HTML fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    Doctype(String),
}

/// An HTML element with ordered attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<Attribute>,
    pub children: Vec<Node>,
}

/// A single attribute, name as written after parsing (lowercased).
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Top-level node sequence of a parsed fragment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fragment {
    pub nodes: Vec<Node>,
}

impl Fragment {
    /// Parse an HTML string as the content of a `<body>` element.
    pub fn parse(html: &str) -> Self {
        let context = QualName::new(None, ns!(html), local_name!("body"));
        let dom = parse_fragment(RcDom::default(), ParseOpts::default(), context, Vec::new())
            .one(html);

        // Fragment parsing hangs the nodes off a synthetic <html> root.
        let document = dom.document.children.borrow();
        let nodes = match document.first() {
            Some(root) => root.children.borrow().iter().filter_map(convert).collect(),
            None => Vec::new(),
        };

        Self { nodes }
    }

    /// Serialize the fragment back to HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        serialize_nodes(&self.nodes, None, &mut out);
        out
    }
}

fn convert(handle: &Handle) -> Option<Node> {
    match handle.data {
        NodeData::Element {
            ref name,
            ref attrs,
            ref template_contents,
            ..
        } => {
            let attrs = attrs
                .borrow()
                .iter()
                .map(|attr| Attribute {
                    name: match attr.name.prefix {
                        Some(ref prefix) => format!("{}:{}", prefix, attr.name.local),
                        None => attr.name.local.to_string(),
                    },
                    value: attr.value.to_string(),
                })
                .collect();
            // `<template>` children live in a separate content fragment.
            let children = match template_contents.borrow().as_ref() {
                Some(contents) => contents.children.borrow().iter().filter_map(convert).collect(),
                None => handle.children.borrow().iter().filter_map(convert).collect(),
            };
            Some(Node::Element(Element {
                name: name.local.to_string(),
                attrs,
                children,
            }))
        }
        NodeData::Text { ref contents } => Some(Node::Text(contents.borrow().to_string())),
        NodeData::Comment { ref contents } => Some(Node::Comment(contents.to_string())),
        NodeData::Doctype { ref name, .. } => Some(Node::Doctype(name.to_string())),
        NodeData::Document | NodeData::ProcessingInstruction { .. } => None,
    }
}

impl Element {
    /// Create an element with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Whether this element's tag is `name`.
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name == name)
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = value,
            None => self.attrs.push(Attribute {
                name: name.to_string(),
                value,
            }),
        }
    }

    /// Serialized markup of this element's children.
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        serialize_nodes(&self.children, Some(&self.name), &mut out);
        out
    }

    /// Serialized markup of this element including its own tags.
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        serialize_element(self, &mut out);
        out
    }
}

/// Elements that never have content or an end tag.
pub fn is_void(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Elements whose text content is serialized without escaping.
pub fn is_raw_text(name: &str) -> bool {
    matches!(
        name,
        "style" | "script" | "xmp" | "iframe" | "noembed" | "noframes" | "plaintext"
    )
}

fn serialize_nodes(nodes: &[Node], parent: Option<&str>, out: &mut String) {
    if let (Some("pre" | "textarea" | "listing"), Some(Node::Text(text))) = (parent, nodes.first())
    {
        // A leading newline is eaten by the parser; write it back.
        if text.starts_with('\n') {
            out.push('\n');
        }
    }

    for node in nodes {
        match node {
            Node::Element(element) => serialize_element(element, out),
            Node::Text(text) => match parent {
                Some(name) if is_raw_text(name) => out.push_str(text),
                _ => escape_text(text, out),
            },
            Node::Comment(text) => {
                let _ = write!(out, "<!--{}-->", text);
            }
            Node::Doctype(name) => {
                let _ = write!(out, "<!DOCTYPE {}>", name);
            }
        }
    }
}

fn serialize_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);
    for attr in &element.attrs {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        escape_attr(&attr.value, out);
        out.push('"');
    }
    out.push('>');

    if is_void(&element.name) {
        return;
    }

    serialize_nodes(&element.children, Some(&element.name), out);
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_top_level_nodes() {
        let fragment = Fragment::parse("<h1>A</h1>\n<p>b <em>c</em></p><!-- note -->");

        assert_eq!(fragment.nodes.len(), 4);
        assert!(matches!(&fragment.nodes[0], Node::Element(e) if e.is("h1")));
        assert_eq!(fragment.nodes[1], Node::Text("\n".to_string()));
        assert_eq!(fragment.nodes[3], Node::Comment(" note ".to_string()));
    }

    #[test]
    fn round_trips_rendered_markdown() {
        let html = "<h2>Title</h2>\n<p>a &amp; b &lt; c</p>\n<pre><code class=\"language-rs\">let x = 1;\n</code></pre>\n";

        assert_eq!(Fragment::parse(html).to_html(), html);
    }

    #[test]
    fn keeps_template_contents() {
        let html = "<template><p>hidden text</p></template>";
        let fragment = Fragment::parse(html);

        let Node::Element(template) = &fragment.nodes[0] else {
            panic!("expected template");
        };
        assert!(template.is("template"));
        assert_eq!(
            template.children,
            vec![Node::Element(Element {
                name: "p".to_string(),
                attrs: Vec::new(),
                children: vec![Node::Text("hidden text".to_string())],
            })]
        );
        assert_eq!(fragment.to_html(), html);
    }

    #[test]
    fn writes_void_elements_without_end_tag() {
        let fragment = Fragment::parse("<p>a<br />b</p><hr/>");

        assert_eq!(fragment.to_html(), "<p>a<br>b</p><hr>");
    }

    #[test]
    fn keeps_script_text_verbatim() {
        let html = "<script>if (a < b && c) {}</script><style>a > b {}</style>";

        assert_eq!(Fragment::parse(html).to_html(), html);
    }

    #[test]
    fn restores_leading_newline_in_pre() {
        let fragment = Fragment::parse("<pre>\n\nindented</pre>");

        assert_eq!(fragment.to_html(), "<pre>\n\nindented</pre>");
    }

    #[test]
    fn escapes_attribute_quotes() {
        let mut element = Element::new("a");
        element.set_attr("title", "say \"hi\" & go");

        assert_eq!(
            element.outer_html(),
            "<a title=\"say &quot;hi&quot; &amp; go\"></a>"
        );
    }

    #[test]
    fn attribute_helpers() {
        let mut element = Element::new("code");
        element.set_attr("class", "a");
        element.set_attr("id", "x");
        element.set_attr("class", "b");

        assert_eq!(element.attr("class"), Some("b"));
        assert_eq!(element.attrs[0].name, "class");
        assert!(element.has_attr("id"));
        assert!(!element.has_attr("missing"));
    }

    #[test]
    fn inner_html_serializes_children() {
        let fragment = Fragment::parse("<h3>Use <code>x&lt;1</code> here</h3>");
        let Node::Element(heading) = &fragment.nodes[0] else {
            panic!("expected element");
        };

        assert_eq!(heading.inner_html(), "Use <code>x&lt;1</code> here");
    }
}
