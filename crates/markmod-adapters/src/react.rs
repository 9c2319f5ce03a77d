//! React adapter: rendered markdown as a `React.createElement` component.

use crate::dom::{is_raw_text, Element, Fragment, Node};
use crate::expr;
use crate::jsx::{self, JsxElement, JsxNode, Prop, PropValue};
use crate::syntax;
use crate::traits::{AdapterError, AdapterOutput, FrameworkAdapter};

/// Names the generated function binds itself.
const RESERVED: &[&str] = &["props", "React", "markdown"];

/// React adapter.
///
/// Text outside code follows JSX rules: `{expr}` is a live expression that
/// can read any prop by name. Code elements are injected as raw HTML, so
/// braces in code samples stay literal.
#[derive(Debug, Default)]
pub struct ReactAdapter;

impl ReactAdapter {
    /// Create a new React adapter.
    pub fn new() -> Self {
        Self
    }

    /// Lower `html` into a component tree rooted at a `div`.
    pub fn component_tree(&self, html: &str) -> Result<JsxElement, AdapterError> {
        let fragment = Fragment::parse(html);
        let mut root = JsxElement::new("div");
        root.children = lower_nodes(&fragment.nodes, "div")?;
        Ok(root)
    }
}

impl FrameworkAdapter for ReactAdapter {
    fn name(&self) -> &'static str {
        "react"
    }

    fn export_name(&self) -> &'static str {
        "ReactComponent"
    }

    fn render(&self, html: &str, _filename: &str) -> Result<AdapterOutput, AdapterError> {
        let root = self.component_tree(html)?;

        let mut scope: Vec<String> = Vec::new();
        for expression in root.expressions() {
            for name in expr::free_identifiers(expression, RESERVED)? {
                if !scope.contains(&name) {
                    scope.push(name);
                }
            }
        }

        let mut code = String::from("function (props) {\n");
        if !scope.is_empty() {
            code.push_str(&format!("  const {{ {} }} = props;\n", scope.join(", ")));
        }
        code.push_str("  const markdown = ");
        code.push_str(&jsx::create_element(&root, 2));
        code.push_str(";\n  return markdown;\n}");

        let auxiliary = "import React from \"react\"".to_string();
        let module = format!("{}\nconst {} = {}\n", auxiliary, self.export_name(), code);
        syntax::check_module(&module, self.export_name())?;

        tracing::debug!(props = scope.len(), "generated React component");

        Ok(AdapterOutput {
            code,
            auxiliary: Some(auxiliary),
        })
    }
}

fn lower_nodes(nodes: &[Node], parent: &str) -> Result<Vec<JsxNode>, AdapterError> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Element(element) => out.push(JsxNode::Element(lower_element(element)?)),
            Node::Text(text) if is_raw_text(parent) => out.push(JsxNode::Text(text.clone())),
            Node::Text(text) => split_text(text, parent, &mut out)?,
            // JSX has no comment or doctype syntax.
            Node::Comment(_) | Node::Doctype(_) => {}
        }
    }
    Ok(out)
}

fn lower_element(element: &Element) -> Result<JsxElement, AdapterError> {
    let mut lowered = JsxElement::new(element.name.as_str());
    let retarget_class = element.is("pre") || element.is("code");

    for attr in &element.attrs {
        let name = if retarget_class && attr.name == "class" {
            "className"
        } else {
            attr.name.as_str()
        };
        lowered.props.push(Prop {
            name: name.to_string(),
            value: PropValue::Literal(attr.value.clone()),
        });
    }

    if element.is("code") {
        lowered.props.push(Prop {
            name: "dangerouslySetInnerHTML".to_string(),
            value: PropValue::RawHtml(element.inner_html()),
        });
        return Ok(lowered);
    }

    lowered.children = lower_nodes(&element.children, &element.name)?;
    Ok(lowered)
}

/// Split text into literal runs and `{expr}` expressions.
fn split_text(text: &str, parent: &str, out: &mut Vec<JsxNode>) -> Result<(), AdapterError> {
    let mut rest = text;
    while let Some(pos) = rest.find(['{', '}']) {
        if rest.as_bytes()[pos] == b'}' {
            return Err(AdapterError::StrayBrace {
                element: parent.to_string(),
            });
        }

        push_text(&rest[..pos], out);
        let inner = &rest[pos + 1..];
        let end = expr::find_closing_brace(inner)?;
        let expression = inner[..end].trim();
        if !expression.is_empty() && !is_comment_only(expression) {
            out.push(JsxNode::Expression(expression.to_string()));
        }
        rest = &inner[end + 1..];
    }
    push_text(rest, out);
    Ok(())
}

fn push_text(text: &str, out: &mut Vec<JsxNode>) {
    if let Some(cleaned) = jsx::clean_text(text) {
        out.push(JsxNode::Text(cleaned));
    }
}

fn is_comment_only(expression: &str) -> bool {
    expression.len() >= 4
        && expression.starts_with("/*")
        && expression.ends_with("*/")
        && !expression[2..expression.len() - 2].contains("*/")
}
