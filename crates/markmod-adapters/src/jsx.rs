//! Component tree and `React.createElement` code generation.
//!
//! The React adapter lowers the HTML tree into this small tree first. Raw
//! HTML injection is a node kind of its own here, so the code generator
//! writes it as a live object expression instead of a quoted attribute.

/// A node of a component tree.
#[derive(Debug, Clone, PartialEq)]
pub enum JsxNode {
    Element(JsxElement),
    /// Text, already cleaned of JSX-insignificant whitespace
    Text(String),
    /// A live JavaScript expression (`{expr}` in JSX)
    Expression(String),
}

/// A host element with its props and children.
#[derive(Debug, Clone, PartialEq)]
pub struct JsxElement {
    pub name: String,
    pub props: Vec<Prop>,
    pub children: Vec<JsxNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prop {
    pub name: String,
    pub value: PropValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    /// A string literal value
    Literal(String),
    /// `{ __html: <markup> }`, markup inserted without escaping at runtime
    RawHtml(String),
}

impl JsxElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            props: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Every expression in this subtree, in document order.
    pub fn expressions(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_expressions(&self.children, &mut out);
        out
    }
}

fn collect_expressions<'a>(nodes: &'a [JsxNode], out: &mut Vec<&'a str>) {
    for node in nodes {
        match node {
            JsxNode::Element(element) => collect_expressions(&element.children, out),
            JsxNode::Expression(expr) => out.push(expr),
            JsxNode::Text(_) => {}
        }
    }
}

/// Generate a `React.createElement` call tree for `element`.
///
/// `indent` is the column the call starts at; nested calls with element
/// children are broken over lines two spaces deeper.
pub fn create_element(element: &JsxElement, indent: usize) -> String {
    let mut out = String::new();
    write_element(element, indent, &mut out);
    out
}

fn write_element(element: &JsxElement, indent: usize, out: &mut String) {
    let mut args = vec![js_string(&element.name), props_object(&element.props)];
    let nested = element
        .children
        .iter()
        .any(|c| matches!(c, JsxNode::Element(_)));

    if !nested {
        args.extend(element.children.iter().map(leaf));
        out.push_str("React.createElement(");
        out.push_str(&args.join(", "));
        out.push(')');
        return;
    }

    let pad = " ".repeat(indent + 2);
    out.push_str("React.createElement(\n");
    for arg in &args {
        out.push_str(&pad);
        out.push_str(arg);
        out.push_str(",\n");
    }
    for (i, child) in element.children.iter().enumerate() {
        out.push_str(&pad);
        match child {
            JsxNode::Element(child) => write_element(child, indent + 2, out),
            other => out.push_str(&leaf(other)),
        }
        if i + 1 < element.children.len() {
            out.push(',');
        }
        out.push('\n');
    }
    out.push_str(&" ".repeat(indent));
    out.push(')');
}

fn leaf(node: &JsxNode) -> String {
    match node {
        JsxNode::Text(text) => js_string(text),
        JsxNode::Expression(expr) => expr.trim().to_string(),
        JsxNode::Element(element) => create_element(element, 0),
    }
}

fn props_object(props: &[Prop]) -> String {
    if props.is_empty() {
        return "null".to_string();
    }

    let entries: Vec<String> = props
        .iter()
        .map(|prop| {
            let value = match &prop.value {
                PropValue::Literal(value) => js_string(value),
                PropValue::RawHtml(html) => format!("{{ __html: {} }}", js_string(html)),
            };
            format!("{}: {}", js_key(&prop.name), value)
        })
        .collect();

    format!("{{ {} }}", entries.join(", "))
}

/// Apply JSX text whitespace rules.
///
/// Lines are trimmed where they meet a line break, blank lines vanish and
/// the remaining lines are joined with single spaces. Returns `None` when
/// nothing is left.
pub fn clean_text(text: &str) -> Option<String> {
    let lines: Vec<&str> = text.split('\n').map(|l| l.trim_end_matches('\r')).collect();
    let last_non_empty = lines.iter().rposition(|l| l.contains(|c| c != ' ' && c != '\t'));
    let mut out = String::new();

    for (i, line) in lines.iter().enumerate() {
        let line = line.replace('\t', " ");
        let mut trimmed = line.as_str();
        if i != 0 {
            trimmed = trimmed.trim_start_matches(' ');
        }
        if i + 1 != lines.len() {
            trimmed = trimmed.trim_end_matches(' ');
        }
        if trimmed.is_empty() {
            continue;
        }
        out.push_str(trimmed);
        if Some(i) != last_non_empty {
            out.push(' ');
        }
    }

    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Quote a string as a JavaScript string literal.
pub fn js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// An object literal key, quoted unless it is a plain identifier.
pub fn js_key(name: &str) -> String {
    let mut chars = name.chars();
    let plain = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');

    if plain {
        name.to_string()
    } else {
        js_string(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cleans_whitespace_like_jsx() {
        assert_eq!(clean_text("\n"), None);
        assert_eq!(clean_text("  \n   "), None);
        assert_eq!(clean_text("hello "), Some("hello ".to_string()));
        assert_eq!(clean_text("  a\n   b  \n"), Some("  a b".to_string()));
        assert_eq!(clean_text("one\n\n two"), Some("one two".to_string()));
    }

    #[test]
    fn quotes_strings() {
        assert_eq!(js_string("a \"b\"\n\\"), r#""a \"b\"\n\\""#);
        assert_eq!(js_string("x&lt;1"), "\"x&lt;1\"");
    }

    #[test]
    fn quotes_keys_when_needed() {
        assert_eq!(js_key("className"), "className");
        assert_eq!(js_key("data-id"), "\"data-id\"");
        assert_eq!(js_key("xlink:href"), "\"xlink:href\"");
    }

    #[test]
    fn generates_flat_call() {
        let mut p = JsxElement::new("p");
        p.children.push(JsxNode::Text("Hi ".to_string()));
        p.children.push(JsxNode::Expression("name".to_string()));

        assert_eq!(
            create_element(&p, 0),
            r#"React.createElement("p", null, "Hi ", name)"#
        );
    }

    #[test]
    fn generates_raw_html_prop() {
        let mut code = JsxElement::new("code");
        code.props.push(Prop {
            name: "className".to_string(),
            value: PropValue::Literal("lang-js".to_string()),
        });
        code.props.push(Prop {
            name: "dangerouslySetInnerHTML".to_string(),
            value: PropValue::RawHtml("x&lt;1".to_string()),
        });
        let mut pre = JsxElement::new("pre");
        pre.children.push(JsxNode::Element(code));

        let expected = r#"React.createElement(
  "pre",
  null,
  React.createElement("code", { className: "lang-js", dangerouslySetInnerHTML: { __html: "x&lt;1" } })
)"#;
        assert_eq!(create_element(&pre, 0), expected);
    }

    #[test]
    fn collects_expressions_in_order() {
        let mut inner = JsxElement::new("em");
        inner.children.push(JsxNode::Expression("b".to_string()));
        let mut outer = JsxElement::new("p");
        outer.children.push(JsxNode::Expression("a".to_string()));
        outer.children.push(JsxNode::Element(inner));
        outer.children.push(JsxNode::Expression("c".to_string()));

        assert_eq!(outer.expressions(), vec!["a", "b", "c"]);
    }
}
