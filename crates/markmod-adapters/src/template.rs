//! Vue template compilation.
//!
//! [`NativeTemplateCompiler`] turns an HTML template into a Vue 3 render
//! function module, the shape `@vue/compiler-dom` produces in module mode.
//! It covers what markdown output needs: elements, text, comments,
//! `{{ }}` interpolation, `v-pre`, `v-bind`, `v-on`, `v-html` and `v-text`.
//! Structural directives (`v-if`, `v-for`, slots) are rejected.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::dom::{is_raw_text, Element, Fragment, Node};
use crate::expr::{self, ExprError};
use crate::jsx::{js_key, js_string};
use crate::syntax::{self, SyntaxError};

/// Output of a template compiler.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompiledTemplate {
    /// Module source exporting `function render`
    pub code: String,

    /// Non-fatal problems found while compiling
    pub diagnostics: Vec<String>,
}

/// Compiles an HTML template into a render function module.
pub trait TemplateCompiler: Send + Sync {
    /// Compile `template`. `filename` labels diagnostics and errors.
    fn compile(&self, template: &str, filename: &str) -> Result<CompiledTemplate, CompileError>;
}

/// Errors that can occur when compiling a template.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("{filename}: unterminated interpolation in {text:?}")]
    UnterminatedInterpolation { filename: String, text: String },

    #[error("{filename}: empty interpolation in {text:?}")]
    EmptyInterpolation { filename: String, text: String },

    #[error("{filename}: {source}")]
    Expression { filename: String, source: ExprError },

    #[error("{filename}: unsupported directive `{name}` on <{element}>")]
    UnsupportedDirective {
        filename: String,
        name: String,
        element: String,
    },

    #[error("{filename}: {source}")]
    Syntax {
        filename: String,
        source: SyntaxError,
    },
}

/// Runtime helpers a render function imports from `vue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Helper {
    OpenBlock,
    CreateElementBlock,
    CreateElementVNode,
    CreateTextVNode,
    CreateCommentVNode,
    ToDisplayString,
    NormalizeClass,
    NormalizeStyle,
    Fragment,
}

impl Helper {
    fn name(self) -> &'static str {
        match self {
            Self::OpenBlock => "openBlock",
            Self::CreateElementBlock => "createElementBlock",
            Self::CreateElementVNode => "createElementVNode",
            Self::CreateTextVNode => "createTextVNode",
            Self::CreateCommentVNode => "createCommentVNode",
            Self::ToDisplayString => "toDisplayString",
            Self::NormalizeClass => "normalizeClass",
            Self::NormalizeStyle => "normalizeStyle",
            Self::Fragment => "Fragment",
        }
    }
}

// Same shapes @vue/compiler-core uses to decide whether a v-on value is
// a handler reference or an inline statement.
static MEMBER_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_$][\w$]*(?:\s*\.\s*[A-Za-z_$][\w$]*|\[[^\]]+\])*$")
        .expect("Invalid member path regex")
});

static FN_EXPRESSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:async\s*)?(?:\([^)]*?\)|[\w$]+)\s*(?::[^=]+)?=>|^\s*(?:async\s+)?function(?:\s+[\w$]+)?\s*\(")
        .expect("Invalid function expression regex")
});

/// Template compiler producing Vue 3 render functions without a JS runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeTemplateCompiler;

impl NativeTemplateCompiler {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateCompiler for NativeTemplateCompiler {
    fn compile(&self, template: &str, filename: &str) -> Result<CompiledTemplate, CompileError> {
        let fragment = Fragment::parse(template);
        let mut codegen = Codegen {
            filename,
            helpers: BTreeSet::new(),
            diagnostics: Vec::new(),
        };

        let root = codegen.root(&fragment.nodes)?;

        let mut code = String::new();
        if !codegen.helpers.is_empty() {
            let imports: Vec<String> = codegen
                .helpers
                .iter()
                .map(|h| format!("{0} as _{0}", h.name()))
                .collect();
            code.push_str(&format!(
                "import {{ {} }} from \"vue\"\n\n",
                imports.join(", ")
            ));
        }
        code.push_str("export function render(_ctx, _cache) {\n");
        code.push_str(&format!("  return {}\n", root));
        code.push_str("}\n");

        syntax::check_module(&code, filename).map_err(|source| CompileError::Syntax {
            filename: filename.to_string(),
            source,
        })?;

        tracing::trace!(filename, helpers = codegen.helpers.len(), "compiled template");

        Ok(CompiledTemplate {
            code,
            diagnostics: codegen.diagnostics,
        })
    }
}

/// Where in the template a node sits.
#[derive(Debug, Clone, Copy, Default)]
struct Scope {
    /// Inside a `<pre>`: whitespace is kept as written
    in_pre: bool,
    /// Inside a `v-pre` subtree: no directives, no interpolation
    v_pre: bool,
    /// Inside a raw text element such as `<textarea>`
    raw: bool,
}

enum Child {
    /// A string-valued JavaScript expression
    Text(String),
    /// Arguments of an element vnode call
    Element(String),
    /// A comment vnode expression
    Comment(String),
}

struct Codegen<'a> {
    filename: &'a str,
    helpers: BTreeSet<Helper>,
    diagnostics: Vec<String>,
}

impl Codegen<'_> {
    fn root(&mut self, nodes: &[Node]) -> Result<String, CompileError> {
        let single = single_root(nodes);
        let children = self.children(nodes, Scope::default(), if single { 2 } else { 4 })?;
        if children.is_empty() {
            return Ok("null".to_string());
        }

        self.helpers.insert(Helper::OpenBlock);
        self.helpers.insert(Helper::CreateElementBlock);

        if single {
            if let Some(Child::Element(args)) = children.into_iter().next() {
                return Ok(format!("(_openBlock(), _createElementBlock({}))", args));
            }
            return Ok("null".to_string());
        }

        self.helpers.insert(Helper::Fragment);
        let vnodes: Vec<String> = children.into_iter().map(|c| self.vnode(c)).collect();

        Ok(format!(
            "(_openBlock(), _createElementBlock(_Fragment, null, [\n{}\n  ]))",
            indent_join(&vnodes, 4)
        ))
    }

    fn vnode(&mut self, child: Child) -> String {
        match child {
            Child::Element(args) => {
                self.helpers.insert(Helper::CreateElementVNode);
                format!("_createElementVNode({})", args)
            }
            Child::Comment(code) => code,
            Child::Text(expr) => {
                self.helpers.insert(Helper::CreateTextVNode);
                format!("_createTextVNode({})", expr)
            }
        }
    }

    fn children(
        &mut self,
        nodes: &[Node],
        scope: Scope,
        indent: usize,
    ) -> Result<Vec<Child>, CompileError> {
        let mut out = Vec::with_capacity(nodes.len());

        for (i, node) in nodes.iter().enumerate() {
            match node {
                Node::Element(element) if element.is("script") || element.is("style") => {
                    self.diagnostics.push(format!(
                        "{}: <{}> is ignored in templates",
                        self.filename, element.name
                    ));
                }
                Node::Element(element) => {
                    out.push(Child::Element(self.element(element, scope, indent)?));
                }
                Node::Text(text) => {
                    let text = if scope.in_pre || scope.raw {
                        text.clone()
                    } else if is_blank(text) {
                        if !keep_blank(nodes, i, text) {
                            continue;
                        }
                        " ".to_string()
                    } else {
                        condense(text)
                    };
                    out.push(Child::Text(self.text(&text, scope.v_pre || scope.raw)?));
                }
                Node::Comment(comment) => {
                    self.helpers.insert(Helper::CreateCommentVNode);
                    out.push(Child::Comment(format!(
                        "_createCommentVNode({})",
                        js_string(comment)
                    )));
                }
                Node::Doctype(_) => {
                    self.diagnostics
                        .push(format!("{}: doctype is ignored in templates", self.filename));
                }
            }
        }

        Ok(out)
    }

    /// Arguments of the vnode call for `element`.
    fn element(
        &mut self,
        element: &Element,
        scope: Scope,
        indent: usize,
    ) -> Result<String, CompileError> {
        let v_pre = scope.v_pre || element.has_attr("v-pre");
        let (props, owns_content) = self.props(element, v_pre)?;
        let inner = Scope {
            in_pre: scope.in_pre || element.is("pre"),
            v_pre,
            raw: is_raw_text(&element.name),
        };
        let children = if owns_content {
            Vec::new()
        } else {
            self.children(&element.children, inner, indent + 2)?
        };

        let mut args = vec![js_string(&element.name)];

        if children.is_empty() {
            args.extend(props);
        } else {
            args.push(props.unwrap_or_else(|| "null".to_string()));
            if children.iter().all(|c| matches!(c, Child::Text(_))) {
                let texts: Vec<String> = children
                    .into_iter()
                    .map(|c| match c {
                        Child::Text(expr) | Child::Element(expr) | Child::Comment(expr) => expr,
                    })
                    .collect();
                args.push(texts.join(" + "));
            } else {
                let vnodes: Vec<String> = children.into_iter().map(|c| self.vnode(c)).collect();
                args.push(format!(
                    "[\n{}\n{}]",
                    indent_join(&vnodes, indent + 2),
                    " ".repeat(indent)
                ));
            }
        }

        Ok(args.join(", "))
    }

    /// Build the props object. The flag is set when a directive supplies
    /// the element's content (`v-html`, `v-text`).
    fn props(
        &mut self,
        element: &Element,
        v_pre: bool,
    ) -> Result<(Option<String>, bool), CompileError> {
        let mut entries: Vec<Entry> = Vec::new();
        let mut class = Merged::default();
        let mut style = Merged::default();
        let mut owns_content = false;

        for attr in &element.attrs {
            let kind = if v_pre {
                match attr.name.as_str() {
                    "v-pre" => AttrKind::Pre,
                    _ => AttrKind::Static,
                }
            } else {
                classify(&attr.name)
            };

            match kind {
                AttrKind::Pre => {}
                AttrKind::Static if attr.name == "class" => {
                    class.add_static(&attr.value, &mut entries, Entry::Class);
                }
                AttrKind::Static if attr.name == "style" => {
                    style.add_static(&attr.value, &mut entries, Entry::Style);
                }
                AttrKind::Static => {
                    entries.push(Entry::Plain(js_key(&attr.name), js_string(&attr.value)));
                }
                AttrKind::Bind(arg) => {
                    let value = self.expression(&attr.value, &[])?;
                    match arg {
                        "class" => class.add_dynamic(value, &mut entries, Entry::Class),
                        "style" => style.add_dynamic(value, &mut entries, Entry::Style),
                        _ => entries.push(Entry::Plain(js_key(arg), value)),
                    }
                }
                AttrKind::On(event) => {
                    let handler = self.handler(&attr.value)?;
                    entries.push(Entry::Plain(js_key(&handler_key(event)), handler));
                }
                AttrKind::Html => {
                    let value = self.expression(&attr.value, &[])?;
                    entries.push(Entry::Plain("innerHTML".to_string(), value));
                    owns_content = true;
                }
                AttrKind::Text => {
                    let value = self.expression(&attr.value, &[])?;
                    self.helpers.insert(Helper::ToDisplayString);
                    entries.push(Entry::Plain(
                        "textContent".to_string(),
                        format!("_toDisplayString({})", value),
                    ));
                    owns_content = true;
                }
                AttrKind::Unsupported => {
                    return Err(CompileError::UnsupportedDirective {
                        filename: self.filename.to_string(),
                        name: attr.name.clone(),
                        element: element.name.clone(),
                    });
                }
            }
        }

        if entries.is_empty() {
            return Ok((None, owns_content));
        }

        let rendered: Vec<String> = entries
            .iter()
            .map(|entry| match entry {
                Entry::Plain(key, value) => format!("{}: {}", key, value),
                Entry::Class => format!(
                    "class: {}",
                    class.render("_normalizeClass", Helper::NormalizeClass, &mut self.helpers)
                ),
                Entry::Style => format!(
                    "style: {}",
                    style.render("_normalizeStyle", Helper::NormalizeStyle, &mut self.helpers)
                ),
            })
            .collect();

        Ok((Some(format!("{{ {} }}", rendered.join(", "))), owns_content))
    }

    fn expression(&self, source: &str, locals: &[&str]) -> Result<String, CompileError> {
        expr::prefix_identifiers(source.trim(), "_ctx.", locals).map_err(|source| {
            CompileError::Expression {
                filename: self.filename.to_string(),
                source,
            }
        })
    }

    fn handler(&self, source: &str) -> Result<String, CompileError> {
        let source = source.trim();
        if MEMBER_PATH_RE.is_match(source) || FN_EXPRESSION_RE.is_match(source) {
            return self.expression(source, &[]);
        }
        let statement = self.expression(source, &["$event"])?;
        Ok(format!("$event => ({})", statement))
    }

    /// Compile text with `{{ }}` interpolations into a string expression.
    fn text(&mut self, text: &str, literal: bool) -> Result<String, CompileError> {
        if literal {
            return Ok(js_string(text));
        }

        let mut parts = Vec::new();
        let mut rest = text;
        while let Some(open) = rest.find("{{") {
            if open > 0 {
                parts.push(js_string(&rest[..open]));
            }
            let after = &rest[open + 2..];
            let Some(close) = after.find("}}") else {
                return Err(CompileError::UnterminatedInterpolation {
                    filename: self.filename.to_string(),
                    text: text.to_string(),
                });
            };
            let source = after[..close].trim();
            if source.is_empty() {
                return Err(CompileError::EmptyInterpolation {
                    filename: self.filename.to_string(),
                    text: text.to_string(),
                });
            }
            let value = self.expression(source, &[])?;
            self.helpers.insert(Helper::ToDisplayString);
            parts.push(format!("_toDisplayString({})", value));
            rest = &after[close + 2..];
        }
        if !rest.is_empty() || parts.is_empty() {
            parts.push(js_string(rest));
        }

        Ok(parts.join(" + "))
    }
}

/// A props object entry. Class and style are placeholders, rendered once
/// all their static and bound parts are known.
enum Entry {
    Plain(String, String),
    Class,
    Style,
}

/// Static and bound halves of `class` or `style`.
#[derive(Default)]
struct Merged {
    fixed: Option<String>,
    bound: Option<String>,
}

impl Merged {
    fn seen(&self) -> bool {
        self.fixed.is_some() || self.bound.is_some()
    }

    fn add_static(&mut self, value: &str, entries: &mut Vec<Entry>, entry: Entry) {
        if !self.seen() {
            entries.push(entry);
        }
        self.fixed = Some(value.to_string());
    }

    fn add_dynamic(&mut self, value: String, entries: &mut Vec<Entry>, entry: Entry) {
        if !self.seen() {
            entries.push(entry);
        }
        self.bound = Some(value);
    }

    fn render(&self, normalize: &str, helper: Helper, helpers: &mut BTreeSet<Helper>) -> String {
        match (&self.fixed, &self.bound) {
            (Some(fixed), None) => js_string(fixed),
            (None, Some(bound)) => {
                helpers.insert(helper);
                format!("{}({})", normalize, bound)
            }
            (Some(fixed), Some(bound)) => {
                helpers.insert(helper);
                format!("{}([{}, {}])", normalize, js_string(fixed), bound)
            }
            (None, None) => "undefined".to_string(),
        }
    }
}

enum AttrKind<'a> {
    Static,
    Pre,
    Bind(&'a str),
    On(&'a str),
    Html,
    Text,
    Unsupported,
}

fn classify(name: &str) -> AttrKind<'_> {
    if name == "v-pre" {
        return AttrKind::Pre;
    }
    if let Some(arg) = name.strip_prefix(':').or_else(|| name.strip_prefix("v-bind:")) {
        return if is_plain_argument(arg) {
            AttrKind::Bind(arg)
        } else {
            AttrKind::Unsupported
        };
    }
    if let Some(event) = name.strip_prefix('@').or_else(|| name.strip_prefix("v-on:")) {
        return if is_plain_argument(event) {
            AttrKind::On(event)
        } else {
            AttrKind::Unsupported
        };
    }
    match name {
        "v-html" => AttrKind::Html,
        "v-text" => AttrKind::Text,
        _ if name.starts_with("v-") || name.starts_with('#') => AttrKind::Unsupported,
        _ => AttrKind::Static,
    }
}

/// Directive arguments without modifiers or dynamic `[...]` parts.
fn is_plain_argument(arg: &str) -> bool {
    !arg.is_empty() && !arg.contains(['.', '[', ']'])
}

/// `click` → `onClick`, `my-event` → `onMyEvent`, `update:value` → `onUpdate:value`.
fn handler_key(event: &str) -> String {
    let mut key = String::from("on");
    let mut upper = true;
    for c in event.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            key.extend(c.to_uppercase());
            upper = false;
        } else {
            key.push(c);
        }
    }
    key
}

/// Whether the template has exactly one root node and it is an element.
fn single_root(nodes: &[Node]) -> bool {
    let mut roots = nodes.iter().enumerate().filter(|(i, node)| match node {
        Node::Element(element) => !element.is("script") && !element.is("style"),
        Node::Text(text) => !is_blank(text) || keep_blank(nodes, *i, text),
        Node::Comment(_) => true,
        Node::Doctype(_) => false,
    });
    matches!(
        (roots.next(), roots.next()),
        (Some((_, Node::Element(_))), None)
    )
}

fn is_blank(text: &str) -> bool {
    text.chars()
        .all(|c| matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{c}'))
}

/// Whether a whitespace-only text node at `index` survives condensing.
fn keep_blank(nodes: &[Node], index: usize, text: &str) -> bool {
    let prev = index.checked_sub(1).and_then(|i| nodes.get(i));
    let next = nodes.get(index + 1);
    match (prev, next) {
        (None, _) | (_, None) => false,
        (Some(Node::Comment(_)), _) | (_, Some(Node::Comment(_))) => false,
        (Some(Node::Element(_)), Some(Node::Element(_))) => !text.contains(['\n', '\r']),
        _ => true,
    }
}

/// Collapse whitespace runs into single spaces.
fn condense(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{c}') {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn indent_join(items: &[String], indent: usize) -> String {
    let pad = " ".repeat(indent);
    items
        .iter()
        .map(|item| format!("{}{}", pad, item))
        .collect::<Vec<_>>()
        .join(",\n")
}
