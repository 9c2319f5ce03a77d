//! Vue adapter: rendered markdown as a compiled render function.

use crate::dom::{Fragment, Node};
use crate::template::{NativeTemplateCompiler, TemplateCompiler};
use crate::traits::{AdapterError, AdapterOutput, FrameworkAdapter};

const RENDER_EXPORT: &str = "export function render(";
const RENDER_LOCAL: &str = "function vueRender(";

/// Vue adapter.
///
/// Code samples are marked `v-pre` before compilation so mustaches inside
/// them stay literal text. The rest of the markup is a live template.
#[derive(Debug, Default)]
pub struct VueAdapter<C = NativeTemplateCompiler> {
    compiler: C,
}

impl VueAdapter {
    /// Create a Vue adapter using the built-in template compiler.
    pub fn new() -> Self {
        Self {
            compiler: NativeTemplateCompiler::new(),
        }
    }
}

impl<C: TemplateCompiler> VueAdapter<C> {
    /// Create a Vue adapter with a custom template compiler.
    pub fn with_compiler(compiler: C) -> Self {
        Self { compiler }
    }

    /// The template handed to the compiler for `html`.
    pub fn template(&self, html: &str) -> String {
        let mut fragment = Fragment::parse(html);

        for node in &mut fragment.nodes {
            if let Node::Element(element) = node {
                if element.is("pre") || element.is("code") {
                    element.set_attr("v-pre", "");
                }
            }
        }
        for node in &mut fragment.nodes {
            mark_code(node);
        }

        fragment.to_html()
    }
}

fn mark_code(node: &mut Node) {
    match node {
        Node::Element(element) => {
            if element.is("code") {
                element.set_attr("v-pre", "");
            }
            for child in &mut element.children {
                mark_code(child);
            }
        }
        Node::Text(_) | Node::Comment(_) | Node::Doctype(_) => {}
    }
}

impl<C: TemplateCompiler> FrameworkAdapter for VueAdapter<C> {
    fn name(&self) -> &'static str {
        "vue"
    }

    fn export_name(&self) -> &'static str {
        "VueComponent"
    }

    fn render(&self, html: &str, filename: &str) -> Result<AdapterOutput, AdapterError> {
        let template = self.template(html);
        let compiled = self.compiler.compile(&template, filename)?;

        for diagnostic in &compiled.diagnostics {
            tracing::warn!(filename, "{}", diagnostic);
        }

        if !compiled.code.contains(RENDER_EXPORT) {
            return Err(AdapterError::MissingRenderExport);
        }
        let auxiliary = compiled.code.replacen(RENDER_EXPORT, RENDER_LOCAL, 1);

        tracing::debug!(filename, "generated Vue component");

        Ok(AdapterOutput {
            code: "{ render: vueRender }".to_string(),
            auxiliary: Some(auxiliary),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{CompileError, CompiledTemplate};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingCompiler {
        seen: Mutex<Vec<String>>,
        code: String,
    }

    impl TemplateCompiler for RecordingCompiler {
        fn compile(
            &self,
            template: &str,
            _filename: &str,
        ) -> Result<CompiledTemplate, CompileError> {
            self.seen.lock().unwrap().push(template.to_string());
            Ok(CompiledTemplate {
                code: self.code.clone(),
                diagnostics: vec!["just a note".to_string()],
            })
        }
    }

    #[test]
    fn protects_code_and_leaves_text_live() {
        let adapter = VueAdapter::new();

        assert_eq!(
            adapter.template("<pre>code1</pre><p>{{ not a binding }}</p>"),
            r#"<pre v-pre="">code1</pre><p>{{ not a binding }}</p>"#
        );
    }

    #[test]
    fn marks_nested_code_but_not_nested_pre() {
        let adapter = VueAdapter::new();

        assert_eq!(
            adapter.template("<div><pre>a</pre><p><code>b</code></p></div><code>c</code>"),
            r#"<div><pre>a</pre><p><code v-pre="">b</code></p></div><code v-pre="">c</code>"#
        );
    }

    #[test]
    fn marks_code_inside_top_level_pre() {
        let adapter = VueAdapter::new();

        assert_eq!(
            adapter.template(r#"<pre><code class="language-js">{{ x }}</code></pre>"#),
            r#"<pre v-pre=""><code class="language-js" v-pre="">{{ x }}</code></pre>"#
        );
    }

    #[test]
    fn renames_render_export() {
        let output = VueAdapter::new()
            .render("<h1>{{ title }}</h1>\n<pre><code>{{ x }}</code></pre>\n", "doc.md")
            .unwrap();

        assert_eq!(output.code, "{ render: vueRender }");
        let auxiliary = output.auxiliary.unwrap();
        assert!(auxiliary.contains("function vueRender(_ctx, _cache) {"));
        assert!(!auxiliary.contains("export function render"));
        assert!(auxiliary.contains("_toDisplayString(_ctx.title)"));
        assert!(auxiliary.contains(r#""{{ x }}""#));
    }

    #[test]
    fn uses_injected_compiler() {
        let adapter = VueAdapter::with_compiler(RecordingCompiler {
            code: "export function render() { return null }".to_string(),
            ..Default::default()
        });

        let output = adapter.render("<code>x</code>", "doc.md").unwrap();

        assert_eq!(
            adapter.compiler.seen.lock().unwrap().as_slice(),
            [r#"<code v-pre="">x</code>"#.to_string()]
        );
        assert_eq!(
            output.auxiliary.as_deref(),
            Some("function vueRender() { return null }")
        );
    }

    #[test]
    fn requires_render_export() {
        let adapter = VueAdapter::with_compiler(RecordingCompiler {
            code: "export default {}".to_string(),
            ..Default::default()
        });

        let err = adapter.render("<p>x</p>", "doc.md").unwrap_err();

        assert!(matches!(err, AdapterError::MissingRenderExport));
    }

    #[test]
    fn surfaces_compile_errors() {
        let err = VueAdapter::new()
            .render(r#"<p v-for="x in xs">x</p>"#, "doc.md")
            .unwrap_err();

        assert!(matches!(err, AdapterError::Compile(_)));
        assert!(err.to_string().contains("v-for"));
    }
}
