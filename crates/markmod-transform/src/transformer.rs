//! Per-document transform: markdown source to module text.

use std::sync::Arc;

use markmod_adapters::{extract_outline, AdapterError, FrameworkAdapter, ReactAdapter, VueAdapter};
use markmod_md::{
    extract_frontmatter, resolve_renderer, FrontmatterError, MarkdownRenderer, RenderError,
};

use crate::module::ExportedModule;
use crate::options::{Mode, TransformOptions};

/// Errors that can occur when transforming a document.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("Invalid frontmatter: {0}")]
    Frontmatter(#[from] FrontmatterError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error("Failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Turns markdown documents into JavaScript modules.
///
/// Holds no per-document state; one transformer can serve many documents,
/// from several threads at once.
pub struct Transformer {
    options: TransformOptions,
    renderer: Arc<dyn MarkdownRenderer>,
    react: Box<dyn FrameworkAdapter>,
    vue: Box<dyn FrameworkAdapter>,
}

impl Transformer {
    pub fn new(options: TransformOptions) -> Self {
        let renderer = resolve_renderer(
            options.markdown_renderer.as_ref(),
            options.markdown.as_ref(),
        );

        Self {
            options,
            renderer,
            react: Box::new(ReactAdapter::new()),
            vue: Box::new(VueAdapter::new()),
        }
    }

    /// Replace the adapter producing `ReactComponent`.
    pub fn with_react_adapter(mut self, adapter: impl FrameworkAdapter + 'static) -> Self {
        self.react = Box::new(adapter);
        self
    }

    /// Replace the adapter producing `VueComponent`.
    pub fn with_vue_adapter(mut self, adapter: impl FrameworkAdapter + 'static) -> Self {
        self.vue = Box::new(adapter);
        self
    }

    /// Transform `source` if `path` names a markdown file.
    ///
    /// Returns `Ok(None)` for any path not ending in `.md`.
    pub fn transform(&self, source: &str, path: &str) -> Result<Option<String>, TransformError> {
        if !path.ends_with(".md") {
            return Ok(None);
        }
        self.transform_document(source, path).map(Some)
    }

    /// Transform `source` regardless of its path.
    pub fn transform_document(&self, source: &str, path: &str) -> Result<String, TransformError> {
        let document = extract_frontmatter(source)?;
        let mut module = ExportedModule::new();
        module.add_export_json("attributes", &document.attributes)?;

        let html = self.renderer.render(document.body)?;
        tracing::debug!(path, bytes = html.len(), "rendered markdown");

        if self.options.has(Mode::Html) {
            module.add_export_json("html", &html)?;
        }

        if self.options.has(Mode::Toc) {
            let toc = extract_outline(&html);
            tracing::trace!(path, entries = toc.len(), "extracted outline");
            module.add_export_json("toc", &toc)?;
        }

        for (mode, adapter) in [(Mode::React, &self.react), (Mode::Vue, &self.vue)] {
            if !self.options.has(mode) {
                continue;
            }
            let output = adapter.render(&html, path)?;
            if let Some(auxiliary) = output.auxiliary {
                module.add_context(auxiliary);
            }
            module.add_export_code(adapter.export_name(), output.code);
            tracing::debug!(path, adapter = adapter.name(), "added component export");
        }

        Ok(module.serialize())
    }
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new(TransformOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markmod_adapters::AdapterOutput;
    use markmod_md::{markdown_fn, RendererConfig, RendererOptions};
    use pretty_assertions::assert_eq;

    const DOC: &str = "---\ntitle: Hello\ntags:\n  - a\n  - b\n---\n# Hello\n\n## Part\n\nText {{ x }}\n";

    fn transformer(mode: &[Mode]) -> Transformer {
        Transformer::new(TransformOptions::new().with_mode(mode.iter().copied()))
    }

    struct StubAdapter;

    impl FrameworkAdapter for StubAdapter {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn export_name(&self) -> &'static str {
            "ReactComponent"
        }

        fn render(&self, html: &str, filename: &str) -> Result<AdapterOutput, AdapterError> {
            Ok(AdapterOutput {
                code: format!("{:?}", (filename, html.len())),
                auxiliary: Some("const stub = 1".to_string()),
            })
        }
    }

    #[test]
    fn ignores_non_markdown_paths() {
        let out = transformer(&Mode::ALL).transform(DOC, "notes.txt").unwrap();

        assert_eq!(out, None);
    }

    #[test]
    fn exports_only_attributes_without_mode() {
        let out = transformer(&[]).transform(DOC, "doc.md").unwrap().unwrap();

        assert_eq!(
            out,
            "export const attributes = {\"title\":\"Hello\",\"tags\":[\"a\",\"b\"]};\n"
        );
    }

    #[test]
    fn keeps_frontmatter_key_order() {
        let source = "---\nzeta: 1\nalpha: 2\nmid: 3\n---\nbody\n";
        let out = transformer(&[]).transform(source, "doc.md").unwrap().unwrap();

        assert_eq!(
            out,
            "export const attributes = {\"zeta\":1,\"alpha\":2,\"mid\":3};\n"
        );
    }

    #[test]
    fn exports_empty_attributes_without_frontmatter() {
        let out = transformer(&[Mode::Html])
            .transform("Just *text*\n", "doc.md")
            .unwrap()
            .unwrap();

        assert_eq!(
            out,
            "export const attributes = {};\nexport const html = \"<p>Just <em>text</em></p>\\n\";\n"
        );
    }

    #[test]
    fn exports_html_and_toc() {
        let out = transformer(&[Mode::Toc, Mode::Html])
            .transform(DOC, "doc.md")
            .unwrap()
            .unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("export const attributes = "));
        assert!(lines[1].starts_with("export const html = \"<h1>Hello</h1>"));
        assert_eq!(
            lines[2],
            "export const toc = [{\"level\":1,\"content\":\"Hello\"},{\"level\":2,\"content\":\"Part\"}];"
        );
    }

    #[test]
    fn exports_components() {
        let out = transformer(&[Mode::React, Mode::Vue])
            .transform(DOC, "doc.md")
            .unwrap()
            .unwrap();

        assert!(out.starts_with("import React from \"react\"\nimport { "));
        assert!(out.contains("function vueRender(_ctx, _cache) {"));
        assert!(out.contains("export const ReactComponent = function (props) {"));
        assert!(out.contains("export const VueComponent = { render: vueRender };"));
        assert!(out.contains("_toDisplayString(_ctx.x)"));
    }

    #[test]
    fn rejects_bad_frontmatter() {
        let err = transformer(&Mode::ALL)
            .transform("---\ntitle: [unclosed\n---\nbody\n", "doc.md")
            .unwrap_err();

        assert!(matches!(err, TransformError::Frontmatter(_)));
    }

    #[test]
    fn rejects_unclosed_frontmatter() {
        let err = transformer(&[])
            .transform("---\ntitle: x\nbody\n", "doc.md")
            .unwrap_err();

        assert!(matches!(err, TransformError::Frontmatter(_)));
    }

    #[test]
    fn surfaces_adapter_errors() {
        let err = transformer(&[Mode::React])
            .transform("Stray } brace\n", "doc.md")
            .unwrap_err();

        assert!(matches!(
            err,
            TransformError::Adapter(AdapterError::StrayBrace { .. })
        ));
    }

    #[test]
    fn prefers_renderer_over_function() {
        let options = TransformOptions::new()
            .with_mode([Mode::Html])
            .with_markdown(markdown_fn(|_| Ok("<p>from fn</p>".to_string())))
            .with_renderer(RendererConfig::Options(RendererOptions {
                html: false,
                ..RendererOptions::default()
            }));

        let out = Transformer::new(options)
            .transform("<b>x</b>\n", "doc.md")
            .unwrap()
            .unwrap();

        assert!(out.contains("&lt;b&gt;x&lt;/b&gt;"));
        assert!(!out.contains("from fn"));
    }

    #[test]
    fn uses_render_function() {
        let options = TransformOptions::new()
            .with_mode([Mode::Html])
            .with_markdown(markdown_fn(|md| Ok(format!("<pre>{}</pre>", md.trim()))));

        let out = Transformer::new(options)
            .transform("hello", "doc.md")
            .unwrap()
            .unwrap();

        assert!(out.contains("export const html = \"<pre>hello</pre>\";"));
    }

    #[test]
    fn surfaces_render_errors() {
        let options = TransformOptions::new()
            .with_markdown(markdown_fn(|_| Err(RenderError::Failed("boom".to_string()))));

        let err = Transformer::new(options)
            .transform("hello", "doc.md")
            .unwrap_err();

        assert!(matches!(err, TransformError::Render(_)));
    }

    #[test]
    fn uses_injected_adapter() {
        let out = transformer(&[Mode::React])
            .with_react_adapter(StubAdapter)
            .transform("# T\n", "dir/doc.md")
            .unwrap()
            .unwrap();

        assert_eq!(
            out,
            "const stub = 1\nexport const attributes = {};\nexport const ReactComponent = (\"dir/doc.md\", 11);\n"
        );
    }
}
