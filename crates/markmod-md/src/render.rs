//! Markdown to HTML rendering.

use std::fmt;
use std::sync::Arc;

use pulldown_cmark::{html, Event, Options, Parser};
use serde::Deserialize;

/// Renders markdown body text to an HTML string.
pub trait MarkdownRenderer: Send + Sync {
    /// Render the given markdown text.
    fn render(&self, markdown: &str) -> Result<String, RenderError>;
}

impl<F> MarkdownRenderer for F
where
    F: Fn(&str) -> Result<String, RenderError> + Send + Sync,
{
    fn render(&self, markdown: &str) -> Result<String, RenderError> {
        self(markdown)
    }
}

/// Errors raised by a markdown renderer.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Markdown rendering failed: {0}")]
    Failed(String),
}

/// Options for the built-in pulldown-cmark renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RendererOptions {
    /// Pass raw HTML through (otherwise it is escaped as text)
    pub html: bool,

    /// GitHub-style tables
    pub tables: bool,

    /// Footnote references and definitions
    pub footnotes: bool,

    /// `~~strikethrough~~`
    pub strikethrough: bool,

    /// `- [x]` task list items
    pub tasklists: bool,

    /// Curly quotes, dashes and ellipses
    pub smart_punctuation: bool,

    /// `# Heading {#id .class}` attribute syntax
    pub heading_attributes: bool,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            html: true,
            tables: true,
            footnotes: true,
            strikethrough: true,
            tasklists: true,
            smart_punctuation: false,
            heading_attributes: false,
        }
    }
}

impl RendererOptions {
    fn to_cmark(self) -> Options {
        let mut options = Options::empty();
        options.set(Options::ENABLE_TABLES, self.tables);
        options.set(Options::ENABLE_FOOTNOTES, self.footnotes);
        options.set(Options::ENABLE_STRIKETHROUGH, self.strikethrough);
        options.set(Options::ENABLE_TASKLISTS, self.tasklists);
        options.set(Options::ENABLE_SMART_PUNCTUATION, self.smart_punctuation);
        options.set(Options::ENABLE_HEADING_ATTRIBUTES, self.heading_attributes);
        options
    }
}

/// The built-in CommonMark renderer.
///
/// Void elements are always written self-closed (`<br />`, `<hr />`,
/// `<img ... />`), so the output is usable as JSX-compatible markup.
#[derive(Debug, Clone, Default)]
pub struct CmarkRenderer {
    options: RendererOptions,
}

impl CmarkRenderer {
    /// Create a renderer with the given options.
    pub fn new(options: RendererOptions) -> Self {
        Self { options }
    }

    /// Options this renderer was built with.
    pub fn options(&self) -> RendererOptions {
        self.options
    }
}

impl MarkdownRenderer for CmarkRenderer {
    fn render(&self, markdown: &str) -> Result<String, RenderError> {
        let parser = Parser::new_ext(markdown, self.options.to_cmark());
        let mut output = String::with_capacity(markdown.len() * 3 / 2);

        if self.options.html {
            html::push_html(&mut output, parser);
        } else {
            html::push_html(&mut output, parser.map(escape_raw_html));
        }

        Ok(output)
    }
}

/// Turn raw HTML events into text so the writer escapes them.
fn escape_raw_html(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    }
}

/// A renderer supplied ready-made or as options for the built-in one.
#[derive(Clone)]
pub enum RendererConfig {
    /// A configured renderer used as is
    Instance(Arc<dyn MarkdownRenderer>),

    /// Options for a fresh [`CmarkRenderer`]
    Options(RendererOptions),
}

impl fmt::Debug for RendererConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instance(_) => f.write_str("RendererConfig::Instance(..)"),
            Self::Options(options) => f
                .debug_tuple("RendererConfig::Options")
                .field(options)
                .finish(),
        }
    }
}

/// A user supplied render function.
pub type MarkdownFn = Arc<dyn Fn(&str) -> Result<String, RenderError> + Send + Sync>;

/// Pick the renderer for a transform.
///
/// A configured renderer wins over a render function; with neither, the
/// built-in renderer runs with raw HTML passthrough enabled.
pub fn resolve_renderer(
    renderer: Option<&RendererConfig>,
    function: Option<&MarkdownFn>,
) -> Arc<dyn MarkdownRenderer> {
    match (renderer, function) {
        (Some(RendererConfig::Instance(instance)), _) => Arc::clone(instance),
        (Some(RendererConfig::Options(options)), _) => Arc::new(CmarkRenderer::new(*options)),
        (None, Some(function)) => {
            let function = Arc::clone(function);
            Arc::new(move |markdown: &str| function(markdown))
        }
        (None, None) => Arc::new(CmarkRenderer::default()),
    }
}

/// Shorthand for wrapping a closure as a [`MarkdownFn`].
pub fn markdown_fn<F>(f: F) -> MarkdownFn
where
    F: Fn(&str) -> Result<String, RenderError> + Send + Sync + 'static,
{
    Arc::new(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_commonmark() {
        let html = CmarkRenderer::default()
            .render("# Title\n\nSome *text*.")
            .unwrap();

        assert_eq!(html, "<h1>Title</h1>\n<p>Some <em>text</em>.</p>\n");
    }

    #[test]
    fn self_closes_void_elements() {
        let html = CmarkRenderer::default().render("a  \nb\n\n---\n").unwrap();

        assert!(html.contains("<br />"));
        assert!(html.contains("<hr />"));
    }

    #[test]
    fn passes_raw_html_by_default() {
        let html = CmarkRenderer::default()
            .render("<div class=\"note\">hi</div>\n")
            .unwrap();

        assert_eq!(html, "<div class=\"note\">hi</div>\n");
    }

    #[test]
    fn escapes_raw_html_when_disabled() {
        let renderer = CmarkRenderer::new(RendererOptions {
            html: false,
            ..Default::default()
        });

        let html = renderer.render("text <b>bold</b>").unwrap();

        assert_eq!(html, "<p>text &lt;b&gt;bold&lt;/b&gt;</p>\n");
    }

    #[test]
    fn renders_fenced_code_with_language_class() {
        let html = CmarkRenderer::default()
            .render("```js\nx < 1\n```\n")
            .unwrap();

        assert_eq!(
            html,
            "<pre><code class=\"language-js\">x &lt; 1\n</code></pre>\n"
        );
    }

    #[test]
    fn renderer_config_takes_precedence() {
        let instance: Arc<dyn MarkdownRenderer> =
            Arc::new(|_: &str| Ok::<_, RenderError>("<p>instance</p>".to_string()));
        let function = markdown_fn(|_| Ok("<p>function</p>".to_string()));

        let chosen = resolve_renderer(Some(&RendererConfig::Instance(instance)), Some(&function));
        assert_eq!(chosen.render("x").unwrap(), "<p>instance</p>");

        let chosen = resolve_renderer(None, Some(&function));
        assert_eq!(chosen.render("x").unwrap(), "<p>function</p>");

        let chosen = resolve_renderer(None, None);
        assert_eq!(chosen.render("x").unwrap(), "<p>x</p>\n");
    }

    #[test]
    fn renderer_options_from_config() {
        let options = RendererOptions {
            tables: false,
            ..Default::default()
        };
        let chosen = resolve_renderer(Some(&RendererConfig::Options(options)), None);

        let html = chosen.render("| a |\n|---|\n| b |\n").unwrap();

        assert!(!html.contains("<table>"));
    }
}
