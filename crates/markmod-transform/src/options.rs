//! Transform options.

use std::fmt;
use std::str::FromStr;

use markmod_md::{MarkdownFn, RendererConfig};
use serde::{Deserialize, Serialize};

/// An export a transform can add next to `attributes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// `toc`: outline of top-level headings
    Toc,
    /// `html`: the rendered markup
    Html,
    /// `ReactComponent`: a React function component
    React,
    /// `VueComponent`: a Vue component with a compiled render function
    Vue,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Toc, Mode::Html, Mode::React, Mode::Vue];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Toc => "toc",
            Mode::Html => "html",
            Mode::React => "react",
            Mode::Vue => "vue",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown mode `{0}` (expected one of: toc, html, react, vue)")]
pub struct ModeError(String);

impl FromStr for Mode {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ModeError(s.to_string()))
    }
}

/// Options for a [`Transformer`](crate::Transformer).
#[derive(Clone, Default)]
pub struct TransformOptions {
    /// Extra exports; empty means only `attributes`
    pub mode: Vec<Mode>,

    /// Custom render function
    pub markdown: Option<MarkdownFn>,

    /// Renderer instance or options for the built-in renderer
    pub markdown_renderer: Option<RendererConfig>,
}

impl TransformOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the modes.
    pub fn with_mode(mut self, mode: impl IntoIterator<Item = Mode>) -> Self {
        self.mode = mode.into_iter().collect();
        self
    }

    /// Set a custom render function.
    pub fn with_markdown(mut self, markdown: MarkdownFn) -> Self {
        self.markdown = Some(markdown);
        self
    }

    /// Set the markdown renderer.
    pub fn with_renderer(mut self, renderer: RendererConfig) -> Self {
        self.markdown_renderer = Some(renderer);
        self
    }

    pub fn has(&self, mode: Mode) -> bool {
        self.mode.contains(&mode)
    }
}

impl fmt::Debug for TransformOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformOptions")
            .field("mode", &self.mode)
            .field("markdown", &self.markdown.as_ref().map(|_| ".."))
            .field("markdown_renderer", &self.markdown_renderer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_modes() {
        assert_eq!("toc".parse::<Mode>().unwrap(), Mode::Toc);
        assert_eq!("React".parse::<Mode>().unwrap(), Mode::React);
        assert!("markdown".parse::<Mode>().is_err());
    }

    #[test]
    fn deserializes_lowercase_modes() {
        let modes: Vec<Mode> = serde_json::from_str(r#"["html", "vue"]"#).unwrap();

        assert_eq!(modes, vec![Mode::Html, Mode::Vue]);
    }

    #[test]
    fn defaults_to_no_modes() {
        let options = TransformOptions::new();

        assert!(Mode::ALL.iter().all(|m| !options.has(*m)));
    }
}
