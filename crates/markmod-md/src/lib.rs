//! Markdown front half of the transform: frontmatter and HTML rendering.
//!
//! This crate splits a markdown source into its YAML frontmatter and body,
//! and renders the body to HTML with a pluggable renderer.

pub mod frontmatter;
pub mod render;

pub use frontmatter::{extract_frontmatter, Document, FrontmatterError};
pub use render::{
    markdown_fn, resolve_renderer, CmarkRenderer, MarkdownFn, MarkdownRenderer, RenderError,
    RendererConfig, RendererOptions,
};
