//! Trait definitions for framework adapters.

use crate::expr::ExprError;
use crate::syntax::SyntaxError;
use crate::template::CompileError;

/// Code produced by a framework adapter for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterOutput {
    /// JavaScript expression bound to the adapter's export
    pub code: String,

    /// Top-level statements the expression depends on (imports, functions)
    pub auxiliary: Option<String>,
}

/// Errors that can occur while turning HTML into a component.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("Invalid expression in markup: {0}")]
    Expression(#[from] ExprError),

    #[error("Unexpected `}}` in text of <{element}>; write it as {{'}}'}}")]
    StrayBrace { element: String },

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("Template compilation failed: {0}")]
    Compile(#[from] CompileError),

    #[error("Compiled template has no `export function render`")]
    MissingRenderExport,
}

/// Trait for framework-specific adapters.
///
/// An adapter owns its whole pipeline: it parses the rendered HTML on its
/// own, rewrites the tree for its framework and compiles the result.
pub trait FrameworkAdapter: Send + Sync {
    /// Framework identifier (e.g., "react", "vue")
    fn name(&self) -> &'static str;

    /// Name of the module export holding the component
    fn export_name(&self) -> &'static str;

    /// Turn rendered markdown into a component.
    ///
    /// # Arguments
    /// * `html` - The rendered markdown
    /// * `filename` - Source document path, used in diagnostics
    fn render(&self, html: &str, filename: &str) -> Result<AdapterOutput, AdapterError>;
}
