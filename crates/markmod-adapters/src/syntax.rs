//! Syntax checking of generated JavaScript with oxc.

use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;

/// Generated code that does not parse.
#[derive(Debug, thiserror::Error)]
#[error("Generated code for {context} does not parse: {}", .messages.join("; "))]
pub struct SyntaxError {
    /// What was being generated (e.g. "ReactComponent")
    pub context: String,
    /// Parser diagnostics
    pub messages: Vec<String>,
}

/// Parse `source` as an ES module and report every diagnostic.
pub fn check_module(source: &str, context: &str) -> Result<(), SyntaxError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();

    if ret.panicked || !ret.errors.is_empty() {
        let mut messages: Vec<String> = ret.errors.iter().map(|e| e.to_string()).collect();
        if messages.is_empty() {
            messages.push("parser aborted".to_string());
        }
        tracing::debug!(context, errors = messages.len(), "generated code rejected");
        return Err(SyntaxError {
            context: context.to_string(),
            messages,
        });
    }

    Ok(())
}
