//! Framework adapters for markdown modules.
//!
//! This crate turns the HTML rendered from a markdown document into
//! framework components: a `React.createElement` function for React and a
//! compiled render function for Vue. It also extracts the heading outline.

pub mod dom;
pub mod expr;
pub mod jsx;
pub mod outline;
pub mod react;
pub mod syntax;
pub mod template;
pub mod traits;
pub mod vue;

pub use dom::{Attribute, Element, Fragment, Node};
pub use expr::ExprError;
pub use outline::{extract_outline, OutlineEntry};
pub use react::ReactAdapter;
pub use syntax::SyntaxError;
pub use template::{CompileError, CompiledTemplate, NativeTemplateCompiler, TemplateCompiler};
pub use traits::{AdapterError, AdapterOutput, FrameworkAdapter};
pub use vue::VueAdapter;
