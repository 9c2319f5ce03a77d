//! Markdown to JavaScript module transform.
//!
//! Turns a markdown document into a module exporting its frontmatter and,
//! depending on the configured modes, its HTML, heading outline, and React
//! and Vue components. [`Builder`] applies the transform to a whole
//! directory.

pub mod builder;
pub mod module;
pub mod options;
pub mod transformer;

pub use builder::{BuildConfig, BuildError, BuildResult, Builder};
pub use module::ExportedModule;
pub use options::{Mode, ModeError, TransformOptions};
pub use transformer::{TransformError, Transformer};
