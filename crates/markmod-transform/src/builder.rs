//! Directory builder.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::transformer::{TransformError, Transformer};

/// Configuration for building a directory of markdown modules.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Source docs directory
    pub docs_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("docs"),
            output_dir: PathBuf::from("dist"),
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of modules written
    pub modules: usize,

    /// Number of files that were not markdown
    pub skipped: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read docs directory: {0}")]
    ReadError(String),

    #[error("Failed to transform {path}: {source}")]
    TransformError {
        path: String,
        source: TransformError,
    },

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

/// A markdown file to be built.
#[derive(Debug)]
struct SourceFile {
    /// Source file path
    source_path: PathBuf,

    /// Output path
    output_path: PathBuf,
}

/// Builds every markdown file under a directory into a module.
pub struct Builder {
    config: BuildConfig,
    transformer: Transformer,
}

impl Builder {
    /// Create a new builder.
    pub fn new(config: BuildConfig, transformer: Transformer) -> Self {
        Self {
            config,
            transformer,
        }
    }

    /// Build all modules.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let (files, skipped) = self.discover()?;

        let results: Vec<Result<(), BuildError>> =
            files.par_iter().map(|file| self.build_file(file)).collect();

        let mut modules = 0;
        for result in results {
            result?;
            modules += 1;
        }

        let duration = start.elapsed();
        tracing::debug!(modules, skipped, "build finished");

        Ok(BuildResult {
            modules,
            skipped,
            duration_ms: duration.as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Find markdown files, counting the other files skipped.
    fn discover(&self) -> Result<(Vec<SourceFile>, usize), BuildError> {
        if !self.config.docs_dir.exists() {
            return Err(BuildError::ReadError(format!(
                "Docs directory not found: {}",
                self.config.docs_dir.display()
            )));
        }

        let mut files = Vec::new();
        let mut skipped = 0;

        for entry in WalkDir::new(&self.config.docs_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            // The output may live inside the docs directory.
            if path.starts_with(&self.config.output_dir) {
                continue;
            }

            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                skipped += 1;
                continue;
            }

            let relative_path = path.strip_prefix(&self.config.docs_dir).unwrap_or(path);

            files.push(SourceFile {
                source_path: path.to_path_buf(),
                output_path: self.output_path(relative_path),
            });
        }

        Ok((files, skipped))
    }

    /// `guide/intro.md` → `<output>/guide/intro.md.js`
    fn output_path(&self, relative: &Path) -> PathBuf {
        let mut name = relative.as_os_str().to_os_string();
        name.push(".js");
        self.config.output_dir.join(name)
    }

    fn build_file(&self, file: &SourceFile) -> Result<(), BuildError> {
        let content = fs::read_to_string(&file.source_path)
            .map_err(|e| BuildError::ReadError(format!("{}: {}", file.source_path.display(), e)))?;

        let label = file.source_path.to_string_lossy();
        let module = self
            .transformer
            .transform_document(&content, &label)
            .map_err(|source| BuildError::TransformError {
                path: label.to_string(),
                source,
            })?;

        if let Some(parent) = file.output_path.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
        }

        fs::write(&file.output_path, module).map_err(|e| BuildError::WriteError(e.to_string()))?;
        tracing::debug!(output = %file.output_path.display(), "wrote module");

        Ok(())
    }
}
