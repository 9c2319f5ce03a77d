//! Directory build command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use markmod_transform::{Builder, Mode, Transformer};

use super::config::ConfigFile;

/// Run the build command.
pub fn run(config_path: &Path, output: Option<PathBuf>, mode: Vec<Mode>) -> Result<()> {
    let file_config = ConfigFile::load(config_path)?;
    let options = file_config.transform_options(mode);
    let config = file_config.build_config(output);

    tracing::info!(
        "Building {} with modes [{}]...",
        config.docs_dir.display(),
        options
            .mode
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let result = Builder::new(config, Transformer::new(options)).build()?;

    tracing::info!(
        "Built {} modules in {}ms ({} other files skipped)",
        result.modules,
        result.duration_ms,
        result.skipped
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
