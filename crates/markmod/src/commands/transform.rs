//! Single file transform command.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use markmod_transform::{Mode, Transformer};

use super::config::ConfigFile;

/// Run the transform command, printing the module to stdout.
pub fn run(config_path: &Path, file: &Path, mode: Vec<Mode>) -> Result<()> {
    let options = ConfigFile::load(config_path)?.transform_options(mode);

    let source = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let label = file.to_string_lossy();

    let Some(module) = Transformer::new(options)
        .transform(&source, &label)
        .with_context(|| format!("Failed to transform {}", file.display()))?
    else {
        bail!("{} is not a markdown file", file.display());
    };

    io::stdout()
        .write_all(module.as_bytes())
        .context("Failed to write module")?;

    Ok(())
}
