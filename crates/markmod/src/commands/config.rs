//! Configuration file (markmod.toml).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use markmod_md::{RendererConfig, RendererOptions};
use markmod_transform::{BuildConfig, Mode, TransformOptions};
use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub transform: TransformSection,

    /// Options for the built-in renderer; its defaults apply when absent
    pub markdown: Option<RendererOptions>,

    #[serde(default)]
    pub build: BuildSection,
}

#[derive(Debug, Deserialize, Default)]
pub struct TransformSection {
    #[serde(default)]
    pub mode: Vec<Mode>,
}

#[derive(Debug, Deserialize)]
pub struct BuildSection {
    #[serde(default = "default_docs_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            dir: default_docs_dir(),
            output: default_output(),
        }
    }
}

fn default_docs_dir() -> PathBuf {
    PathBuf::from("docs")
}
fn default_output() -> PathBuf {
    PathBuf::from("dist")
}

impl ConfigFile {
    /// Load configuration from `path` if it exists.
    /// Returns an error if the config file exists but is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Transform options, with `mode` from the command line taking
    /// precedence over the file when given.
    pub fn transform_options(&self, mode: Vec<Mode>) -> TransformOptions {
        let mode = if mode.is_empty() {
            self.transform.mode.clone()
        } else {
            mode
        };

        let mut options = TransformOptions::new().with_mode(mode);
        if let Some(markdown) = self.markdown {
            options = options.with_renderer(RendererConfig::Options(markdown));
        }
        options
    }

    pub fn build_config(&self, output: Option<PathBuf>) -> BuildConfig {
        BuildConfig {
            docs_dir: self.build.dir.clone(),
            output_dir: output.unwrap_or_else(|| self.build.output.clone()),
        }
    }
}
