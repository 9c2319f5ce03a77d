//! Initialize markmod in a project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing markmod...");

    if config_path.exists() && !yes {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
        return Ok(());
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    tracing::info!("Created {}", config_path.display());

    let docs_dir = config_path
        .parent()
        .unwrap_or(Path::new(""))
        .join("docs");
    if !docs_dir.exists() {
        fs::create_dir_all(&docs_dir).context("Failed to create docs directory")?;
        fs::write(docs_dir.join("index.md"), DEFAULT_INDEX).context("Failed to write index.md")?;
        tracing::info!("Created docs/index.md");
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'markmod build' to generate modules.");

    Ok(())
}

pub(crate) const DEFAULT_CONFIG: &str = r#"# markmod configuration

[transform]
# Exports added next to `attributes`: toc, html, react, vue
mode = ["toc", "html"]

[markdown]
# Pass raw HTML in markdown through to the output
html = true
tables = true
footnotes = true
strikethrough = true
tasklists = true
smart_punctuation = false
heading_attributes = false

[build]
# Source directory for markdown files
dir = "docs"

# Output directory for generated modules
output = "dist"
"#;

const DEFAULT_INDEX: &str = r#"---
title: Welcome
---

# Welcome

Every markdown file under `docs/` becomes a module in `dist/`.

## Exports

- `attributes` holds the frontmatter above.
- `html` holds this page rendered to HTML.
- `toc` lists the headings of this page.
"#;
