//! Configuration file commands

use anyhow::{Context as _, Result, bail};
use std::path::Path;

use crate::config::Settings;

/// Handle `config init`: write the example configuration
pub fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Config file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(path, Settings::example_config()?)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    println!("Wrote {}", path.display());
    Ok(())
}

/// Handle `config show`: print the effective settings
pub fn show(settings: &Settings) -> Result<()> {
    let contents = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
    println!("{}", contents);
    Ok(())
}
