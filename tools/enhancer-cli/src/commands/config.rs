//! Show or save the effective configuration.

use std::path::PathBuf;

use enhancer_common::config::{config_file_path, AppConfig};

pub fn run(config: &AppConfig, path: Option<PathBuf>, write: bool) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(config_file_path);

    if write {
        config
            .save_to(&path)
            .map_err(|e| anyhow::anyhow!("Failed to save config: {e}"))?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    let source = if path.exists() { "file" } else { "defaults" };
    println!("# {} ({source})", path.display());
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
