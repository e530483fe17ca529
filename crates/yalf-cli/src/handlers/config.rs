use crate::config::Config;
use anyhow::{Context, Result, bail};
use std::path::Path;

/// Print the configuration in effect, preceded by where it came from
pub fn show(config_path: &Path) -> Result<()> {
    let config = Config::load_from(config_path).with_context(|| {
        format!(
            "Failed to load configuration from {}",
            config_path.display()
        )
    })?;

    if config_path.exists() {
        println!("# {}", config_path.display());
    } else {
        println!("# {} (not found, showing defaults)", config_path.display());
    }
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

pub fn init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite",
            config_path.display()
        );
    }

    Config::default().save_to(config_path)?;
    println!("Wrote default configuration to {}", config_path.display());
    Ok(())
}
