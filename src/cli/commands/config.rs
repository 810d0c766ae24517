//! Config Command
//!
//! Usage:
//!   deckforge config show [-g] [-f json]
//!   deckforge config path
//!   deckforge config init [-g] [--force]

use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::types::Result;

/// Show the merged configuration, or the raw global file with `global`
pub fn show(global: bool, format: &str) -> Result<()> {
    if !global {
        return ConfigLoader::show_config(format == "json");
    }

    match ConfigLoader::global_config_path() {
        Some(path) if path.exists() => {
            println!("# Global Config: {}\n", path.display());
            println!("{}", std::fs::read_to_string(&path)?);
        }
        Some(_) => {
            println!("No global config found.");
            println!("Run 'deckforge config init --global' to create one.");
        }
        None => println!("Cannot determine global config directory."),
    }
    Ok(())
}

pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

pub fn init(global: bool, force: bool) -> Result<()> {
    let output = Output::default();
    let (path, written) = ConfigLoader::init(global, force)?;
    let scope = if global { "global" } else { "project" };
    if written {
        output.success(&format!("Initialized {} configuration", scope));
    } else {
        output.warning("Config already exists (use --force to overwrite)");
    }
    output.field("Config", path.display());
    Ok(())
}
