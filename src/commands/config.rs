//! Config generation command implementation.
//!
//! Writes a fully populated sample configuration to a file or stdout.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::cli::ConfigFormat;
use crate::config::{render_config, Config};

/// Generates a sample configuration file in the requested format.
pub fn command_config(output: Option<PathBuf>, format: ConfigFormat) -> Result<()> {
    let rendered = render_config(&Config::sample(), format)?;

    match output {
        Some(path) => {
            fs::write(&path, &rendered)
                .with_context(|| format!("Failed to write config to {}", path.display()))?;
            info!("Configuration written to {}", path.display());
            println!("Configuration written to {}", path.display());
        }
        None => print!("{rendered}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;

    #[test]
    fn test_generated_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        for (name, format) in [
            ("dashboard.yaml", ConfigFormat::Yaml),
            ("dashboard.json", ConfigFormat::Json),
            ("dashboard.toml", ConfigFormat::Toml),
        ] {
            let path = dir.path().join(name);
            command_config(Some(path.clone()), format).unwrap();
            let loaded = load_config(Some(&path)).unwrap();
            assert_eq!(loaded, Config::sample());
        }
    }
}
