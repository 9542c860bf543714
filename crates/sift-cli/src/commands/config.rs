//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use sift_extractor::ExtractorConfig;
use std::path::{Path, PathBuf};

/// Execute the config command.
pub fn execute_config(
    args: ConfigArgs,
    config: &Config,
    path: Option<&Path>,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
        ConfigAction::Init {
            force,
            conservative,
            fast,
        } => {
            let path = match path {
                Some(p) => p.to_path_buf(),
                None => Config::path()?,
            };
            let written = init_config(&path, force, preset(conservative, fast))?;
            println!(
                "{}",
                formatter.success(&format!("Wrote configuration to {}", written.display()))
            );
            Ok(())
        }
    }
}

fn preset(conservative: bool, fast: bool) -> ExtractorConfig {
    if conservative {
        ExtractorConfig::conservative()
    } else if fast {
        ExtractorConfig::fast()
    } else {
        ExtractorConfig::default()
    }
}

/// Write a default configuration with the given extractor preset.
fn init_config(path: &Path, force: bool, extractor: ExtractorConfig) -> Result<PathBuf> {
    if path.exists() && !force {
        return Err(CliError::Config(format!(
            "{} already exists; pass --force to overwrite",
            path.display()
        )));
    }

    let config = Config {
        extractor,
        ..Config::default()
    };
    config.save(path)?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_preset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        init_config(&path, false, preset(true, false)).unwrap();
        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.extractor, ExtractorConfig::conservative());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        init_config(&path, false, preset(false, false)).unwrap();
        assert!(matches!(
            init_config(&path, false, preset(false, true)),
            Err(CliError::Config(_))
        ));

        init_config(&path, true, preset(false, true)).unwrap();
        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.extractor, ExtractorConfig::fast());
    }
}
