//! Configuration loading for the CLI

use anyhow::{Context, Result};
use cost_lib::EngineConfig;
use std::path::{Path, PathBuf};

/// Environment variable prefix for engine settings
const ENV_PREFIX: &str = "COSTCTL";

/// Load the engine configuration
///
/// Sources, later ones overriding earlier ones:
/// 1. built-in defaults
/// 2. the config file: `explicit` if given (must exist), else the default path if present
/// 3. `COSTCTL_<SECTION>__<KEY>` environment variables
pub fn load(explicit: Option<&Path>) -> Result<EngineConfig> {
    let mut builder = config::Config::builder();

    match explicit {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            builder = builder.add_source(config::File::from(path));
        }
        None => {
            if let Some(path) = default_path().filter(|p| p.exists()) {
                builder = builder.add_source(config::File::from(path));
            }
        }
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to read configuration")?;

    settings
        .try_deserialize()
        .context("Failed to parse configuration")
}

/// `~/.config/costctl/config.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs_next::home_dir().map(|home| home.join(".config").join("costctl").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[pricing]\ntransfer_price_per_gb = 0.08").unwrap();
        writeln!(file, "[low_value]\ncleanup_limit = 3").unwrap();

        let config = load(Some(file.path())).unwrap();
        assert_eq!(config.pricing.transfer_price_per_gb, 0.08);
        assert_eq!(config.low_value.cleanup_limit, 3);
        assert_eq!(config.pareto, EngineConfig::default().pareto);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let result = load(Some(Path::new("/nonexistent/costctl.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_default_path_under_config_dir() {
        if let Some(path) = default_path() {
            assert!(path.ends_with(".config/costctl/config.toml"));
        }
    }
}
