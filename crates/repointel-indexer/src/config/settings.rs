//! `.repointel.toml` loading with `.env` and environment overrides

use std::path::Path;

use repointel_core::{BlockMode, ConfigError, EngineConfig};
use tracing::{debug, info};

/// Settings file looked up at the corpus root.
pub const CONFIG_FILE: &str = ".repointel.toml";

pub const ENV_SIMILARITY_THRESHOLD: &str = "REPOINTEL_SIMILARITY_THRESHOLD";
pub const ENV_MANIFEST: &str = "REPOINTEL_MANIFEST";
pub const ENV_BLOCK_MODE: &str = "REPOINTEL_BLOCK_MODE";

/// Resolve the engine configuration for `root`.
///
/// Defaults, then `.repointel.toml` when present, then `.env`, then the
/// process environment. The result is validated before it is returned.
pub fn load_config(root: &Path) -> Result<EngineConfig, ConfigError> {
    let path = root.join(CONFIG_FILE);
    let mut config = if path.is_file() {
        let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::Parse {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        info!("loaded settings from {}", path.display());
        parse_config(&text, &path)?
    } else {
        debug!("no {} at {}, using defaults", CONFIG_FILE, root.display());
        EngineConfig::default()
    };

    // Variables already set in the process win over .env.
    if dotenvy::from_path(root.join(".env")).is_ok() {
        debug!("applied .env from {}", root.display());
    }

    apply_overrides(&mut config, |key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

pub fn parse_config(text: &str, path: &Path) -> Result<EngineConfig, ConfigError> {
    toml::from_str(text).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Apply the `REPOINTEL_*` overrides found through `lookup`.
pub fn apply_overrides<F>(config: &mut EngineConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(ENV_SIMILARITY_THRESHOLD) {
        config.redundancy.similarity_threshold =
            value.trim().parse().map_err(|_| ConfigError::InvalidOverride {
                key: ENV_SIMILARITY_THRESHOLD,
                value: value.clone(),
            })?;
    }

    if let Some(value) = lookup(ENV_MANIFEST) {
        config.manifest.path = value;
    }

    if let Some(value) = lookup(ENV_BLOCK_MODE) {
        config.redundancy.block_mode = match value.trim().to_ascii_lowercase().as_str() {
            "fenced" => BlockMode::Fenced,
            "whole_file" | "whole-file" | "file" => BlockMode::WholeFile,
            _ => {
                return Err(ConfigError::InvalidOverride {
                    key: ENV_BLOCK_MODE,
                    value,
                });
            }
        };
    }

    Ok(())
}
