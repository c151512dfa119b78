use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CliConfig {
    /// Category the text DSL resolves feature types in first.
    pub default_category: String,
    pub max_total_minutes: u32,
    /// Where the last schedule is kept; the platform config dir when unset.
    pub store_dir: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            default_category: "Guitar".to_string(),
            max_total_minutes: 180,
            store_dir: None,
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    let base = dirs::config_dir()?;
    Some(base.join("woodshed").join("config.json"))
}

/// Reads the config at `explicit`, or at the default location. Only the
/// default location may be missing.
pub fn load_config(explicit: Option<&Path>) -> Result<CliConfig> {
    if let Some(path) = explicit {
        return read_config(path);
    }
    let Some(path) = config_path() else {
        return Ok(CliConfig::default());
    };
    match read_config(&path) {
        Ok(config) => Ok(config),
        Err(err) if is_not_found(&err) => {
            debug!(path = %path.display(), "no config file, using defaults");
            Ok(CliConfig::default())
        }
        Err(err) => Err(err),
    }
}

fn read_config(path: &Path) -> Result<CliConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
}

fn is_not_found(err: &anyhow::Error) -> bool {
    err.downcast_ref::<std::io::Error>()
        .is_some_and(|io| io.kind() == ErrorKind::NotFound)
}
