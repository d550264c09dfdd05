//! Config file loading

use crate::domain::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Table name honoured when the settings are nested.
const NESTED_TABLE: &str = "repo-diagram";

const CANDIDATES: &[&str] =
    &["repo-diagram.toml", ".repo-diagram.toml", "repo-diagram.yml", "repo-diagram.yaml"];

/// Load settings from `config_path`, or from the first candidate file found in
/// `search_dir`.
///
/// Errors in an explicitly named file are returned; errors in an
/// auto-discovered file are logged and defaults are used instead.
pub fn load_config(search_dir: &Path, config_path: Option<&Path>) -> Result<Config> {
    let explicit = config_path.is_some();

    let Some(config_file) =
        config_path.map(Path::to_path_buf).or_else(|| discover_config(search_dir))
    else {
        return Ok(Config::default());
    };

    match read_config(&config_file) {
        Ok(config) => {
            tracing::debug!(path = %config_file.display(), "loaded config");
            Ok(config)
        }
        Err(e) if !explicit => {
            tracing::warn!("Ignoring auto-discovered config {}: {:#}", config_file.display(), e);
            Ok(Config::default())
        }
        Err(e) => Err(e),
    }
}

fn read_config(config_file: &Path) -> Result<Config> {
    let content = fs::read_to_string(config_file)
        .with_context(|| format!("Failed reading config file: {}", config_file.display()))?;

    let ext = config_file.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "toml" => parse_toml_config(&content, config_file),
        "yaml" | "yml" => parse_yaml_config(&content, config_file),
        other => anyhow::bail!(
            "Unsupported config extension '.{}' for file {}",
            other,
            config_file.display()
        ),
    }
}

fn parse_toml_config(content: &str, config_file: &Path) -> Result<Config> {
    let raw: toml::Value = toml::from_str(content)
        .with_context(|| format!("Invalid TOML syntax: {}", config_file.display()))?;

    let config_val = match raw.get(NESTED_TABLE) {
        Some(nested) => nested.clone(),
        None => raw,
    };

    config_val.try_into().with_context(|| format!("Invalid TOML config: {}", config_file.display()))
}

fn parse_yaml_config(content: &str, config_file: &Path) -> Result<Config> {
    let raw: serde_yaml::Value = serde_yaml::from_str(content)
        .with_context(|| format!("Invalid YAML syntax: {}", config_file.display()))?;

    // An empty document parses as null; treat it as "no settings".
    let config_val = match raw.get(NESTED_TABLE) {
        Some(nested) => nested.clone(),
        None if raw.is_null() => return Ok(Config::default()),
        None => raw,
    };

    serde_yaml::from_value(config_val)
        .with_context(|| format!("Invalid YAML config: {}", config_file.display()))
}

fn discover_config(search_dir: &Path) -> Option<PathBuf> {
    CANDIDATES.iter().map(|candidate| search_dir.join(candidate)).find(|path| path.is_file())
}
