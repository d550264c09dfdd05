//! Environment and command-line overrides on top of file settings.

use crate::domain::{Config, DiagramLanguage};
use crate::fetch::cache::CACHE_DIR_ENV;
use std::path::PathBuf;

pub const MODEL_ENV: &str = "REPO_DIAGRAM_MODEL";

/// Values given on the command line; `None` leaves the lower layer in place.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub cache_dir: Option<PathBuf>,
    pub host: Option<String>,
    pub model: Option<String>,
    pub language: Option<DiagramLanguage>,
    pub max_attempts: Option<usize>,
    pub max_file_bytes: Option<u64>,
    pub treat_binary_as_ignored: Option<bool>,
    pub respect_gitignore: Option<bool>,
    pub extra_ignore_globs: Option<Vec<String>>,
    pub dot_command: Option<String>,
}

/// Apply `REPO_DIAGRAM_CACHE_DIR` and `REPO_DIAGRAM_MODEL` over file settings.
pub fn apply_env_overrides(config: Config) -> Config {
    apply_env_with(config, |key| std::env::var(key).ok())
}

fn apply_env_with(mut config: Config, lookup: impl Fn(&str) -> Option<String>) -> Config {
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(dir) = non_empty(CACHE_DIR_ENV) {
        config.cache_dir = Some(PathBuf::from(dir));
    }
    if let Some(model) = non_empty(MODEL_ENV) {
        config.model = model.trim().to_string();
    }
    config
}

/// Layer command-line values over an already resolved config.
pub fn merge_cli_with_config(mut config: Config, cli: CliOverrides) -> Config {
    if let Some(v) = cli.cache_dir {
        config.cache_dir = Some(v);
    }
    if let Some(v) = cli.host {
        config.host = v;
    }
    if let Some(v) = cli.model {
        config.model = v;
    }
    if let Some(v) = cli.language {
        config.language = v;
    }
    if let Some(v) = cli.max_attempts {
        config.max_attempts = v;
    }
    if let Some(v) = cli.max_file_bytes {
        config.max_file_bytes = v;
    }
    if let Some(v) = cli.treat_binary_as_ignored {
        config.treat_binary_as_ignored = v;
    }
    if let Some(v) = cli.respect_gitignore {
        config.respect_gitignore = v;
    }
    if let Some(v) = cli.extra_ignore_globs {
        config.extra_ignore_globs.extend(v);
    }
    if let Some(v) = cli.dot_command {
        config.dot_command = v;
    }
    config
}
