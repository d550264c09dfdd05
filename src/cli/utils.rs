//! Shared CLI utilities.

use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

use crate::config::{apply_env_overrides, load_config, merge_cli_with_config, CliOverrides};
use crate::domain::{Config, RepoRef};
use crate::fetch::local::local_snapshot;
use crate::fetch::{SnapshotFetcher, SnapshotResult};

/// Owner label used for `--path` snapshots.
const LOCAL_OWNER: &str = "local";

/// Where the snapshot comes from.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Repository as owner/repo or https://host/owner/repo
    #[arg(value_name = "REPO", required_unless_present = "path")]
    pub repo: Option<String>,

    /// Branch, tag, or commit to snapshot
    #[arg(short = 'r', long = "ref", value_name = "REF", default_value = "main")]
    pub ref_: String,

    /// Use a local directory instead of fetching
    #[arg(short = 'p', long, value_name = "DIR", conflicts_with = "repo")]
    pub path: Option<PathBuf>,

    /// Git host or base URL to fetch from (default: github.com)
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Snapshot cache root
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Ignore .gitignore rules
    #[arg(long)]
    pub no_gitignore: bool,

    /// Exclude paths matching these globs (comma-separated)
    #[arg(short = 'e', long, value_name = "GLOBS")]
    pub exclude_glob: Option<String>,
}

/// Corpus assembly knobs.
#[derive(Args, Debug, Clone, Default)]
pub struct CorpusArgs {
    /// Skip files larger than this (bytes)
    #[arg(long, value_name = "BYTES")]
    pub max_file_bytes: Option<u64>,

    /// Keep binary files as empty entries instead of dropping them
    #[arg(long)]
    pub include_binary: bool,
}

/// A resolved snapshot target.
#[derive(Debug, Clone)]
pub enum Target {
    Remote(RepoRef),
    Local { repo: RepoRef, snapshot: SnapshotResult },
}

impl Target {
    pub fn repo(&self) -> &RepoRef {
        match self {
            Target::Remote(repo) | Target::Local { repo, .. } => repo,
        }
    }

    /// Fetch (remote) or reuse (local) the working tree.
    pub fn materialize(&self, config: &Config) -> Result<SnapshotResult> {
        match self {
            Target::Remote(repo) => SnapshotFetcher::from_config(config).ensure_snapshot(repo),
            Target::Local { snapshot, .. } => Ok(snapshot.clone()),
        }
    }
}

/// Parse a comma-separated string into a `Vec<String>`, trimming whitespace and
/// discarding empty segments.  Returns `None` when `value` is `None`.
pub fn parse_csv(value: &Option<String>) -> Option<Vec<String>> {
    value.as_ref().map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| part.to_string())
            .collect::<Vec<_>>()
    })
}

/// Overrides shared by every snapshot-reading command.
pub fn source_overrides(source: &SourceArgs, corpus: Option<&CorpusArgs>) -> CliOverrides {
    let url_host = source.repo.as_deref().and_then(url_base);
    CliOverrides {
        cache_dir: source.cache_dir.clone(),
        host: source.host.clone().or(url_host),
        respect_gitignore: if source.no_gitignore { Some(false) } else { None },
        extra_ignore_globs: parse_csv(&source.exclude_glob),
        max_file_bytes: corpus.and_then(|c| c.max_file_bytes),
        treat_binary_as_ignored: match corpus {
            Some(c) if c.include_binary => Some(false),
            _ => None,
        },
        ..CliOverrides::default()
    }
}

/// Resolve file, environment, and command-line settings.
pub fn load_settings(config_path: Option<&Path>, overrides: CliOverrides) -> Result<Config> {
    let cwd = std::env::current_dir()?;
    let file_config = load_config(&cwd, config_path)?;
    Ok(merge_cli_with_config(apply_env_overrides(file_config), overrides))
}

pub fn resolve_target(source: &SourceArgs) -> Result<Target> {
    match (&source.repo, &source.path) {
        (Some(_), Some(_)) => anyhow::bail!("Cannot specify both REPO and --path"),
        (Some(name), None) => Ok(Target::Remote(RepoRef::parse(name, &source.ref_)?)),
        (None, Some(path)) => {
            let snapshot = local_snapshot(path)?;
            let name = snapshot
                .workdir
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("workspace")
                .to_string();
            let repo = RepoRef::new(LOCAL_OWNER, &name, snapshot.short_sha())?;
            Ok(Target::Local { repo, snapshot })
        }
        (None, None) => anyhow::bail!("Provide a repository (owner/repo or URL) or --path DIR"),
    }
}

/// `scheme://authority` of a repository URL.
fn url_base(input: &str) -> Option<String> {
    let (scheme, rest) = input.trim().split_once("://")?;
    let authority = rest.split('/').next().filter(|a| !a.is_empty())?;
    Some(format!("{scheme}://{authority}"))
}
