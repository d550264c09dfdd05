//! Repository snapshots: cache resolution, shallow fetch, local directories

use crate::domain::{Config, RepoRef, DEFAULT_HOST};
use anyhow::Result;
use std::path::PathBuf;

pub mod cache;
pub mod context;
pub mod github;
pub mod local;

pub use context::SnapshotResult;

/// Resolves cache directories and materializes snapshots inside them.
///
/// Two calls for the same [`RepoRef`] share one working directory. Concurrent
/// calls for the same key are not serialized here.
#[derive(Debug, Clone)]
pub struct SnapshotFetcher {
    cache_root: PathBuf,
    remote_base: String,
}

impl SnapshotFetcher {
    pub fn new(cache_root: PathBuf, remote_base: impl Into<String>) -> Self {
        Self { cache_root, remote_base: remote_base.into() }
    }

    pub fn from_config(config: &Config) -> Self {
        let cache_root = config.cache_dir.clone().unwrap_or_else(cache::default_cache_root);
        Self::new(cache_root, config.host.clone())
    }

    pub fn cache_root(&self) -> &std::path::Path {
        &self.cache_root
    }

    pub fn workdir(&self, repo: &RepoRef) -> PathBuf {
        cache::workdir_for(&self.cache_root, repo)
    }

    /// Fetch `repo` into its cache directory and return the resolved commit.
    pub fn ensure_snapshot(&self, repo: &RepoRef) -> Result<SnapshotResult> {
        let workdir = self.workdir(repo);
        let url = github::remote_url(&self.remote_base, repo);
        github::fetch_into(&workdir, &url, repo)
    }
}

impl Default for SnapshotFetcher {
    fn default() -> Self {
        Self::new(cache::default_cache_root(), DEFAULT_HOST)
    }
}

/// Fetch `repo` with the default cache root and host.
pub fn ensure_snapshot(repo: &RepoRef) -> Result<SnapshotResult> {
    SnapshotFetcher::default().ensure_snapshot(repo)
}
