//! Cache path resolution for fetched snapshots.

use crate::domain::RepoRef;
use std::path::{Path, PathBuf};

/// Environment override for the snapshot cache root.
pub const CACHE_DIR_ENV: &str = "REPO_DIAGRAM_CACHE_DIR";

/// Default cache root: `<temp>/repo-diagram/github-cache`, unless
/// `REPO_DIAGRAM_CACHE_DIR` is set.
pub fn default_cache_root() -> PathBuf {
    if let Some(dir) = std::env::var_os(CACHE_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    std::env::temp_dir().join("repo-diagram").join("github-cache")
}

/// Working directory for `repo` under `cache_root`.
///
/// The mapping is a pure function of (owner, repo, ref); slashes inside a ref
/// become nested directories.
pub fn workdir_for(cache_root: &Path, repo: &RepoRef) -> PathBuf {
    let mut path = cache_root.join(&repo.owner).join(&repo.repo);
    for segment in repo.ref_.split('/') {
        path.push(segment);
    }
    path
}
