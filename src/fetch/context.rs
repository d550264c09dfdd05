//! Snapshot result handed from the fetcher to the walker.

use std::path::PathBuf;

/// A materialized checkout of one [`RepoRef`](crate::domain::RepoRef).
///
/// `workdir` lives in the shared cache and stays valid until something outside
/// this crate cleans it up; nothing here deletes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotResult {
    pub workdir: PathBuf,
    pub commit_sha: String,
}

impl SnapshotResult {
    pub fn new(workdir: PathBuf, commit_sha: String) -> Self {
        Self { workdir, commit_sha }
    }

    /// Abbreviated commit id for log lines.
    pub fn short_sha(&self) -> &str {
        let end = self.commit_sha.len().min(12);
        &self.commit_sha[..end]
    }
}
