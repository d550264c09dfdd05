//! Snapshot assembly: ignore-aware walking, tree rendering, concatenation

use crate::domain::RepoRef;
use crate::fetch::SnapshotFetcher;
use anyhow::Result;

pub mod concat;
pub mod tree;
pub mod walker;

pub use concat::{concatenate, ConcatOptions, CorpusChunk, CorpusChunks};
pub use tree::{render_tree, TreeNode};
pub use walker::{list_included_files, WalkOptions};

/// Fetch `repo` and render its included files as a tree.
pub fn directory_tree(
    fetcher: &SnapshotFetcher,
    repo: &RepoRef,
    options: &WalkOptions,
) -> Result<String> {
    let snapshot = fetcher.ensure_snapshot(repo)?;
    let files = list_included_files(&snapshot.workdir, options)?;
    Ok(render_tree(&files))
}

/// Fetch `repo` and return a lazy chunk stream over its corpus.
pub fn repo_chunks(
    fetcher: &SnapshotFetcher,
    repo: &RepoRef,
    options: &ConcatOptions,
) -> Result<CorpusChunks> {
    let snapshot = fetcher.ensure_snapshot(repo)?;
    let files = list_included_files(&snapshot.workdir, &options.walk)?;
    Ok(CorpusChunks::new(&snapshot.workdir, files, options))
}

/// Fetch `repo` and return its full corpus.
pub fn concatenate_repo(
    fetcher: &SnapshotFetcher,
    repo: &RepoRef,
    options: &ConcatOptions,
) -> Result<String> {
    let mut corpus = String::new();
    for chunk in repo_chunks(fetcher, repo, options)? {
        corpus.push_str(&chunk?.render());
    }
    Ok(corpus)
}
