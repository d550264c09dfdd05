//! Shallow fetch of a single ref into the snapshot cache

use crate::domain::RepoRef;
use crate::fetch::SnapshotResult;
use anyhow::{Context, Result};
use git2::build::CheckoutBuilder;
use git2::{FetchOptions, Oid, Repository};
use std::path::Path;

const REMOTE_NAME: &str = "origin";

/// Build the remote URL for `repo` under `remote_base`.
///
/// A bare host such as `github.com` becomes `https://github.com`; anything that
/// already carries a scheme (`https://`, `file://`) is used as given.
pub fn remote_url(remote_base: &str, repo: &RepoRef) -> String {
    let base = remote_base.trim_end_matches('/');
    let base =
        if base.contains("://") { base.to_string() } else { format!("https://{base}") };
    format!("{}/{}/{}.git", base, repo.owner, repo.repo)
}

/// Materialize `repo` in `workdir` and return the resolved commit.
///
/// Every step is safe to repeat: the repository is opened or initialized, the
/// remote is re-pointed, and the fetched head is checked out detached so no
/// local branch is ever touched.
pub fn fetch_into(workdir: &Path, url: &str, repo: &RepoRef) -> Result<SnapshotResult> {
    std::fs::create_dir_all(workdir)
        .with_context(|| format!("Failed creating cache directory: {}", workdir.display()))?;

    let git = open_or_init(workdir)?;

    // The remote may not exist yet on a fresh directory.
    let _ = git.remote_delete(REMOTE_NAME);
    let reference = repo.ref_.as_str();
    let shallow = {
        let mut remote = git
            .remote(REMOTE_NAME, url)
            .with_context(|| format!("Failed adding remote {REMOTE_NAME} -> {url}"))?;
        tracing::debug!(%url, reference, "fetching shallow ref");
        shallow_fetch(&mut remote, reference)
    };
    if let Err(err) = shallow {
        // A remote handle keeps its shallow negotiation; retry on a fresh one.
        tracing::debug!("shallow fetch of {reference} failed ({err:#}); retrying full fetch");
        git.find_remote(REMOTE_NAME)
            .and_then(|mut remote| remote.fetch(&[reference], None, None))
            .with_context(|| format!("Failed fetching {reference} from {url}"))?;
    }

    let fetched = fetch_head(&git)?;
    checkout_detached(&git, fetched, reference)?;

    let head = git
        .head()
        .and_then(|h| h.peel_to_commit())
        .context("Failed resolving HEAD after checkout")?;
    let commit_sha = head.id().to_string();
    tracing::info!(%repo, commit = %commit_sha, "snapshot ready");

    Ok(SnapshotResult::new(workdir.to_path_buf(), commit_sha))
}

fn open_or_init(workdir: &Path) -> Result<Repository> {
    match Repository::open(workdir) {
        Ok(repo) => Ok(repo),
        Err(_) => Repository::init(workdir)
            .with_context(|| format!("Failed initializing repository in {}", workdir.display())),
    }
}

fn shallow_fetch(remote: &mut git2::Remote<'_>, reference: &str) -> Result<()> {
    let mut fo = FetchOptions::new();
    fo.depth(1);
    remote
        .fetch(&[reference], Some(&mut fo), None)
        .with_context(|| format!("Shallow fetch of {reference} failed"))
}

/// First merge candidate recorded in FETCH_HEAD.
fn fetch_head(git: &Repository) -> Result<Oid> {
    let mut merge: Option<Oid> = None;
    let mut first: Option<Oid> = None;
    git.fetchhead_foreach(|_name, _url, oid, is_merge| {
        if first.is_none() {
            first = Some(*oid);
        }
        if is_merge {
            merge = Some(*oid);
            return false;
        }
        true
    })
    .context("FETCH_HEAD is missing after fetch")?;

    merge.or(first).ok_or_else(|| anyhow::anyhow!("FETCH_HEAD recorded no commits"))
}

fn checkout_detached(git: &Repository, oid: Oid, reference: &str) -> Result<()> {
    // Annotated tags land in FETCH_HEAD as tag objects.
    let commit = git
        .find_object(oid, None)
        .and_then(|object| object.peel_to_commit())
        .with_context(|| format!("Fetched object for {reference} is not a commit"))?;

    let mut checkout = CheckoutBuilder::new();
    checkout.force();
    git.checkout_tree(commit.as_object(), Some(&mut checkout))
        .with_context(|| format!("Failed to checkout tree for ref: {reference}"))?;
    git.set_head_detached(commit.id())
        .with_context(|| format!("Failed to set detached HEAD for ref: {reference}"))?;
    Ok(())
}
