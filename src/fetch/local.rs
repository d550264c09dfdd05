//! Local directories used as snapshots without fetching

use crate::fetch::SnapshotResult;
use anyhow::Result;
use git2::Repository;
use std::path::Path;

/// Commit id reported for directories that are not git checkouts.
pub const UNVERSIONED: &str = "unversioned";

/// Treat an existing directory as a snapshot.
///
/// The commit id is the directory's HEAD when it is a git checkout, otherwise
/// [`UNVERSIONED`]. The working tree is read as-is, uncommitted edits included.
pub fn local_snapshot(path: &Path) -> Result<SnapshotResult> {
    if !path.exists() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }
    let canonical = path.canonicalize()?;
    if !canonical.is_dir() {
        anyhow::bail!("Path is not a directory: {}", path.display());
    }

    let commit_sha = head_commit(&canonical).unwrap_or_else(|| {
        tracing::debug!("no git HEAD at {}; snapshot is unversioned", canonical.display());
        UNVERSIONED.to_string()
    });

    Ok(SnapshotResult::new(canonical, commit_sha))
}

fn head_commit(dir: &Path) -> Option<String> {
    let repo = Repository::open(dir).ok()?;
    let commit = repo.head().ok()?.peel_to_commit().ok()?;
    Some(commit.id().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn plain_directory_is_unversioned() {
        let temp = TempDir::new().expect("tmp");
        fs::write(temp.path().join("a.txt"), "hello").expect("write");

        let snap = local_snapshot(temp.path()).expect("snapshot");
        assert_eq!(snap.commit_sha, UNVERSIONED);
        assert_eq!(snap.workdir, temp.path().canonicalize().unwrap());
    }

    #[test]
    fn missing_path_is_an_error() {
        let temp = TempDir::new().expect("tmp");
        let err = local_snapshot(&temp.path().join("nope")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn file_path_is_rejected() {
        let temp = TempDir::new().expect("tmp");
        let file = temp.path().join("a.txt");
        fs::write(&file, "x").expect("write");
        assert!(local_snapshot(&file).is_err());
    }

    #[test]
    fn git_checkout_reports_head() {
        let temp = TempDir::new().expect("tmp");
        let repo = Repository::init(temp.path()).expect("init");
        fs::write(temp.path().join("a.txt"), "hello").expect("write");

        let mut index = repo.index().expect("index");
        index.add_path(Path::new("a.txt")).expect("add");
        index.write().expect("write index");
        let tree_id = index.write_tree().expect("tree");
        let tree = repo.find_tree(tree_id).expect("find tree");
        let sig = git2::Signature::now("Test", "test@example.com").expect("sig");
        let oid = repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[]).expect("commit");

        let snap = local_snapshot(temp.path()).expect("snapshot");
        assert_eq!(snap.commit_sha, oid.to_string());
    }
}
