//! Snapshot concatenation into a single delimited corpus.
//!
//! Every included file becomes one chunk:
//!
//! ```text
//! ===== /src/main.rs =====
//! fn main() {}
//! ```
//!
//! Oversized files and (by default) binary files are dropped silently.

use crate::domain::{Config, DEFAULT_MAX_FILE_BYTES};
use crate::scan::walker::WalkOptions;
use crate::utils::{is_binary_file, normalize_path, read_text, BINARY_SAMPLE_SIZE};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Options for corpus assembly.
#[derive(Debug, Clone)]
pub struct ConcatOptions {
    pub walk: WalkOptions,
    pub max_file_bytes: u64,
    pub treat_binary_as_ignored: bool,
}

impl Default for ConcatOptions {
    fn default() -> Self {
        Self {
            walk: WalkOptions::default(),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            treat_binary_as_ignored: true,
        }
    }
}

impl ConcatOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            walk: WalkOptions::from_config(config),
            max_file_bytes: config.max_file_bytes,
            treat_binary_as_ignored: config.treat_binary_as_ignored,
        }
    }
}

/// One file's contribution to the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusChunk {
    pub path: String,
    pub header: String,
    /// File text, or empty when the file is binary and binaries are kept.
    pub body: String,
}

impl CorpusChunk {
    fn new(rel: &str, body: String) -> Self {
        let path = normalize_path(rel);
        let header = chunk_header(&path);
        Self { path, header, body }
    }

    /// Header, a newline, then the body with exactly one trailing newline added
    /// when missing.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.header.len() + self.body.len() + 2);
        out.push_str(&self.header);
        out.push('\n');
        out.push_str(&self.body);
        if !self.body.ends_with('\n') {
            out.push('\n');
        }
        out
    }
}

/// The marker line for a normalized relative path.
pub fn chunk_header(rel: &str) -> String {
    format!("===== /{rel} =====")
}

/// Lazily yields rendered chunks in walk order.
///
/// Single pass: once drained it stays empty.
pub struct CorpusChunks {
    root: PathBuf,
    paths: std::vec::IntoIter<String>,
    max_file_bytes: u64,
    treat_binary_as_ignored: bool,
}

impl CorpusChunks {
    pub fn new(root: &Path, paths: Vec<String>, options: &ConcatOptions) -> Self {
        Self {
            root: root.to_path_buf(),
            paths: paths.into_iter(),
            max_file_bytes: options.max_file_bytes,
            treat_binary_as_ignored: options.treat_binary_as_ignored,
        }
    }

    /// `Ok(None)` means the file is skipped.
    fn load(&self, rel: &str) -> Result<Option<CorpusChunk>> {
        let abs = self.root.join(rel);
        let meta =
            std::fs::metadata(&abs).with_context(|| format!("Failed to stat {}", abs.display()))?;
        if meta.len() > self.max_file_bytes {
            tracing::debug!(path = rel, size = meta.len(), "skipping oversized file");
            return Ok(None);
        }

        if is_binary_file(&abs, BINARY_SAMPLE_SIZE) {
            if self.treat_binary_as_ignored {
                tracing::debug!(path = rel, "skipping binary file");
                return Ok(None);
            }
            return Ok(Some(CorpusChunk::new(rel, String::new())));
        }

        let body = read_text(&abs)?;
        Ok(Some(CorpusChunk::new(rel, body)))
    }
}

impl Iterator for CorpusChunks {
    type Item = Result<CorpusChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let rel = self.paths.next()?;
            match self.load(&rel) {
                Ok(Some(chunk)) => return Some(Ok(chunk)),
                Ok(None) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

/// Eagerly join every chunk for `paths` under `root`.
pub fn concatenate(root: &Path, paths: Vec<String>, options: &ConcatOptions) -> Result<String> {
    let mut corpus = String::new();
    for chunk in CorpusChunks::new(root, paths, options) {
        corpus.push_str(&chunk?.render());
    }
    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::walker::list_included_files;
    use std::fs;
    use tempfile::TempDir;

    fn corpus_of(root: &Path, options: &ConcatOptions) -> String {
        let paths = list_included_files(root, &options.walk).unwrap();
        concatenate(root, paths, options).unwrap()
    }

    #[test]
    fn single_file_matches_wire_format() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "hello").unwrap();

        assert_eq!(corpus_of(tmp.path(), &ConcatOptions::default()), "===== /a.txt =====\nhello\n");
    }

    #[test]
    fn trailing_newline_is_not_doubled() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "one\n").unwrap();
        fs::write(tmp.path().join("b.txt"), "").unwrap();

        assert_eq!(
            corpus_of(tmp.path(), &ConcatOptions::default()),
            "===== /a.txt =====\none\n===== /b.txt =====\n\n"
        );
    }

    #[test]
    fn oversized_files_leave_no_header() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("big.txt"), "x".repeat(64)).unwrap();
        fs::write(tmp.path().join("small.txt"), "ok").unwrap();

        let options = ConcatOptions { max_file_bytes: 16, ..ConcatOptions::default() };
        let corpus = corpus_of(tmp.path(), &options);
        assert!(!corpus.contains("big.txt"));
        assert!(corpus.contains("===== /small.txt ====="));
    }

    #[test]
    fn size_cap_is_inclusive() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("edge.txt"), "x".repeat(16)).unwrap();

        let options = ConcatOptions { max_file_bytes: 16, ..ConcatOptions::default() };
        assert!(corpus_of(tmp.path(), &options).contains("edge.txt"));
    }

    #[test]
    fn binary_files_are_skipped_or_emptied() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("img.bin"), [0x89, b'P', b'N', b'G', 0x00, 0x01]).unwrap();

        let skipped = corpus_of(tmp.path(), &ConcatOptions::default());
        assert!(skipped.is_empty());

        let options = ConcatOptions { treat_binary_as_ignored: false, ..ConcatOptions::default() };
        assert_eq!(corpus_of(tmp.path(), &options), "===== /img.bin =====\n\n");
    }

    #[test]
    fn lazy_chunks_match_eager_corpus() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("src")).unwrap();
        fs::write(tmp.path().join("src/lib.rs"), "pub fn x() {}\n").unwrap();
        fs::write(tmp.path().join("README.md"), "# Demo").unwrap();

        let options = ConcatOptions::default();
        let paths = list_included_files(tmp.path(), &options.walk).unwrap();
        let lazy: String = CorpusChunks::new(tmp.path(), paths.clone(), &options)
            .map(|c| c.unwrap().render())
            .collect();
        let eager = concatenate(tmp.path(), paths, &options).unwrap();

        assert_eq!(lazy, eager);
        assert!(eager.starts_with("===== /README.md ====="));
    }

    #[test]
    fn missing_listed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let result =
            concatenate(tmp.path(), vec!["gone.txt".to_string()], &ConcatOptions::default());
        assert!(result.is_err());
    }
}
