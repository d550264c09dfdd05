//! Ignore-aware directory walker
//!
//! Produces the deterministic, depth-first, name-sorted list of files that make
//! up a snapshot. Every directory gets a fresh matcher built from the rules it
//! inherits plus its own `.gitignore`, rewritten to apply only below it.

use crate::domain::{Config, DEFAULT_IGNORES};
use crate::utils::join_rel;
use anyhow::{Context, Result};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

const IGNORE_FILE: &str = ".gitignore";

/// Options for [`list_included_files`].
#[derive(Debug, Clone)]
pub struct WalkOptions {
    pub respect_gitignore: bool,
    pub extra_ignore_globs: Vec<String>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self { respect_gitignore: true, extra_ignore_globs: Vec::new() }
    }
}

impl WalkOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            respect_gitignore: config.respect_gitignore,
            extra_ignore_globs: config.extra_ignore_globs.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Dir,
    File,
    Other,
}

struct Entry {
    name: String,
    os_name: OsString,
    kind: EntryKind,
}

/// One directory on the walk stack, carrying the rule set its children inherit.
struct Frame {
    abs: PathBuf,
    rel: String,
    rules: Vec<String>,
    matcher: Gitignore,
    entries: std::vec::IntoIter<Entry>,
}

/// List the files under `root` that survive the ignore rules.
///
/// Paths are relative to `root`, `/`-separated, and ordered depth-first with
/// each directory's entries sorted by name. Ignored directories are pruned
/// without being read.
pub fn list_included_files(root: &Path, options: &WalkOptions) -> Result<Vec<String>> {
    let mut seed: Vec<String> = DEFAULT_IGNORES.iter().map(|s| s.to_string()).collect();
    seed.extend(options.extra_ignore_globs.iter().cloned());

    let mut files = Vec::new();
    let mut stack = vec![open_frame(root, root.to_path_buf(), String::new(), &seed, options)?];

    while let Some(frame) = stack.last_mut() {
        let Some(entry) = frame.entries.next() else {
            stack.pop();
            continue;
        };

        let child_rel = join_rel(&frame.rel, &entry.name);
        let is_dir = entry.kind == EntryKind::Dir;
        if frame.matcher.matched(Path::new(&child_rel), is_dir).is_ignore() {
            tracing::trace!(path = %child_rel, "ignored");
            continue;
        }

        match entry.kind {
            EntryKind::Dir => {
                let abs = frame.abs.join(&entry.os_name);
                let child = open_frame(root, abs, child_rel, &frame.rules, options)?;
                stack.push(child);
            }
            EntryKind::File => files.push(child_rel),
            EntryKind::Other => {}
        }
    }

    tracing::debug!(root = %root.display(), files = files.len(), "walk complete");
    Ok(files)
}

fn open_frame(
    root: &Path,
    abs: PathBuf,
    rel: String,
    inherited: &[String],
    options: &WalkOptions,
) -> Result<Frame> {
    let mut rules = inherited.to_vec();
    if options.respect_gitignore {
        if let Some(local) = read_ignore_file(&abs) {
            rules.extend(prefix_rules(&rel, &local));
        }
    }

    let matcher = build_matcher(root, &rules)?;
    let entries = read_sorted_entries(&abs)?;

    Ok(Frame { abs, rel, rules, matcher, entries: entries.into_iter() })
}

/// Read a directory's `.gitignore`; absent or unreadable files yield `None`.
fn read_ignore_file(dir: &Path) -> Option<Vec<String>> {
    let contents = fs::read_to_string(dir.join(IGNORE_FILE)).ok()?;
    Some(parse_ignore_lines(&contents))
}

/// Trim lines and drop blanks and `#` comments.
pub fn parse_ignore_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Rewrite rules from the `.gitignore` in `dir_rel` so they only reach below it.
///
/// `/x` and `a/b` (already anchored to the ignore file's directory) become
/// `dir/x` and `dir/a/b`. A bare name like `*.log` matches at any depth in git,
/// so it becomes `dir/**/*.log`. Negation is kept in front.
pub fn prefix_rules(dir_rel: &str, rules: &[String]) -> Vec<String> {
    if dir_rel.is_empty() {
        return rules.to_vec();
    }

    rules
        .iter()
        .map(|rule| {
            let (negated, body) = match rule.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, rule.as_str()),
            };
            let anchored = body.starts_with('/') || body.trim_end_matches('/').contains('/');
            let body = body.trim_start_matches('/');
            let joined = if anchored {
                format!("{dir_rel}/{body}")
            } else {
                format!("{dir_rel}/**/{body}")
            };
            if negated {
                format!("!{joined}")
            } else {
                joined
            }
        })
        .collect()
}

fn build_matcher(root: &Path, rules: &[String]) -> Result<Gitignore> {
    let mut builder = GitignoreBuilder::new(root);
    for rule in rules {
        builder.add_line(None, rule).with_context(|| format!("Invalid ignore pattern: {rule}"))?;
    }
    builder.build().context("Failed building ignore matcher")
}

fn read_sorted_entries(dir: &Path) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    for item in fs::read_dir(dir)
        .with_context(|| format!("Failed reading directory: {}", dir.display()))?
    {
        let item = item.with_context(|| format!("Failed reading entry in {}", dir.display()))?;
        // file_type() does not follow symlinks, so links land in Other.
        let kind = match item.file_type() {
            Ok(t) if t.is_dir() => EntryKind::Dir,
            Ok(t) if t.is_file() => EntryKind::File,
            _ => EntryKind::Other,
        };
        let os_name = item.file_name();
        let name = os_name.to_string_lossy().into_owned();
        entries.push(Entry { name, os_name, kind });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}
