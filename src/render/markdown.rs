//! Markdown diagram reports.

use crate::domain::{DiagramLanguage, RepoRef};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Where a diagram came from, as printed under the title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramSource {
    Remote { url: String },
    Local { path: PathBuf },
}

impl DiagramSource {
    pub fn remote(host: &str, repo: &RepoRef) -> Self {
        let host = host.trim_end_matches('/');
        let base =
            if host.contains("://") { host.to_string() } else { format!("https://{host}") };
        Self::Remote { url: format!("{base}/{}/{}", repo.owner, repo.repo) }
    }

    fn describe(&self) -> String {
        match self {
            DiagramSource::Remote { url } => format!("Generated from repository: {url}"),
            DiagramSource::Local { path } => {
                format!("Generated from directory: {}", path.display())
            }
        }
    }
}

/// A base diagram for one ref.
pub fn render_base_markdown(
    repo: &RepoRef,
    source: &DiagramSource,
    language: DiagramLanguage,
    diagram: &str,
) -> String {
    let mut out = format!("# Architecture Diagram: {}\n\n", repo.slug());
    // Two trailing spaces force a Markdown line break.
    let _ = writeln!(out, "{}  ", source.describe());
    let _ = writeln!(out, "Ref: {}\n", repo.ref_);
    push_fence(&mut out, language, diagram);
    out
}

/// A diagram updated with a diff between `repo.ref_` and `head`.
pub fn render_enhanced_markdown(
    repo: &RepoRef,
    source: &DiagramSource,
    head: &str,
    language: DiagramLanguage,
    diagram: &str,
) -> String {
    let mut out = format!("# Architecture Diagram (Enhanced with Diff): {}\n\n", repo.slug());
    let _ = writeln!(out, "{}  ", source.describe());
    let _ = writeln!(out, "Base: {}  ", repo.ref_);
    let _ = writeln!(out, "Head: {head}\n");
    out.push_str("This diagram shows how changes in the diff impact the overall architecture.\n\n");
    push_fence(&mut out, language, diagram);
    out
}

fn push_fence(out: &mut String, language: DiagramLanguage, diagram: &str) {
    let _ = writeln!(out, "```{}", language.primary_tag());
    out.push_str(diagram.trim_end());
    out.push_str("\n```\n");
}

/// `20261015-093000` style stamp used in output names.
pub fn timestamp_slug(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d-%H%M%S").to_string()
}

/// Base and `-diff` report paths for one run.
pub fn report_paths(
    output_dir: &Path,
    repo: &str,
    model: &str,
    timestamp: &str,
) -> (PathBuf, PathBuf) {
    let model: String = model
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || "-_.".contains(c) { c } else { '-' })
        .collect();
    let stem = format!("{repo}-architecture-diagram-{model}-{timestamp}");
    (output_dir.join(format!("{stem}.md")), output_dir.join(format!("{stem}-diff.md")))
}

pub fn write_markdown(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed creating output directory: {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed writing {}", path.display()))
}
