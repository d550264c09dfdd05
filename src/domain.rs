//! Core domain types shared by the snapshot and synthesis pipelines.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Files larger than this are left out of the corpus.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 262_144;

/// Maximum synthesis attempts, first attempt included.
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

pub const DEFAULT_MODEL: &str = "gpt-5";
pub const DEFAULT_HOST: &str = "github.com";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_DOT_COMMAND: &str = "dot";

/// Directories pruned from every walk before any `.gitignore` is consulted.
pub const DEFAULT_IGNORES: &[&str] =
    &[".git", "node_modules", "dist", "build", "coverage", ".cache", ".venv"];

static URL_REPO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://[^/]+/([^/]+)/([^/]+?)/?$").unwrap());
static SHORT_REPO: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([^/:]+)/([^/]+)$").unwrap());

/// Identifies one snapshot target: a repository at a branch, tag, or commit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
    #[serde(rename = "ref")]
    pub ref_: String,
}

impl RepoRef {
    pub fn new(owner: &str, repo: &str, ref_: &str) -> Result<Self> {
        validate_component("owner", owner)?;
        validate_component("repository", repo)?;
        for segment in ref_.split('/') {
            validate_component("ref", segment)?;
        }
        Ok(Self { owner: owner.to_string(), repo: repo.to_string(), ref_: ref_.to_string() })
    }

    /// Parse `owner/repo` or `https://host/owner/repo[.git]`.
    pub fn parse(input: &str, ref_: &str) -> Result<Self> {
        let input = input.trim();
        let caps = URL_REPO.captures(input).or_else(|| SHORT_REPO.captures(input)).ok_or_else(|| {
            anyhow::anyhow!(
                "Invalid repository '{input}'. Expected https://github.com/owner/repo or owner/repo"
            )
        })?;
        let owner = &caps[1];
        let repo = caps[2].trim_end_matches(".git");
        Self::new(owner, repo, ref_)
    }

    /// Human-facing `owner/repo` label.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.repo, self.ref_)
    }
}

// Components become cache directory names, so anything that could walk out of
// the cache root is refused.
fn validate_component(kind: &str, value: &str) -> Result<()> {
    if value.is_empty() || value == "." || value == ".." {
        anyhow::bail!("Invalid {kind} component: '{value}'");
    }
    if value.contains('\\') || value.contains('\0') {
        anyhow::bail!("Invalid {kind} component: '{value}'");
    }
    Ok(())
}

/// Supported diagram description languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DiagramLanguage {
    #[default]
    Mermaid,
    Dot,
}

impl DiagramLanguage {
    /// Fence tags accepted when extracting the diagram, matched case-insensitively.
    pub fn fence_tags(self) -> &'static [&'static str] {
        match self {
            DiagramLanguage::Mermaid => &["mermaid"],
            DiagramLanguage::Dot => &["dot", "graphviz"],
        }
    }

    pub fn primary_tag(self) -> &'static str {
        self.fence_tags()[0]
    }

    pub fn display_name(self) -> &'static str {
        match self {
            DiagramLanguage::Mermaid => "Mermaid",
            DiagramLanguage::Dot => "Graphviz DOT",
        }
    }
}

impl fmt::Display for DiagramLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.primary_tag())
    }
}

/// Resolved configuration (file + environment + defaults).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cache_dir: Option<PathBuf>,
    pub host: String,
    pub model: String,
    pub api_base: String,
    pub language: DiagramLanguage,
    pub max_attempts: usize,
    pub max_file_bytes: u64,
    pub treat_binary_as_ignored: bool,
    pub respect_gitignore: bool,
    #[serde(deserialize_with = "string_or_list")]
    pub extra_ignore_globs: Vec<String>,
    pub dot_command: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: None,
            host: DEFAULT_HOST.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            language: DiagramLanguage::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            treat_binary_as_ignored: true,
            respect_gitignore: true,
            extra_ignore_globs: Vec::new(),
            dot_command: DEFAULT_DOT_COMMAND.to_string(),
        }
    }
}

/// Accept either a TOML/YAML list or a comma-separated string.
fn string_or_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        One(String),
        Many(Vec<String>),
    }

    let items = match Raw::deserialize(deserializer)? {
        Raw::One(s) => s.split(',').map(str::to_string).collect::<Vec<_>>(),
        Raw::Many(v) => v,
    };
    Ok(items.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
}
