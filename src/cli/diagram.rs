//! Diagram command implementation

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::utils::{load_settings, resolve_target, source_overrides, CorpusArgs, SourceArgs, Target};
use crate::config::CliOverrides;
use crate::domain::{Config, DiagramLanguage};
use crate::fetch::SnapshotFetcher;
use crate::render::{
    render_base_markdown, render_enhanced_markdown, report_paths, timestamp_slug, write_markdown,
    DiagramSource,
};
use crate::scan::ConcatOptions;
use crate::synth::{
    CorpusSource, DiagramSynthesizer, LocalCorpus, OpenAiResponsesClient, SnapshotCorpus,
    Synthesis,
};

#[derive(Args)]
pub struct DiagramArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// Diagram language to produce
    #[arg(short = 'l', long, value_enum)]
    pub language: Option<DiagramLanguage>,

    /// Model identifier (default: gpt-5)
    #[arg(short = 'm', long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Model calls allowed before giving up, first call included
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<usize>,

    /// Graphviz binary used to validate DOT output
    #[arg(long, value_name = "PATH")]
    pub dot_command: Option<String>,

    /// Directory for the generated Markdown reports
    #[arg(short = 'o', long, value_name = "DIR", default_value = ".diagrams")]
    pub output_dir: PathBuf,

    /// Unified diff to fold into a second, enhanced diagram
    #[arg(long, value_name = "FILE")]
    pub diff_file: Option<PathBuf>,

    /// Label for the diff's head side in the enhanced report
    #[arg(long, value_name = "REF", requires = "diff_file")]
    pub head_ref: Option<String>,
}

pub fn run(args: DiagramArgs, config_path: Option<&Path>) -> Result<()> {
    let overrides = CliOverrides {
        model: args.model.clone(),
        language: args.language,
        max_attempts: args.max_attempts,
        dot_command: args.dot_command.clone(),
        ..source_overrides(&args.source, Some(&args.corpus))
    };
    let config = load_settings(config_path, overrides)?;
    let target = resolve_target(&args.source)?;

    // Fail on a missing key or unreadable diff before any fetch or model call.
    let client = OpenAiResponsesClient::from_env(&config.api_base)?;
    let diff = match &args.diff_file {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed reading diff file: {}", path.display()))?,
        ),
        None => None,
    };

    let source = corpus_source(&target, &config);
    let synthesizer = DiagramSynthesizer::from_config(&config, Box::new(client), source);
    let repo = target.repo();
    let source = match &target {
        Target::Remote(repo) => DiagramSource::remote(&config.host, repo),
        Target::Local { snapshot, .. } => DiagramSource::Local { path: snapshot.workdir.clone() },
    };
    let (base_path, diff_path) =
        report_paths(&args.output_dir, &repo.repo, &config.model, &timestamp_slug(Utc::now()));

    let message = format!(
        "Generating {} diagram for {} with {}...",
        config.language.display_name(),
        repo,
        config.model
    );
    let synthesis = with_spinner(message, || synthesizer.generate(repo))
        .with_context(|| format!("Failed to generate architecture diagram for {repo}"))?;
    report_attempts(&synthesis);

    write_markdown(
        &base_path,
        &render_base_markdown(repo, &source, config.language, &synthesis.diagram),
    )?;
    println!("Base diagram saved to: {}", base_path.display());

    let Some(diff) = diff else {
        return Ok(());
    };
    if diff.trim().is_empty() {
        eprintln!("info: diff is empty; skipping enhanced diagram");
        return Ok(());
    }

    let enhanced = with_spinner("Enhancing diagram with diff context...".to_string(), || {
        synthesizer.enhance_with_diff(synthesis.conversation, &diff)
    })
    .context("Failed to enhance architecture diagram with diff")?;
    report_attempts(&enhanced);

    let head = match (&args.head_ref, &args.diff_file) {
        (Some(head), _) => head.clone(),
        (None, Some(path)) => path.display().to_string(),
        (None, None) => "working tree".to_string(),
    };
    write_markdown(
        &diff_path,
        &render_enhanced_markdown(repo, &source, &head, config.language, &enhanced.diagram),
    )?;
    println!("Enhanced diagram saved to: {}", diff_path.display());
    Ok(())
}

fn corpus_source(target: &Target, config: &Config) -> Box<dyn CorpusSource> {
    let options = ConcatOptions::from_config(config);
    match target {
        Target::Remote(_) => {
            Box::new(SnapshotCorpus::new(SnapshotFetcher::from_config(config), options))
        }
        Target::Local { snapshot, .. } => {
            Box::new(LocalCorpus::new(snapshot.workdir.clone(), options))
        }
    }
}

fn with_spinner<T>(message: String, work: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(120));
    let result = work();
    spinner.finish_and_clear();
    result
}

fn report_attempts(synthesis: &Synthesis) {
    if synthesis.attempts > 1 {
        eprintln!("info: diagram validated after {} attempts", synthesis.attempts);
    }
}
