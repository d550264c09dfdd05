//! Snapshot and prompt command implementations

use anyhow::{Context, Result};
use clap::Args;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::utils::{load_settings, resolve_target, source_overrides, CorpusArgs, SourceArgs};
use crate::config::CliOverrides;
use crate::domain::DiagramLanguage;
use crate::prompt::build_prompt;
use crate::scan::{concatenate, list_included_files, ConcatOptions, CorpusChunks};
use crate::utils::estimate_tokens;

#[derive(Args)]
pub struct SnapshotArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// Write the corpus to this file instead of stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct PromptArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// Diagram language the prompt asks for
    #[arg(short = 'l', long, value_enum)]
    pub language: Option<DiagramLanguage>,
}

pub fn run(args: SnapshotArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_settings(config_path, source_overrides(&args.source, Some(&args.corpus)))?;
    let target = resolve_target(&args.source)?;
    let snapshot = target.materialize(&config)?;
    let options = ConcatOptions::from_config(&config);
    let files = list_included_files(&snapshot.workdir, &options.walk)?;

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed creating {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let (mut count, mut bytes, mut tokens) = (0usize, 0usize, 0usize);
    for chunk in CorpusChunks::new(&snapshot.workdir, files, &options) {
        let rendered = chunk?.render();
        count += 1;
        bytes += rendered.len();
        tokens += estimate_tokens(&rendered);
        out.write_all(rendered.as_bytes())?;
    }
    out.flush()?;

    eprintln!(
        "info: {} at {}: {count} files, {bytes} bytes, ~{tokens} tokens",
        target.repo(),
        snapshot.short_sha()
    );
    if let Some(path) = &args.output {
        eprintln!("info: corpus written to {}", path.display());
    }
    Ok(())
}

pub fn run_prompt(args: PromptArgs, config_path: Option<&Path>) -> Result<()> {
    let overrides = CliOverrides {
        language: args.language,
        ..source_overrides(&args.source, Some(&args.corpus))
    };
    let config = load_settings(config_path, overrides)?;
    let target = resolve_target(&args.source)?;
    let snapshot = target.materialize(&config)?;
    let options = ConcatOptions::from_config(&config);

    let files = list_included_files(&snapshot.workdir, &options.walk)?;
    let corpus = concatenate(&snapshot.workdir, files, &options)?;
    let prompt = build_prompt(config.language, &corpus);

    let mut stdout = io::stdout().lock();
    stdout.write_all(prompt.as_bytes())?;
    stdout.flush()?;
    eprintln!("info: prompt is ~{} tokens", estimate_tokens(&prompt));
    Ok(())
}
