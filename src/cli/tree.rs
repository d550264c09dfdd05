//! Tree command implementation

use anyhow::Result;
use clap::Args;
use std::path::Path;

use super::utils::{load_settings, resolve_target, source_overrides, SourceArgs};
use crate::scan::{list_included_files, render_tree, WalkOptions};

#[derive(Args)]
pub struct TreeArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

pub fn run(args: TreeArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_settings(config_path, source_overrides(&args.source, None))?;
    let target = resolve_target(&args.source)?;
    let snapshot = target.materialize(&config)?;

    let files = list_included_files(&snapshot.workdir, &WalkOptions::from_config(&config))?;
    println!("{}", target.repo());
    let tree = render_tree(&files);
    if !tree.is_empty() {
        println!("{tree}");
    }
    eprintln!("info: {} files at {}", files.len(), snapshot.short_sha());
    Ok(())
}
