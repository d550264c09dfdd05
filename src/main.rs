//! repo-diagram: snapshot a repository and synthesize its architecture diagram

use anyhow::Result;

fn main() -> Result<()> {
    repo_diagram::cli::run()
}
