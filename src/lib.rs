//! repo-diagram: repository snapshots and validated architecture diagrams
//!
//! Fetches a repository at a ref into a local cache, walks it with gitignore
//! semantics, concatenates the included files into one corpus, and drives a
//! language model through an outline/final/correction protocol until it
//! returns a Mermaid or Graphviz diagram that passes validation.

pub mod cli;
pub mod config;
pub mod domain;
pub mod fetch;
pub mod prompt;
pub mod render;
pub mod scan;
pub mod synth;
pub mod utils;
