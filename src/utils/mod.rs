//! Shared helpers for path handling, file decoding, and size estimates.

pub mod encoding;
pub mod paths;
pub mod tokens;

pub use encoding::{is_binary_file, read_text, BINARY_SAMPLE_SIZE};
pub use paths::{join_rel, normalize_path};
pub use tokens::estimate_tokens;
