//! Output rendering (Markdown diagram reports)

pub mod markdown;

pub use markdown::{
    render_base_markdown, render_enhanced_markdown, report_paths, timestamp_slug, write_markdown,
    DiagramSource,
};
