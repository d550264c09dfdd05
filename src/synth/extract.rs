//! Fenced diagram extraction.

use crate::domain::DiagramLanguage;
use crate::synth::error::{SynthesisError, SynthesisResult};
use once_cell::sync::Lazy;
use regex::Regex;

static MERMAID_FENCE: Lazy<Regex> = Lazy::new(|| fence_pattern(DiagramLanguage::Mermaid));
static DOT_FENCE: Lazy<Regex> = Lazy::new(|| fence_pattern(DiagramLanguage::Dot));

fn fence_pattern(language: DiagramLanguage) -> Regex {
    let tags = language.fence_tags().join("|");
    // Tags are fixed identifiers, so the pattern always compiles.
    Regex::new(&format!(r"(?i)```(?:{tags})\s*([\s\S]*?)```")).unwrap()
}

/// Body of the first fenced block tagged for `language`, trimmed.
pub fn extract_diagram(language: DiagramLanguage, text: &str) -> SynthesisResult<String> {
    let pattern = match language {
        DiagramLanguage::Mermaid => &*MERMAID_FENCE,
        DiagramLanguage::Dot => &*DOT_FENCE,
    };

    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|body| body.as_str().trim())
        .filter(|body| !body.is_empty())
        .map(str::to_string)
        .ok_or(SynthesisError::DiagramNotFound { language: language.display_name() })
}
