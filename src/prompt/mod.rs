//! Prompt construction for diagram synthesis.
//!
//! Every prompt is a pure function of its inputs: the same corpus and language
//! always yield the same request text.

#[macro_use]
mod sections;

pub mod dot;
pub mod mermaid;

use crate::domain::DiagramLanguage;

/// The fixed instruction header for `language`.
pub fn prompt_header(language: DiagramLanguage) -> &'static str {
    match language {
        DiagramLanguage::Mermaid => mermaid::HEADER,
        DiagramLanguage::Dot => dot::HEADER,
    }
}

/// Header, exactly one blank line, then `corpus` verbatim.
pub fn build_prompt(language: DiagramLanguage, corpus: &str) -> String {
    let header = prompt_header(language);
    let mut prompt = String::with_capacity(header.len() + 2 + corpus.len());
    prompt.push_str(header);
    prompt.push_str("\n\n");
    prompt.push_str(corpus);
    prompt
}

/// Second seed turn approving the outline the header asks for.
pub fn outline_approval(language: DiagramLanguage) -> String {
    format!(
        "Outline approved. Provide the final {} diagram, legend, and narrative summary now.",
        language.display_name()
    )
}

/// Correction turn quoting the validator's error verbatim.
pub fn correction_prompt(language: DiagramLanguage, validator_error: &str) -> String {
    let (parser, rules) = match language {
        DiagramLanguage::Mermaid => ("Mermaid parser", mermaid::CORRECTION_RULES),
        DiagramLanguage::Dot => ("Graphviz parser", dot::CORRECTION_RULES),
    };
    let name = language.display_name();
    let tag = language.primary_tag();

    format!(
        "The {name} diagram you generated has syntax errors. Please fix them while maintaining \
the architectural accuracy based on the original codebase analysis.

**Error from {parser}:**
{validator_error}

{rules}

Please provide the corrected {name} diagram code. Output ONLY the corrected diagram wrapped in \
```{tag} code blocks, with no additional explanation."
    )
}

/// Follow-up turn asking for the diagram to be updated with a code diff.
pub fn diff_prompt(language: DiagramLanguage, diff: &str) -> String {
    let name = language.display_name();
    let tag = language.primary_tag();

    format!(
        "The following unified diff will be applied to the codebase you just diagrammed.

```diff
{diff}
```

Update the {name} diagram to show how this change affects the architecture:
- Keep every component and edge that the diff does not touch.
- Mark added components and edges, changed components and edges, and removed components and \
edges so each kind is visually distinct, and extend the legend to explain the markings.
- Follow the same {name} syntax and label quoting rules as before.

Output the complete updated diagram wrapped in ```{tag} code blocks, followed by a short \
summary of the architectural impact."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "===== /file.txt =====\nconsole.log('hi');";

    #[test]
    fn prompt_ends_with_the_listing() {
        for language in [DiagramLanguage::Mermaid, DiagramLanguage::Dot] {
            assert!(build_prompt(language, LISTING).ends_with(LISTING));
        }
    }

    #[test]
    fn header_and_listing_are_separated_by_one_blank_line() {
        for language in [DiagramLanguage::Mermaid, DiagramLanguage::Dot] {
            let prompt = build_prompt(language, LISTING);
            let header = &prompt[..prompt.len() - LISTING.len()];
            assert!(header.ends_with("**Codebase Listing:**\n\n"));
            assert!(!header.ends_with("\n\n\n"));
            assert_eq!(header.trim_end_matches('\n'), prompt_header(language));
        }
    }

    #[test]
    fn headers_name_their_language() {
        assert!(prompt_header(DiagramLanguage::Mermaid).contains("Output must be Mermaid."));
        assert!(prompt_header(DiagramLanguage::Dot).contains("Output must be Graphviz DOT."));
        assert!(prompt_header(DiagramLanguage::Dot).contains("`digraph G {`"));
    }

    #[test]
    fn correction_quotes_error_and_examples() {
        let prompt = correction_prompt(DiagramLanguage::Mermaid, "Parse error on line 3");
        assert!(prompt.contains("**Error from Mermaid parser:**\nParse error on line 3\n"));
        assert!(prompt.contains(r#"`A["Presentation (CLI/UI)"]`"#));
        assert!(prompt.contains("```mermaid code blocks"));

        let prompt = correction_prompt(DiagramLanguage::Dot, "syntax error in line 2");
        assert!(prompt.contains("Graphviz parser"));
        assert!(prompt.contains("```dot code blocks"));
    }

    #[test]
    fn outline_approval_names_language() {
        assert_eq!(
            outline_approval(DiagramLanguage::Mermaid),
            "Outline approved. Provide the final Mermaid diagram, legend, and narrative summary now."
        );
    }

    #[test]
    fn diff_prompt_embeds_diff() {
        let prompt = diff_prompt(DiagramLanguage::Dot, "+fn added() {}");
        assert!(prompt.contains("```diff\n+fn added() {}\n```"));
        assert!(prompt.contains("```dot code blocks"));
    }
}
