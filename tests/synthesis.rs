//! Integration tests for the diagram synthesis protocol using scripted models

use repo_diagram::domain::{DiagramLanguage, RepoRef};
use repo_diagram::synth::{
    CorpusSource, DiagramSynthesizer, DiagramValidator, LanguageModel, LocalCorpus, Message,
    ModelRequest, ModelResponse, ResponsesPayload, Role, SynthesisError, SynthesisResult,
    Validation,
};
use repo_diagram::scan::ConcatOptions;
use std::collections::VecDeque;
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Replays canned payloads and records every request it receives.
struct ScriptedModel {
    replies: Mutex<VecDeque<ResponsesPayload>>,
    seen: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl ScriptedModel {
    fn new(replies: Vec<ResponsesPayload>) -> (Box<Self>, Arc<Mutex<Vec<Vec<Message>>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let model = ScriptedModel { replies: Mutex::new(replies.into()), seen: Arc::clone(&seen) };
        (Box::new(model), seen)
    }
}

impl LanguageModel for ScriptedModel {
    fn respond(&self, request: &ModelRequest<'_>) -> SynthesisResult<ModelResponse> {
        self.seen.lock().unwrap().push(request.input.to_vec());
        Ok(self.replies.lock().unwrap().pop_front().unwrap_or_else(|| text("")))
    }
}

/// Rejects the first `failures` diagrams with numbered errors, then accepts.
struct FlakyValidator {
    failures: usize,
    calls: Mutex<usize>,
}

impl FlakyValidator {
    fn new(failures: usize) -> Box<Self> {
        Box::new(FlakyValidator { failures, calls: Mutex::new(0) })
    }
}

impl DiagramValidator for FlakyValidator {
    fn validate(&self, _diagram: &str) -> SynthesisResult<Validation> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        if *calls <= self.failures {
            Ok(Validation::Invalid(format!("Parse error #{}", *calls)))
        } else {
            Ok(Validation::Valid)
        }
    }
}

struct UnavailableValidator;

impl DiagramValidator for UnavailableValidator {
    fn validate(&self, _diagram: &str) -> SynthesisResult<Validation> {
        Err(SynthesisError::ValidatorUnavailable("dot not found".into()))
    }
}

fn text(s: &str) -> ResponsesPayload {
    ResponsesPayload {
        id: "resp".into(),
        status: "completed".into(),
        output_text: Some(s.to_string()),
        output: None,
    }
}

fn corpus() -> Box<dyn CorpusSource> {
    Box::new(|_: &RepoRef| -> anyhow::Result<String> {
        Ok("===== /src/main.rs =====\nfn main() {}\n".to_string())
    })
}

fn repo() -> RepoRef {
    RepoRef::new("octo", "demo", "main").unwrap()
}

#[test]
fn always_invalid_stops_after_max_attempts() {
    let replies =
        (0..10).map(|i| text(&format!("```mermaid\ngraph TD\n  A{i} --> B\n```"))).collect();
    let (model, seen) = ScriptedModel::new(replies);
    let synth = DiagramSynthesizer::new(model, corpus())
        .with_validator(FlakyValidator::new(usize::MAX))
        .with_max_attempts(3);

    let err = synth.generate(&repo()).unwrap_err();

    assert_eq!(seen.lock().unwrap().len(), 3);
    assert!(matches!(err, SynthesisError::ValidationExhausted { attempts: 3, .. }));
    assert!(err.to_string().contains("Parse error #3"), "{err}");
}

#[test]
fn invalid_then_corrected_returns_second_diagram() {
    let (model, seen) = ScriptedModel::new(vec![
        text("Here you go:\n```mermaid\ngraph TD\n  A[Bad (label)] --> B\n```\nLegend..."),
        text("```mermaid\n  graph TD\n    A[\"Good (label)\"] --> B\n```"),
    ]);
    let synth = DiagramSynthesizer::new(model, corpus()).with_validator(FlakyValidator::new(1));

    let synthesis = synth.generate(&repo()).unwrap();

    assert_eq!(synthesis.diagram, "graph TD\n    A[\"Good (label)\"] --> B");
    assert_eq!(synthesis.attempts, 2);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    // Second call carries the full history plus the correction turn.
    let second = &seen[1];
    assert_eq!(second.len(), 4);
    assert_eq!(second[2].role, Role::Assistant);
    assert_eq!(second[3].role, Role::User);
    assert!(second[3].content.contains("**Error from Mermaid parser:**\nParse error #1"));
    assert!(second[3].content.contains(r#"`A["Presentation (CLI/UI)"]`"#));

    assert_eq!(synthesis.conversation.messages().len(), 5);
}

#[test]
fn reply_without_fence_is_corrected_like_a_syntax_error() {
    let (model, seen) = ScriptedModel::new(vec![
        text("```mermaid\nflowchart TD\n  A[Bad (label)] --> B\n```"),
        text("Sure! Here is the corrected diagram:\nflowchart TD\n  A[\"Good\"] --> B"),
        text("```mermaid\nflowchart TD\n  A[\"Good (label)\"] --> B\n```"),
    ]);
    let synthesis = DiagramSynthesizer::new(model, corpus()).generate(&repo()).unwrap();

    assert_eq!(synthesis.attempts, 3);
    assert_eq!(synthesis.diagram, "flowchart TD\n  A[\"Good (label)\"] --> B");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    let correction = &seen[2].last().unwrap().content;
    assert!(correction.contains("Unable to locate Mermaid diagram in model response."));
}

#[test]
fn nested_content_fragment_yields_dot_diagram() {
    let payload: ResponsesPayload = serde_json::from_str(
        r#"{"id":"resp_1","status":"completed","output":[
            {"type":"message","content":[{"type":"output_text","text":"```dot\ndigraph G {}\n```"}]}
        ]}"#,
    )
    .unwrap();
    let (model, _) = ScriptedModel::new(vec![payload]);
    let synth = DiagramSynthesizer::new(model, corpus())
        .with_language(DiagramLanguage::Dot)
        .with_validator(FlakyValidator::new(0));

    let synthesis = synth.generate(&repo()).unwrap();
    assert_eq!(synthesis.diagram, "digraph G {}");
}

#[test]
fn mermaid_validator_drives_real_correction() {
    let (model, seen) = ScriptedModel::new(vec![
        text("```mermaid\nflowchart TD\n  A[Presentation (CLI/UI)] --> B[Core]\n```"),
        text("```mermaid\nflowchart TD\n  A[\"Presentation (CLI/UI)\"] --> B[Core]\n```"),
    ]);
    let synthesis = DiagramSynthesizer::new(model, corpus()).generate(&repo()).unwrap();

    assert_eq!(seen.lock().unwrap().len(), 2);
    assert!(synthesis.diagram.contains(r#"A["Presentation (CLI/UI)"]"#));
}

#[test]
fn validator_unavailable_is_fatal() {
    let (model, seen) = ScriptedModel::new(vec![text("```dot\ndigraph G {}\n```")]);
    let synth = DiagramSynthesizer::new(model, corpus())
        .with_language(DiagramLanguage::Dot)
        .with_validator(Box::new(UnavailableValidator));

    let err = synth.generate(&repo()).unwrap_err();
    assert!(matches!(err, SynthesisError::ValidatorUnavailable(_)));
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn local_corpus_feeds_the_prompt() {
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("lib.rs"), "pub fn answer() -> u8 { 42 }\n").unwrap();
    fs::write(project.path().join("notes.log"), "skip me\n").unwrap();
    fs::write(project.path().join(".gitignore"), "*.log\n").unwrap();

    let (model, seen) =
        ScriptedModel::new(vec![text("```mermaid\ngraph LR\n  lib --> answer\n```")]);
    let source = LocalCorpus::new(project.path(), ConcatOptions::default());
    DiagramSynthesizer::new(model, Box::new(source)).generate(&repo()).unwrap();

    let seen = seen.lock().unwrap();
    let prompt = &seen[0][0].content;
    assert!(prompt.ends_with(
        "===== /.gitignore =====\n*.log\n===== /lib.rs =====\npub fn answer() -> u8 { 42 }\n"
    ));
    assert!(!prompt.contains("notes.log"));
}

#[test]
fn diff_enhancement_reuses_correction_loop() {
    let (model, seen) = ScriptedModel::new(vec![
        text("```mermaid\ngraph TD\n  A --> B\n```"),
        text("```mermaid\ngraph TD\n  A --> B\n  B --> C(New)\n```"),
        text("```mermaid\ngraph TD\n  A --> B\n  B --> C[\"New (added)\"]\n```"),
    ]);
    // Accept the base diagram, reject the first enhanced one.
    let validator = Box::new(SequenceValidator::new(vec![
        Validation::Valid,
        Validation::Invalid("Expecting 'SQE', got 'PS'".into()),
        Validation::Valid,
    ]));
    let synth = DiagramSynthesizer::new(model, corpus()).with_validator(validator);

    let base = synth.generate(&repo()).unwrap();
    let enhanced =
        synth.enhance_with_diff(base.conversation, "diff --git a/x b/x\n+added\n").unwrap();

    assert_eq!(seen.lock().unwrap().len(), 3);
    assert_eq!(enhanced.attempts, 2);
    assert_eq!(enhanced.diagram, "graph TD\n  A --> B\n  B --> C[\"New (added)\"]");
}

struct SequenceValidator {
    outcomes: Mutex<VecDeque<Validation>>,
}

impl SequenceValidator {
    fn new(outcomes: Vec<Validation>) -> Self {
        Self { outcomes: Mutex::new(outcomes.into()) }
    }
}

impl DiagramValidator for SequenceValidator {
    fn validate(&self, _diagram: &str) -> SynthesisResult<Validation> {
        Ok(self.outcomes.lock().unwrap().pop_front().unwrap_or(Validation::Valid))
    }
}
