//! Diagram synthesis: seeded conversation, extraction, validation, correction
//!
//! A request runs as
//! `fetch corpus -> outline seed -> final request -> extract -> validate`,
//! looping through `correct -> extract -> validate` until the diagram passes
//! or the attempt budget is spent.

pub mod client;
pub mod conversation;
pub mod error;
pub mod extract;
pub mod response;
pub mod validate;

pub use client::{LanguageModel, ModelRequest, ModelResponse, OpenAiResponsesClient};
pub use conversation::{Conversation, Message, Role};
pub use error::{SynthesisError, SynthesisResult};
pub use extract::extract_diagram;
pub use response::{ExtractedText, ResponseShape, ResponsesPayload};
pub use validate::{validator_for, CommandValidator, DiagramValidator, MermaidValidator, Validation};

use crate::domain::{Config, DiagramLanguage, RepoRef, DEFAULT_MAX_ATTEMPTS, DEFAULT_MODEL};
use crate::fetch::SnapshotFetcher;
use crate::prompt;
use crate::scan::{concatenate, concatenate_repo, list_included_files, ConcatOptions};
use std::path::PathBuf;

/// Supplies the corpus for a repository.
pub trait CorpusSource: Send + Sync {
    fn corpus(&self, repo: &RepoRef) -> anyhow::Result<String>;
}

impl<F> CorpusSource for F
where
    F: Fn(&RepoRef) -> anyhow::Result<String> + Send + Sync,
{
    fn corpus(&self, repo: &RepoRef) -> anyhow::Result<String> {
        self(repo)
    }
}

/// Fetch through the snapshot cache, then concatenate.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCorpus {
    fetcher: SnapshotFetcher,
    options: ConcatOptions,
}

impl SnapshotCorpus {
    pub fn new(fetcher: SnapshotFetcher, options: ConcatOptions) -> Self {
        Self { fetcher, options }
    }
}

impl CorpusSource for SnapshotCorpus {
    fn corpus(&self, repo: &RepoRef) -> anyhow::Result<String> {
        concatenate_repo(&self.fetcher, repo, &self.options)
    }
}

/// Concatenate a local directory; the requested ref is ignored.
#[derive(Debug, Clone)]
pub struct LocalCorpus {
    root: PathBuf,
    options: ConcatOptions,
}

impl LocalCorpus {
    pub fn new(root: impl Into<PathBuf>, options: ConcatOptions) -> Self {
        Self { root: root.into(), options }
    }
}

impl CorpusSource for LocalCorpus {
    fn corpus(&self, _repo: &RepoRef) -> anyhow::Result<String> {
        let files = list_included_files(&self.root, &self.options.walk)?;
        concatenate(&self.root, files, &self.options)
    }
}

/// A validated diagram plus the transcript that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesis {
    pub diagram: String,
    pub conversation: Conversation,
    /// Attempts used, first attempt included.
    pub attempts: usize,
}

/// Drives one model through the diagram protocol.
pub struct DiagramSynthesizer {
    model: Box<dyn LanguageModel>,
    source: Box<dyn CorpusSource>,
    validator: Box<dyn DiagramValidator>,
    language: DiagramLanguage,
    model_id: String,
    max_attempts: usize,
}

impl DiagramSynthesizer {
    /// Mermaid output with the default model id and attempt budget.
    pub fn new(model: Box<dyn LanguageModel>, source: Box<dyn CorpusSource>) -> Self {
        Self {
            model,
            source,
            validator: Box::new(MermaidValidator),
            language: DiagramLanguage::Mermaid,
            model_id: DEFAULT_MODEL.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn from_config(
        config: &Config,
        model: Box<dyn LanguageModel>,
        source: Box<dyn CorpusSource>,
    ) -> Self {
        Self::new(model, source)
            .with_model_id(&config.model)
            .with_max_attempts(config.max_attempts)
            .with_language(config.language)
            .with_validator(validator_for(config.language, &config.dot_command))
    }

    /// Switch language; also resets the validator to that language's default.
    #[must_use]
    pub fn with_language(mut self, language: DiagramLanguage) -> Self {
        self.language = language;
        self.validator = validator_for(language, "");
        self
    }

    #[must_use]
    pub fn with_validator(mut self, validator: Box<dyn DiagramValidator>) -> Self {
        self.validator = validator;
        self
    }

    #[must_use]
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Values below one are raised to one.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn language(&self) -> DiagramLanguage {
        self.language
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Fetch the corpus for `repo` and synthesize its diagram.
    pub fn generate(&self, repo: &RepoRef) -> SynthesisResult<Synthesis> {
        tracing::info!(
            repo = %repo,
            language = %self.language,
            model = %self.model_id,
            "synthesizing diagram"
        );
        let corpus = self.source.corpus(repo).map_err(SynthesisError::Fetch)?;
        self.generate_from_corpus(&corpus)
    }

    /// Synthesize from an already assembled corpus.
    pub fn generate_from_corpus(&self, corpus: &str) -> SynthesisResult<Synthesis> {
        let conversation = Conversation::new()
            .with_user(prompt::build_prompt(self.language, corpus))
            .with_user(prompt::outline_approval(self.language));
        let conversation = self.ask(conversation)?;
        self.correct_until_valid(conversation)
    }

    /// Continue `conversation` with a unified diff and return the updated diagram.
    pub fn enhance_with_diff(
        &self,
        conversation: Conversation,
        diff: &str,
    ) -> SynthesisResult<Synthesis> {
        if diff.trim().is_empty() {
            return Err(SynthesisError::EmptyDiff);
        }
        tracing::info!(diff_bytes = diff.len(), "enhancing diagram with diff");
        let conversation =
            self.ask(conversation.with_user(prompt::diff_prompt(self.language, diff.trim_end())))?;
        self.correct_until_valid(conversation)
    }

    /// One model call; the normalized reply is appended as an assistant turn.
    fn ask(&self, conversation: Conversation) -> SynthesisResult<Conversation> {
        let request = ModelRequest { model: &self.model_id, input: conversation.messages() };
        tracing::debug!(turns = conversation.len(), model = %self.model_id, "calling model");
        let response = self.model.respond(&request)?;
        let text = ExtractedText::try_from(response)?;
        Ok(conversation.with_assistant(text.into_string()))
    }

    /// Extract and validate the latest reply, requesting corrections while
    /// attempts remain. A reply without a fenced diagram is corrected like a
    /// syntax error.
    fn correct_until_valid(&self, conversation: Conversation) -> SynthesisResult<Synthesis> {
        let mut conversation = conversation;
        let mut attempt = 1;

        loop {
            let reply = conversation.last_reply().unwrap_or_default();
            let outcome = match extract_diagram(self.language, reply) {
                Ok(diagram) => {
                    let validation = self.validator.validate(&diagram)?;
                    (diagram, validation)
                }
                Err(err @ SynthesisError::DiagramNotFound { .. }) => {
                    (String::new(), Validation::Invalid(err.to_string()))
                }
                Err(err) => return Err(err),
            };

            match outcome {
                (diagram, Validation::Valid) => {
                    tracing::info!(attempt, "diagram validated");
                    return Ok(Synthesis { diagram, conversation, attempts: attempt });
                }
                (_, Validation::Invalid(error)) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %error,
                        "diagram failed validation"
                    );
                    if attempt >= self.max_attempts {
                        return Err(SynthesisError::ValidationExhausted {
                            language: self.language.display_name(),
                            attempts: attempt,
                            last_error: error,
                        });
                    }
                    let correction = prompt::correction_prompt(self.language, &error);
                    conversation = self.ask(conversation.with_user(correction))?;
                    attempt += 1;
                }
            }
        }
    }
}
