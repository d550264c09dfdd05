//! Diagram syntax validation.
//!
//! Mermaid is checked in-process; DOT is piped through an external Graphviz
//! command. A validator either accepts the diagram, rejects it with a
//! parser-style message the model can act on, or reports that it cannot run.

use crate::domain::{DiagramLanguage, DEFAULT_DOT_COMMAND};
use crate::synth::error::{SynthesisError, SynthesisResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

/// Outcome of validating one diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Invalid(String),
}

/// Checks diagram syntax.
pub trait DiagramValidator: Send + Sync {
    /// `Err` only when the validator itself cannot run.
    fn validate(&self, diagram: &str) -> SynthesisResult<Validation>;
}

/// Default validator for `language`.
pub fn validator_for(language: DiagramLanguage, dot_command: &str) -> Box<dyn DiagramValidator> {
    match language {
        DiagramLanguage::Mermaid => Box::new(MermaidValidator),
        DiagramLanguage::Dot => Box::new(CommandValidator::graphviz(dot_command)),
    }
}

// ---------------------------------------------------------------------------
// Mermaid
// ---------------------------------------------------------------------------

const DIAGRAM_KEYWORDS: &[&str] = &[
    "graph",
    "flowchart",
    "sequenceDiagram",
    "classDiagram",
    "classDiagram-v2",
    "stateDiagram",
    "stateDiagram-v2",
    "erDiagram",
    "journey",
    "gantt",
    "pie",
    "quadrantChart",
    "requirementDiagram",
    "gitGraph",
    "mindmap",
    "timeline",
    "C4Context",
    "C4Container",
    "C4Component",
    "C4Dynamic",
    "C4Deployment",
    "sankey-beta",
    "xychart-beta",
    "block-beta",
    "packet-beta",
    "architecture-beta",
    "kanban",
];

const FLOWCHART_DIRECTIONS: &[&str] = &["TB", "TD", "BT", "RL", "LR"];

static SUBGRAPH_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^subgraph(\s|$)").unwrap());
static BLOCK_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"^end\s*;?$").unwrap());

/// Structural Mermaid checker.
///
/// Recognizes the diagram header, then for flowcharts enforces the rules that
/// most often break real renders: balanced shape brackets, closed quotes,
/// matched `subgraph`/`end`, and quoting of labels that contain bracket
/// characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct MermaidValidator;

impl DiagramValidator for MermaidValidator {
    fn validate(&self, diagram: &str) -> SynthesisResult<Validation> {
        Ok(match check_mermaid(diagram) {
            Ok(()) => Validation::Valid,
            Err(message) => Validation::Invalid(message),
        })
    }
}

fn check_mermaid(diagram: &str) -> Result<(), String> {
    let mut lines = significant_lines(diagram)?.into_iter();
    let Some((header_no, header)) = lines.next() else {
        return Err("No diagram type detected: diagram is empty".to_string());
    };

    let mut words = header.split_whitespace();
    let keyword = words.next().unwrap_or_default();
    if !DIAGRAM_KEYWORDS.contains(&keyword) {
        return Err(parse_error(
            header_no,
            header,
            &format!("No diagram type detected matching '{keyword}'"),
        ));
    }

    if keyword != "graph" && keyword != "flowchart" {
        return Ok(());
    }

    if let Some(direction) = words.next() {
        let direction = direction.trim_end_matches(';');
        if !FLOWCHART_DIRECTIONS.contains(&direction) {
            return Err(parse_error(
                header_no,
                header,
                &format!("Unknown flowchart direction '{direction}'"),
            ));
        }
    }

    let mut open_subgraphs: Vec<usize> = Vec::new();
    for (line_no, line) in lines {
        if SUBGRAPH_OPEN.is_match(line) {
            open_subgraphs.push(line_no);
        } else if BLOCK_END.is_match(line) {
            if open_subgraphs.pop().is_none() {
                let detail = "Unexpected 'end' without matching 'subgraph'";
                return Err(parse_error(line_no, line, detail));
            }
            continue;
        }
        check_flowchart_line(line).map_err(|detail| parse_error(line_no, line, &detail))?;
    }

    if let Some(line_no) = open_subgraphs.pop() {
        return Err(format!("Parse error on line {line_no}: 'subgraph' is never closed with 'end'"));
    }
    Ok(())
}

/// Non-blank, non-comment lines with 1-based line numbers, front matter removed.
fn significant_lines(diagram: &str) -> Result<Vec<(usize, &str)>, String> {
    let mut out = Vec::new();
    let mut in_front_matter = false;
    let mut seen_content = false;

    for (idx, raw) in diagram.lines().enumerate() {
        let line = raw.trim();
        if line == "---" && (!seen_content || in_front_matter) {
            in_front_matter = !in_front_matter;
            seen_content = true;
            continue;
        }
        if in_front_matter || line.is_empty() || line.starts_with("%%") {
            continue;
        }
        seen_content = true;
        out.push((idx + 1, line));
    }

    if in_front_matter {
        return Err("Parse error: front matter block is never closed with '---'".to_string());
    }
    Ok(out)
}

fn closing_for(open: char) -> Option<char> {
    match open {
        '[' => Some(']'),
        '(' => Some(')'),
        '{' => Some('}'),
        _ => None,
    }
}

fn is_id_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Walk one flowchart statement, tracking quotes and shape brackets.
///
/// A shape label is the text between a node id and its closing bracket. Shape
/// modifiers such as `((`, `[(`, `[/` and `{{` are allowed; a bare label that
/// then contains another bracket character must be quoted.
fn check_flowchart_line(line: &str) -> Result<(), String> {
    let chars: Vec<char> = line.chars().collect();
    let mut stack: Vec<char> = Vec::new();
    let mut in_quote = false;
    let mut idx = 0;

    while idx < chars.len() {
        let ch = chars[idx];
        if ch == '"' {
            in_quote = !in_quote;
            idx += 1;
            continue;
        }
        if in_quote {
            idx += 1;
            continue;
        }

        // `id>label]` is the asymmetric shape; arrows put `-` or `=` before `>`.
        let opener = match ch {
            '>' if idx > 0 && is_id_char(chars[idx - 1]) => Some(']'),
            other => closing_for(other),
        };
        if let Some(close) = opener {
            if stack.is_empty() {
                // Opening a node shape: consume modifier brackets, then the label.
                let mut expected = vec![close];
                idx += 1;
                while idx < chars.len() {
                    match closing_for(chars[idx]) {
                        Some(inner) if expected.len() < 2 => {
                            expected.push(inner);
                            idx += 1;
                        }
                        _ => break,
                    }
                }
                while idx < chars.len() && matches!(chars[idx], '/' | '\\' | '>') {
                    idx += 1;
                }
                if chars.get(idx) == Some(&'"') {
                    stack.extend(expected);
                    continue;
                }
                idx = scan_bare_label(&chars, idx, &expected)?;
                continue;
            }
            stack.push(close);
        } else if matches!(ch, ']' | ')' | '}') {
            match stack.last() {
                Some(&expected) if expected == ch => {
                    stack.pop();
                }
                Some(&expected) => {
                    return Err(format!("Expecting '{expected}', got '{ch}'"));
                }
                None => return Err(format!("Unexpected '{ch}' without matching opening bracket")),
            }
        }
        idx += 1;
    }

    if in_quote {
        return Err("Unterminated string: missing closing '\"'".to_string());
    }
    if let Some(expected) = stack.last() {
        return Err(format!("Expecting '{expected}', got end of line"));
    }
    Ok(())
}

/// Scan an unquoted label up to the closers in `expected` (innermost last).
/// Returns the index just past the final closer.
fn scan_bare_label(chars: &[char], start: usize, expected: &[char]) -> Result<usize, String> {
    let mut idx = start;
    let mut pending: Vec<char> = expected.to_vec();

    while idx < chars.len() {
        let ch = chars[idx];
        let Some(&next_close) = pending.last() else {
            break;
        };
        if ch == next_close {
            // The shape closes from here: remaining closers must follow directly.
            pending.pop();
            idx += 1;
            while let Some(&close) = pending.last() {
                match chars.get(idx) {
                    Some(&c) if c == close => {
                        pending.pop();
                        idx += 1;
                    }
                    _ => {
                        return Err(unquoted_label_error(chars, start, idx));
                    }
                }
            }
            return Ok(idx);
        }
        if matches!(ch, '[' | ']' | '(' | ')' | '{' | '}' | '"') {
            // Shape modifiers like `/` and `\` may precede the closer.
            return Err(unquoted_label_error(chars, start, idx));
        }
        idx += 1;
    }

    Err(format!("Expecting '{}', got end of line", pending.last().copied().unwrap_or(']')))
}

fn unquoted_label_error(chars: &[char], start: usize, at: usize) -> String {
    let label: String = chars[start..chars.len().min(at + 1)].iter().collect();
    format!(
        "Unexpected character in unquoted label '{}'. Labels containing special characters must be wrapped in double quotes",
        label.trim()
    )
}

fn parse_error(line_no: usize, line: &str, detail: &str) -> String {
    format!("Parse error on line {line_no}:\n{line}\n{detail}")
}

// ---------------------------------------------------------------------------
// External command (Graphviz)
// ---------------------------------------------------------------------------

/// Runs an external checker with the diagram on stdin.
///
/// A non-zero exit or any stderr output means the diagram is invalid.
#[derive(Debug, Clone)]
pub struct CommandValidator {
    program: String,
    args: Vec<String>,
}

impl CommandValidator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }

    /// `<program> -Tdot`, falling back to `dot` when `program` is blank.
    pub fn graphviz(program: &str) -> Self {
        let program = if program.trim().is_empty() { DEFAULT_DOT_COMMAND } else { program.trim() };
        Self::new(program, vec!["-Tdot".to_string()])
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl DiagramValidator for CommandValidator {
    fn validate(&self, diagram: &str) -> SynthesisResult<Validation> {
        tracing::debug!(program = %self.program, args = ?self.args, "running diagram validator");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| unavailable(&self.program, &err))?;

        // Feed stdin from a separate thread so a large stdout cannot stall the pipe.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = diagram.to_owned();
            std::thread::spawn(move || stdin.write_all(input.as_bytes()))
        });

        let output = child.wait_with_output().map_err(|err| unavailable(&self.program, &err))?;

        if let Some(handle) = writer {
            match handle.join() {
                Ok(Ok(())) => {}
                // The checker may exit before reading everything; its status decides.
                Ok(Err(err)) if err.kind() == ErrorKind::BrokenPipe => {}
                Ok(Err(err)) => {
                    return Err(SynthesisError::ValidatorUnavailable(format!(
                        "failed writing diagram to {}: {err}",
                        self.program
                    )))
                }
                Err(_) => {
                    return Err(SynthesisError::ValidatorUnavailable(format!(
                        "stdin writer for {} panicked",
                        self.program
                    )))
                }
            }
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            let message = if stderr.is_empty() {
                format!("{} exited with {}", self.program, output.status)
            } else {
                stderr
            };
            return Ok(Validation::Invalid(message));
        }
        if !stderr.is_empty() {
            return Ok(Validation::Invalid(stderr));
        }
        Ok(Validation::Valid)
    }
}

fn unavailable(program: &str, err: &std::io::Error) -> SynthesisError {
    if err.kind() == ErrorKind::NotFound {
        SynthesisError::ValidatorUnavailable(format!(
            "'{program}' was not found. Install Graphviz (https://graphviz.org/download/) \
             or point dot_command at the dot binary."
        ))
    } else {
        SynthesisError::ValidatorUnavailable(format!("failed to run '{program}': {err}"))
    }
}
