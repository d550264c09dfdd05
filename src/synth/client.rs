//! Language-model client seam and the default responses-API implementation.

use crate::synth::conversation::Message;
use crate::synth::error::{SynthesisError, SynthesisResult};
use crate::synth::response::ResponsesPayload;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// One model call: the model identifier plus every turn so far.
#[derive(Debug, Clone, Serialize)]
pub struct ModelRequest<'a> {
    pub model: &'a str,
    pub input: &'a [Message],
}

pub type ModelResponse = ResponsesPayload;

/// Anything that can answer a conversation.
pub trait LanguageModel: Send + Sync {
    fn respond(&self, request: &ModelRequest<'_>) -> SynthesisResult<ModelResponse>;
}

/// Error envelope returned on non-success statuses.
#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Blocking client for `POST <api_base>/responses`.
pub struct OpenAiResponsesClient {
    http: Client,
    endpoint: String,
    api_key: String,
}

impl OpenAiResponsesClient {
    pub fn new(api_base: &str, api_key: impl Into<String>) -> SynthesisResult<Self> {
        // Diagram responses routinely take minutes; no request timeout is imposed.
        let http = Client::builder()
            .timeout(None::<Duration>)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                SynthesisError::ModelService(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            endpoint: format!("{}/responses", api_base.trim_end_matches('/')),
            api_key: api_key.into(),
        })
    }

    /// Read the key from `OPENAI_API_KEY`.
    pub fn from_env(api_base: &str) -> SynthesisResult<Self> {
        Self::from_key(api_base, std::env::var(API_KEY_ENV).ok())
    }

    fn from_key(api_base: &str, api_key: Option<String>) -> SynthesisResult<Self> {
        match api_key.filter(|k| !k.trim().is_empty()) {
            Some(key) => Self::new(api_base, key),
            None => Err(SynthesisError::MissingCredential(API_KEY_ENV)),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl LanguageModel for OpenAiResponsesClient {
    fn respond(&self, request: &ModelRequest<'_>) -> SynthesisResult<ModelResponse> {
        tracing::debug!(
            endpoint = %self.endpoint,
            model = request.model,
            turns = request.input.len(),
            "sending model request"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .map_err(|e| SynthesisError::ModelService(format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| SynthesisError::ModelService(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            let message =
                serde_json::from_str::<ApiError>(&body).map(|e| e.error.message).unwrap_or(body);
            let code = status.as_u16();
            return Err(SynthesisError::ModelService(format!("HTTP {code}: {message}")));
        }

        let payload: ResponsesPayload = serde_json::from_str(&body)
            .map_err(|e| SynthesisError::ModelService(format!("failed to parse response: {e}")))?;
        tracing::debug!(id = %payload.id, status = %payload.status, "model responded");
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::conversation::Conversation;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve exactly one HTTP exchange and hand back the raw request body.
    fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut content_length = 0usize;
            let mut head = String::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = value.trim().parse().unwrap();
                }
                head.push_str(&line);
            }
            let mut request_body = vec![0u8; content_length];
            reader.read_exact(&mut request_body).unwrap();

            let mut stream = stream;
            write!(
                stream,
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            format!("{head}\n{}", String::from_utf8(request_body).unwrap())
        });
        (base, handle)
    }

    #[test]
    fn missing_key_is_a_credential_error() {
        let err =
            OpenAiResponsesClient::from_key("https://api.example.com/v1", None).err().unwrap();
        assert!(matches!(err, SynthesisError::MissingCredential("OPENAI_API_KEY")));
        assert_eq!(err.to_string(), "Missing OPENAI_API_KEY environment variable.");

        assert!(OpenAiResponsesClient::from_key("https://x", Some("  ".into())).is_err());
    }

    #[test]
    fn endpoint_joins_api_base() {
        let client = OpenAiResponsesClient::new("https://api.example.com/v1/", "k").unwrap();
        assert_eq!(client.endpoint(), "https://api.example.com/v1/responses");
    }

    #[test]
    fn request_serializes_as_model_and_input() {
        let convo = Conversation::new().with_user("prompt").with_assistant("reply");
        let request = ModelRequest { model: "gpt-5", input: convo.messages() };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "model": "gpt-5",
                "input": [
                    {"role": "user", "content": "prompt"},
                    {"role": "assistant", "content": "reply"}
                ]
            })
        );
    }

    #[test]
    fn posts_conversation_with_bearer_auth() {
        let (base, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"id":"resp_1","status":"completed","output_text":"```mermaid\ngraph TD\n```"}"#,
        );
        let client = OpenAiResponsesClient::new(&base, "sk-test").unwrap();
        let convo = Conversation::new().with_user("hello");

        let request = ModelRequest { model: "gpt-5", input: convo.messages() };
        let payload = client.respond(&request).unwrap();
        assert_eq!(payload.id, "resp_1");
        assert_eq!(payload.output_text.as_deref(), Some("```mermaid\ngraph TD\n```"));

        let seen = server.join().unwrap();
        assert!(seen.starts_with("POST /responses "));
        assert!(seen.to_ascii_lowercase().contains("authorization: bearer sk-test"));
        assert!(seen.contains(r#""input":[{"role":"user","content":"hello"}]"#));
    }

    #[test]
    fn error_status_surfaces_code_and_message() {
        let (base, server) = serve_once(
            "HTTP/1.1 401 Unauthorized",
            r#"{"error":{"message":"Incorrect API key provided"}}"#,
        );
        let client = OpenAiResponsesClient::new(&base, "bad").unwrap();
        let convo = Conversation::new().with_user("hello");

        let request = ModelRequest { model: "gpt-5", input: convo.messages() };
        let err = client.respond(&request).unwrap_err();
        assert_eq!(err.to_string(), "Model service error: HTTP 401: Incorrect API key provided");
        server.join().unwrap();
    }
}
