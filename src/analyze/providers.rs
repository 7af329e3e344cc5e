// src/analyze/providers.rs
//! Concrete LLM providers. They differ only in endpoint, auth header shape and response
//! envelope; each one returns the assistant's raw text for the shared parser.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::prompt::Prompt;
use super::response_parse::ParseError;

const TEMPERATURE: f32 = 0.1;
const CHAT_MAX_TOKENS: u32 = 500;
const ANTHROPIC_MAX_TOKENS: u32 = 600;
const ANTHROPIC_VERSION: &str = "2023-06-01";
const ERROR_BODY_MAX: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("empty content in provider response")]
    EmptyContent,
    #[error("provider call timed out")]
    Timeout,
    #[error("unparsable model output: {0}")]
    Parse(#[from] ParseError),
}

impl LlmError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::Http(_) => "http",
            LlmError::Status { .. } => "status",
            LlmError::EmptyContent => "empty",
            LlmError::Timeout => "timeout",
            LlmError::Parse(_) => "parse",
        }
    }
}

/// One chat-completion style backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send the prompt and return the assistant's raw text content.
    async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError>;
    fn name(&self) -> &'static str;
}

// ------------------------------------------------------------
// OpenAI-compatible chat completions (OpenAI, OpenRouter)
// ------------------------------------------------------------

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

impl<'a> ChatRequest<'a> {
    fn new(model: &'a str, prompt: &'a Prompt) -> Self {
        Self {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: CHAT_MAX_TOKENS,
            response_format: None,
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn into_content(self) -> Result<String, LlmError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}

/// Bearer-authenticated OpenAI endpoint; asks for a JSON object response.
pub struct OpenAiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(http: reqwest::Client, api_key: String, model: String, base_url: String) -> Self {
        Self {
            http,
            api_key,
            model,
            base_url,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError> {
        let mut body = ChatRequest::new(&self.model, prompt);
        body.response_format = Some(ResponseFormat {
            kind: "json_object",
        });

        let resp = send_checked(
            self.http
                .post(format!("{}/chat/completions", self.base_url))
                .bearer_auth(&self.api_key)
                .json(&body),
        )
        .await?;
        let envelope: ChatResponse = resp.json().await?;
        envelope.into_content()
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// OpenRouter: OpenAI-compatible envelope plus attribution headers.
pub struct OpenRouterProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenRouterProvider {
    pub fn new(http: reqwest::Client, api_key: String, model: String, base_url: String) -> Self {
        Self {
            http,
            api_key,
            model,
            base_url,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError> {
        let body = ChatRequest::new(&self.model, prompt);

        let resp = send_checked(
            self.http
                .post(format!("{}/chat/completions", self.base_url))
                .bearer_auth(&self.api_key)
                .header("HTTP-Referer", "https://github.com/hate-speech-monitor")
                .header("X-Title", "Hate Speech Monitor")
                .json(&body),
        )
        .await?;
        let envelope: ChatResponse = resp.json().await?;
        envelope.into_content()
    }

    fn name(&self) -> &'static str {
        "openrouter"
    }
}

// ------------------------------------------------------------
// Anthropic messages API
// ------------------------------------------------------------

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// `x-api-key` authenticated; system prompt travels outside the message list.
pub struct AnthropicProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(http: reqwest::Client, api_key: String, model: String, base_url: String) -> Self {
        Self {
            http,
            api_key,
            model,
            base_url,
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: ANTHROPIC_MAX_TOKENS,
            temperature: TEMPERATURE,
            system: prompt.system,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt.user,
            }],
        };

        let resp = send_checked(
            self.http
                .post(format!("{}/messages", self.base_url))
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&body),
        )
        .await?;
        let envelope: MessagesResponse = resp.json().await?;
        envelope
            .content
            .into_iter()
            .filter(|b| b.kind.is_empty() || b.kind == "text")
            .find_map(|b| b.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}

// ------------------------------------------------------------
// Mock provider (tests/local runs)
// ------------------------------------------------------------

/// Returns a fixed raw model output without any network call.
#[derive(Clone)]
pub struct MockProvider {
    pub fixed: String,
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(&self, _prompt: &Prompt) -> Result<String, LlmError> {
        Ok(self.fixed.clone())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Non-2xx responses become `LlmError::Status` with a clipped body.
async fn send_checked(req: reqwest::RequestBuilder) -> Result<reqwest::Response, LlmError> {
    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body: String = resp
            .text()
            .await
            .unwrap_or_default()
            .chars()
            .take(ERROR_BODY_MAX)
            .collect();
        return Err(LlmError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp)
}
