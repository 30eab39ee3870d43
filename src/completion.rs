//! Completion-API client.
//!
//! The analysis flows treat text generation as an opaque collaborator: they
//! hand over a system prompt and a user prompt and get back a single string.
//! That seam is the [`CompletionProvider`] trait; the shipped implementation
//! talks to the OpenAI chat-completions endpoint.

use crate::error::Error;
use crate::Result;
use async_trait::async_trait;
use http_client::{HttpClient, Request};
use http_types::{Method, Url};
use serde::{Deserialize, Serialize};

/// Default base URL for the OpenAI API.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Model used for both analysis and suggestion completions.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Trait for the text-generation collaborator.
///
/// Implementations return the raw completion text; downstream parsing never
/// assumes anything about its structure. Tests substitute canned strings.
#[async_trait(?Send)]
pub trait CompletionProvider {
    /// Generate a completion for the given system and user prompts.
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String>;
}

/// One completion request: prompts plus sampling parameters.
#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    /// System prompt establishing the model's persona
    pub system: &'a str,
    /// User prompt carrying the track data and format instructions
    pub user: &'a str,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl<'a> CompletionRequest<'a> {
    /// Build a request with the sampling defaults the flows use.
    #[must_use]
    pub fn new(system: &'a str, user: &'a str, max_tokens: u32) -> Self {
        Self {
            system,
            user,
            max_tokens,
            temperature: 0.7,
        }
    }
}

/// Client for the OpenAI chat-completions endpoint.
pub struct OpenAiClient {
    client: Box<dyn HttpClient>,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    /// Create a client against the real OpenAI endpoint with the default
    /// model.
    ///
    /// Returns [`Error::NotConfigured`] when the API key is empty, so a
    /// missing credential surfaces at construction rather than on the first
    /// request.
    pub fn new(client: Box<dyn HttpClient>, api_key: String) -> Result<Self> {
        Self::with_base_url(client, api_key, OPENAI_BASE_URL.to_string())
    }

    /// Create a client against a custom base URL (for stub servers in tests).
    pub fn with_base_url(
        client: Box<dyn HttpClient>,
        api_key: String,
        base_url: String,
    ) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::NotConfigured(
                "OpenAI API key is not set".to_string(),
            ));
        }
        Ok(Self {
            client,
            api_key,
            base_url,
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Override the model name.
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }
}

#[async_trait(?Send)]
impl CompletionProvider for OpenAiClient {
    async fn complete(&self, completion: &CompletionRequest<'_>) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: completion.system,
                },
                ChatMessage {
                    role: "user",
                    content: completion.user,
                },
            ],
            max_tokens: completion.max_tokens,
            temperature: completion.temperature,
        };

        let mut request = Request::new(Method::Post, url.parse::<Url>().unwrap());
        request.insert_header("Authorization", format!("Bearer {}", self.api_key));
        request.insert_header("Content-Type", "application/json");
        request.set_body(serde_json::to_string(&body).map_err(|e| Error::Parse(e.to_string()))?);

        let mut response = self
            .client
            .send(request)
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status: u16 = response.status().into();
        let response_body = response
            .body_string()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        if response.status() == 401 {
            return Err(Error::Auth("OpenAI API key rejected".to_string()));
        }
        if response.status() == 429 {
            return Err(Error::RateLimit { retry_after: 60 });
        }
        if !response.status().is_success() {
            return Err(Error::Api {
                status,
                message: response_body,
            });
        }

        parse_completion_response(&response_body)
    }
}

// =============================================================================
// Chat-completions wire shapes
// =============================================================================

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Extract the first choice's message content from a chat-completions
/// response body.
pub fn parse_completion_response(json: &str) -> Result<String> {
    let response: ChatResponse =
        serde_json::from_str(json).map_err(|e| Error::Parse(e.to_string()))?;
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| Error::Parse("Completion response has no choices".to_string()))
}
