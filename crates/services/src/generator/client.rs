use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::generator::config::GeneratorConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A text-generation service: messages in, completion text out.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Run a single completion request.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` on transport failure, a non-success status,
    /// or a response without completion text.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, GenerationError>;
}

/// Chat-completions client for OpenAI-compatible endpoints.
#[derive(Clone)]
pub struct OpenAiCompletionClient {
    client: Client,
    config: Option<GeneratorConfig>,
}

impl OpenAiCompletionClient {
    /// # Errors
    ///
    /// Returns `GenerationError::Network` if the HTTP client cannot be built.
    pub fn from_env() -> Result<Self, GenerationError> {
        Self::new(GeneratorConfig::from_env())
    }

    /// # Errors
    ///
    /// Returns `GenerationError::Network` if the HTTP client cannot be built.
    pub fn new(config: Option<GeneratorConfig>) -> Result<Self, GenerationError> {
        let mut builder = Client::builder();
        if let Some(config) = &config {
            builder = builder.timeout(config.timeout);
        }
        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.config.as_ref().map(|c| c.model.as_str())
    }
}

#[async_trait]
impl CompletionBackend for OpenAiCompletionClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, GenerationError> {
        let config = self.config.as_ref().ok_or(GenerationError::Disabled)?;

        let url = format!(
            "{}/chat/completions",
            config.base_url.trim_end_matches('/')
        );
        let payload = ChatRequest {
            model: &config.model,
            messages,
            temperature,
        };

        tracing::debug!(%url, model = %config.model, messages = messages.len(), "sending completion request");
        let mut request = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload);
        if let Some(project) = &config.project {
            request = request.header("OpenAI-Project", project);
        }
        let response = request.send().await?;

        let status = response.status();
        tracing::debug!(%status, "completion response received");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status,
                message: api_error_message(&body),
            });
        }

        let body = response.text().await?;
        completion_text(&body)
    }
}

/// Error message from an API error body, or a generic one.
#[must_use]
pub fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .and_then(|e| e.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| "Unknown error".to_string())
}

/// Pull the first choice's content out of a chat-completions body.
///
/// # Errors
///
/// Returns `GenerationError::MalformedResponse` if the body does not have the
/// expected shape, or `EmptyResponse` if there is no content.
pub fn completion_text(body: &str) -> Result<String, GenerationError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::MalformedResponse("no choices in response".into()))?;
    choice
        .message
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or(GenerationError::EmptyResponse)
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}
