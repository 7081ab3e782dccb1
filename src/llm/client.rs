//! OpenAI-compatible chat completions client (Groq by default)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::ChatMessage;
use super::CompletionRequest;
use super::CompletionService;
use crate::config::LlmConfig;
use crate::errors::AgriSenseError;
use crate::errors::Result;

pub struct ChatCompletionsClient {
    endpoint: String,
    api_key: String,
    client: Client,
}

impl ChatCompletionsClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgriSenseError::HttpError(e.to_string()))?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client,
        })
    }
}

#[derive(Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponseBody {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl CompletionService for ChatCompletionsClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        if self.api_key.trim().is_empty() {
            return Err(AgriSenseError::LlmError(
                "LLM API key not configured".to_string(),
            ));
        }

        let url = format!("{}/chat/completions", self.endpoint);
        debug!(
            "Calling chat completions: {} model={} max_tokens={}",
            url, request.model, request.max_tokens
        );

        let body = ChatRequestBody {
            model: &request.model,
            messages: request.messages(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AgriSenseError::LlmError(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AgriSenseError::LlmError(format!(
                "API error ({status}): {error_text}"
            )));
        }

        let result: ChatResponseBody = response
            .json()
            .await
            .map_err(|e| AgriSenseError::LlmError(format!("Failed to parse response: {e}")))?;

        result
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AgriSenseError::LlmError("No completion in response".to_string()))
    }
}
