use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::stateless_llm_interface::StatelessLLMInterface;
use crate::agent::interface::Message;
use crate::agent::key_pool::Credential;
use crate::error::CompletionError;

/// OpenAI compatible chat completion client (Groq, OpenAI, DeepSeek, ...)
pub struct OpenAICompatibleLLM {
    client: Client,
    model: String,
    base_url: String,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAICompatibleLLM {
    pub fn new(client: Client, model: String, base_url: String, temperature: f32) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        info!(
            "Initialized OpenAICompatibleLLM: model={}, base_url={}",
            model, base_url
        );
        Self {
            client,
            model,
            base_url,
            temperature,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl StatelessLLMInterface for OpenAICompatibleLLM {
    async fn chat_completion(
        &self,
        credential: &Credential,
        messages: &[Message],
    ) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages,
        };

        debug!(
            key = %credential,
            messages = messages.len(),
            "Sending chat completion to {}",
            self.base_url
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(credential.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| CompletionError::Other(anyhow::anyhow!("request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CompletionError::Other(anyhow::anyhow!("failed to read body: {}", e)))?;

        if let Some(err) = classify_status(status, &body) {
            return Err(err);
        }

        parse_completion(&body)
    }
}

/// Map a non-success status onto a completion error
fn classify_status(status: StatusCode, body: &str) -> Option<CompletionError> {
    if status.is_success() {
        return None;
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Some(CompletionError::RateLimited(body.to_string()));
    }
    Some(CompletionError::Http {
        status: status.as_u16(),
        body: body.to_string(),
    })
}

fn parse_completion(body: &str) -> Result<String, CompletionError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| CompletionError::Other(anyhow::anyhow!("malformed completion: {}", e)))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| CompletionError::Other(anyhow::anyhow!("completion has no content")))
}
