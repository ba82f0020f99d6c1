use crate::domain::ports::{InferenceClient, InferenceRequest};
use crate::utils::error::{InferenceError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

/// Client for any OpenAI-compatible `chat/completions` endpoint (Gemini's
/// compatibility layer, LiteLLM, a local proxy, ...).
#[derive(Debug, Clone)]
pub struct HttpInferenceClient {
    client: Client,
    api_base: String,
    api_key: Option<String>,
    timeout_seconds: u64,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    temperature: f32,
    messages: Vec<Value>,
    response_format: Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl HttpInferenceClient {
    pub fn new(api_base: &str, api_key: Option<String>, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| InferenceError::Transport {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
            timeout_seconds,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }

    fn build_body(request: &InferenceRequest) -> ChatRequest {
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(json!({ "role": "system", "content": system }));
        }

        let mut content = vec![json!({ "type": "text", "text": request.prompt })];
        for attachment in &request.attachments {
            content.push(json!({
                "type": "image_url",
                "image_url": { "url": attachment.data_url() }
            }));
        }
        messages.push(json!({ "role": "user", "content": content }));

        ChatRequest {
            model: request.model.clone(),
            temperature: 0.0,
            messages,
            response_format: json!({ "type": "json_object" }),
        }
    }

    fn classify(&self, e: reqwest::Error) -> InferenceError {
        if e.is_timeout() {
            InferenceError::Timeout {
                seconds: self.timeout_seconds,
            }
        } else {
            InferenceError::from(e)
        }
    }
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn complete(&self, request: InferenceRequest) -> Result<String> {
        let endpoint = self.endpoint();
        tracing::debug!(
            "Inference request to {} (model: {}, attachments: {})",
            endpoint,
            request.model,
            request.attachments.len()
        );

        let mut builder = self.client.post(&endpoint).json(&Self::build_body(&request));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        tracing::debug!("Inference response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Transport {
                message: format!("{} returned {}: {}", endpoint, status, body.trim()),
            }
            .into());
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| InferenceError::MalformedResponse {
                message: format!("Unexpected completion payload: {}", e),
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                InferenceError::MalformedResponse {
                    message: "Completion contained no message content".to_string(),
                }
                .into()
            })
    }
}
