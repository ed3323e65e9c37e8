//! # Cliente del Servicio de Generación
//! src/generation/client.rs
//!
//! Cliente para un endpoint compatible con OpenAI Chat Completions. Se pide
//! `response_format: json_object` para que el contenido sea JSON.
//!
//! El cliente no impone timeout: si el servicio no responde, el job queda en
//! `processing`.

use crate::generation::error::GenerationError;
use crate::generation::prompt::SYSTEM_PROMPT;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// Servicio externo que completa un prompt y devuelve el texto generado
pub trait CompletionClient: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Cliente de OpenAI Chat Completions
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
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

impl OpenAiClient {
    pub fn new(api_key: &str, base_url: &str, model: &str) -> Result<Self, GenerationError> {
        let http = Client::builder().timeout(None::<std::time::Duration>).build()?;

        Ok(Self {
            http,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn build_request_body(&self, prompt: &str) -> serde_json::Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.7,
        })
    }
}

impl CompletionClient for OpenAiClient {
    fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        debug!(model = %self.model, prompt_len = prompt.len(), "complete: called");

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&self.build_request_body(prompt))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(GenerationError::Api { status: status.as_u16(), message });
        }

        let body: ChatResponse = response.json()?;
        extract_content(body)
    }
}

fn extract_content(body: ChatResponse) -> Result<String, GenerationError> {
    body.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(GenerationError::EmptyResponse)
}
