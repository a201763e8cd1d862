//! Anthropic Messages API client

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatModel, Message, Role};
use crate::config::ModelSettings;
use crate::credentials::Credential;
use crate::error::{AgentError, AgentResult};

const API_VERSION: &str = "2023-06-01";

/// Blocking client for one model with fixed sampling parameters
pub struct AnthropicChat {
    client: Client,
    settings: ModelSettings,
    credential: Credential,
}

impl AnthropicChat {
    pub fn new(settings: ModelSettings, credential: Credential) -> AgentResult<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            settings,
            credential,
        })
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    fn endpoint(&self) -> String {
        format!("{}/messages", self.settings.base_url.trim_end_matches('/'))
    }
}

impl ChatModel for AnthropicChat {
    fn invoke(&self, messages: &[Message], stop: &[String]) -> AgentResult<String> {
        let request = build_request(&self.settings, messages, stop);
        debug!(
            "POST {} model={} messages={}",
            self.endpoint(),
            request.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", self.credential.expose())
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AgentError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        let body: MessagesResponse = response
            .json()
            .map_err(|e| AgentError::InvalidResponse(e.to_string()))?;
        debug!("stop_reason={:?}", body.stop_reason);

        Ok(reply_text(&body))
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop_sequences: Vec<String>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// System messages are hoisted into the top-level `system` field.
fn build_request(settings: &ModelSettings, messages: &[Message], stop: &[String]) -> MessagesRequest {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();

    let wire = messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| WireMessage {
            role: if m.role == Role::Ai { "assistant" } else { "user" },
            content: m.content.clone(),
        })
        .collect();

    MessagesRequest {
        model: settings.model.clone(),
        max_tokens: settings.max_tokens,
        temperature: settings.temperature,
        system: if system.is_empty() {
            None
        } else {
            Some(system.join("\n\n"))
        },
        messages: wire,
        stop_sequences: stop.to_vec(),
    }
}

fn reply_text(response: &MessagesResponse) -> String {
    response
        .content
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            ContentBlock::Other => None,
        })
        .collect()
}

/// Prefer the API's own error message, fall back to the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}
