//! HTTP adapters for an OpenAI-style chat endpoint: the model client the loop
//! drives, and the catalog source the availability cache refreshes from.

use std::future::Future;
use std::pin::Pin;

use anyhow::Context;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::agent::message::{AiMessage, Conversation, Message, ToolCallRequest};
use crate::agent::run::ModelClient;
use crate::agent::tools::{ToolSet, ToolSpec};
use crate::catalog::CatalogSource;
use crate::config::Config;

/// Config for a chat-completions endpoint, e.g. `https://host/v1`.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    /// Low temperature keeps tool-call arguments stable.
    pub temperature: f32,
}

impl From<&Config> for ChatConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            base_url: cfg.base_url.clone(),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            temperature: 0.3,
        }
    }
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: ToolSpec,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    temperature: f32,
}

#[derive(Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Deserialize)]
struct WireToolCall {
    function: WireFunctionCall,
}

#[derive(Deserialize)]
struct WireAssistant {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Deserialize)]
struct Choice {
    message: WireAssistant,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

fn to_wire_messages(conversation: &Conversation) -> Vec<WireMessage> {
    conversation
        .messages()
        .iter()
        .map(|msg| match msg {
            Message::System(content) => WireMessage {
                role: "system",
                content: content.clone(),
            },
            Message::Human(content) => WireMessage {
                role: "user",
                content: content.clone(),
            },
            Message::Ai(ai) => WireMessage {
                role: "assistant",
                content: ai.content.clone(),
            },
            // Results are folded back as user turns; the endpoint's `tool`
            // role needs call ids this loop does not track.
            Message::ToolResult(result) => WireMessage {
                role: "user",
                content: format!("Tool result ({}): {}", result.name, result.content),
            },
        })
        .collect()
}

fn to_wire_tools(tools: &ToolSet) -> Vec<WireTool> {
    tools
        .specs()
        .into_iter()
        .map(|spec| WireTool {
            kind: "function",
            function: spec,
        })
        .collect()
}

fn from_wire_assistant(assistant: WireAssistant) -> AiMessage {
    AiMessage {
        content: assistant.content.unwrap_or_default(),
        tool_calls: assistant
            .tool_calls
            .into_iter()
            .map(|call| ToolCallRequest {
                name: call.function.name,
                // Kept raw; the argument normalizer resolves it at execution.
                arguments: serde_json::Value::String(call.function.arguments),
            })
            .collect(),
    }
}

/// Model boundary over `POST {base_url}/chat/completions`.
pub struct ChatModelClient {
    cfg: ChatConfig,
    client: Client,
}

impl ChatModelClient {
    pub fn new(cfg: ChatConfig) -> Self {
        Self {
            cfg,
            client: Client::new(),
        }
    }

    async fn complete(
        &self,
        conversation: &Conversation,
        tools: &ToolSet,
    ) -> anyhow::Result<AiMessage> {
        let request = ChatRequest {
            model: self.cfg.model.clone(),
            messages: to_wire_messages(conversation),
            tools: to_wire_tools(tools),
            temperature: self.cfg.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.cfg.base_url))
            .bearer_auth(&self.cfg.api_key)
            .json(&request)
            .send()
            .await
            .context("chat request failed")?
            .error_for_status()
            .context("chat non-2xx response")?
            .json::<ChatResponse>()
            .await
            .context("chat response decode failed")?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .context("chat response carried no choices")?;
        Ok(from_wire_assistant(choice.message))
    }
}

impl ModelClient for ChatModelClient {
    fn invoke<'a>(
        &'a self,
        conversation: &'a Conversation,
        tools: &'a ToolSet,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<AiMessage>> + Send + 'a>> {
        Box::pin(self.complete(conversation, tools))
    }
}

#[derive(Deserialize)]
struct CatalogModel {
    id: String,
}

#[derive(Deserialize)]
struct CatalogResponse {
    #[serde(default)]
    data: Vec<CatalogModel>,
}

/// Catalog lookup over `GET {base_url}/models`, filtered to chat models.
pub struct HttpCatalogSource {
    base_url: String,
    api_key: String,
    client: Client,
}

impl HttpCatalogSource {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client: Client::new(),
        }
    }

    async fn fetch_models(&self) -> anyhow::Result<Vec<String>> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .query(&[("type", "text"), ("sub_type", "chat")])
            .bearer_auth(&self.api_key)
            .send()
            .await
            .context("catalog request failed")?
            .error_for_status()
            .context("catalog non-2xx response")?
            .json::<CatalogResponse>()
            .await
            .context("catalog response decode failed")?;

        Ok(response.data.into_iter().map(|m| m.id).collect())
    }
}

impl CatalogSource for HttpCatalogSource {
    fn fetch<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<String>>> + Send + 'a>> {
        Box::pin(self.fetch_models())
    }
}
