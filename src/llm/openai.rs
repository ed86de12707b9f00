use super::{ChatMessage, CompletionRequest};
use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

/// Minimal request/response structs for OpenAI-compatible Chat Completions APIs.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// Blocking client for any OpenAI-compatible endpoint.
pub struct OpenAiClient {
    client: Client,
    api_key: Option<String>,
    api_base_url: String,
}

impl OpenAiClient {
    pub fn new(client: Client, api_key: Option<String>, api_base_url: &str) -> Self {
        OpenAiClient {
            client,
            api_key,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.api_base_url)
    }

    pub fn chat(&self, request: &CompletionRequest) -> Result<String> {
        let req = ChatRequest {
            model: &request.model,
            messages: request.messages.iter().map(wire_message).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let url = self.chat_url();
        log::info!("Calling model {:?} at {}", request.model, url);

        let mut builder = self.client.post(&url).json(&req);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let resp = builder
            .send()
            .with_context(|| format!("failed to send request to {url}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_default();
            return Err(anyhow!(
                "chat completion API error: HTTP {} - {}",
                status.as_u16(),
                text
            ));
        }

        let chat_resp: ChatResponse = resp
            .json()
            .context("failed to parse chat completion response")?;
        let content = chat_resp
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| anyhow!("no choices returned from {url}"))?;

        if let Some(usage) = &chat_resp.usage {
            log::debug!(
                "Token usage: prompt={}, completion={}, total={}",
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens
            );
        }

        Ok(content)
    }
}

fn wire_message(m: &ChatMessage) -> WireMessage<'_> {
    WireMessage {
        role: &m.role,
        content: &m.content,
    }
}
