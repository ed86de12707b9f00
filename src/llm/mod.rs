pub mod ollama;
pub mod openai;
pub mod prompt_builder;
mod prompts;

use crate::provider::{ProviderSelection, WireFormat};
use anyhow::Result;
use reqwest::blocking::Client;

use ollama::OllamaClient;
use openai::OpenAiClient;

/// A single chat message sent to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// One chat completion call, independent of the provider serving it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Trait for talking to a text generation backend.
pub trait CompletionBackend {
    /// Run one completion and return the raw message text.
    fn complete(&self, provider: ProviderSelection<'_>, request: &CompletionRequest)
    -> Result<String>;
}

/// Routes requests over HTTP to the provider picked by the registry.
///
/// One `reqwest` client is shared by every call, so retries reuse its
/// connection pool.
pub struct HttpBackend {
    http: Client,
    default_base_url: String,
    default_api_key: Option<String>,
}

impl HttpBackend {
    /// `Default` selections go to an OpenAI-compatible endpoint at `default_base_url`.
    pub fn new(
        http: Client,
        default_base_url: impl Into<String>,
        default_api_key: Option<String>,
    ) -> Self {
        Self {
            http,
            default_base_url: default_base_url.into(),
            default_api_key,
        }
    }
}

impl CompletionBackend for HttpBackend {
    fn complete(
        &self,
        provider: ProviderSelection<'_>,
        request: &CompletionRequest,
    ) -> Result<String> {
        match provider {
            ProviderSelection::Default => {
                log::debug!("Routing to default endpoint {}", self.default_base_url);
                OpenAiClient::new(
                    self.http.clone(),
                    self.default_api_key.clone(),
                    &self.default_base_url,
                )
                .chat(request)
            }
            ProviderSelection::Provider(info) => {
                let base_url = info.effective_base_url();
                log::debug!("Routing to provider {} at {}", info.id, base_url);
                match info.wire {
                    WireFormat::OpenAiChat => {
                        OpenAiClient::new(self.http.clone(), info.api_key(), &base_url)
                            .chat(request)
                    }
                    WireFormat::OllamaChat => {
                        OllamaClient::new(self.http.clone(), &base_url).chat(request)
                    }
                }
            }
        }
    }
}

/// Truncate long strings for debug logging.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("✅✅✅✅", 2), "✅✅...");
    }

    #[test]
    fn default_selection_uses_configured_endpoint() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-default")
            .with_status(200)
            .with_body(r####"{"choices":[{"message":{"content":"### Routed"}}]}"####)
            .expect(2)
            .create();

        let backend = HttpBackend::new(
            Client::new(),
            format!("{}/v1", server.url()),
            Some("sk-default".into()),
        );
        let request = CompletionRequest {
            model: "o1-mini".into(),
            messages: vec![ChatMessage::user("diff")],
            temperature: 0.7,
            max_tokens: 2048,
        };

        for _ in 0..2 {
            let text = backend
                .complete(ProviderSelection::Default, &request)
                .unwrap();
            assert_eq!(text, "### Routed");
        }
        mock.assert();
    }

    #[test]
    fn message_constructors_set_roles() {
        assert_eq!(ChatMessage::system("a").role, "system");
        assert_eq!(ChatMessage::user("b").role, "user");
    }
}
