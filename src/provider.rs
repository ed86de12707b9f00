use std::collections::HashSet;

use crate::error::{Error, Result};

/// Provider value meaning "let the backend pick".
pub const AUTO_PROVIDER: &str = "auto";

/// What a registered provider can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ChatCompletion,
    ImageGeneration,
}

/// Request/response shape spoken by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    /// OpenAI-compatible `/chat/completions`.
    OpenAiChat,
    /// Ollama `/api/chat`.
    OllamaChat,
}

/// A statically registered provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderInfo {
    pub id: &'static str,
    pub base_url: &'static str,
    /// Env var that overrides `base_url` when set.
    pub base_url_env: Option<&'static str>,
    /// Env var holding the API key, if the provider needs one.
    pub api_key_env: Option<&'static str>,
    pub wire: WireFormat,
    pub capabilities: &'static [Capability],
}

impl ProviderInfo {
    pub fn supports_chat(&self) -> bool {
        self.capabilities.contains(&Capability::ChatCompletion)
    }

    /// Base URL after applying the env override.
    pub fn effective_base_url(&self) -> String {
        self.base_url_env
            .and_then(|var| std::env::var(var).ok())
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.base_url.to_string())
    }

    pub fn api_key(&self) -> Option<String> {
        self.api_key_env
            .and_then(|var| std::env::var(var).ok())
            .filter(|v| !v.trim().is_empty())
    }
}

const CHAT: &[Capability] = &[Capability::ChatCompletion];

pub const BUILTIN_PROVIDERS: &[ProviderInfo] = &[
    ProviderInfo {
        id: "OpenAI",
        base_url: "https://api.openai.com/v1",
        base_url_env: None,
        api_key_env: Some("OPENAI_API_KEY"),
        wire: WireFormat::OpenAiChat,
        capabilities: CHAT,
    },
    ProviderInfo {
        id: "Groq",
        base_url: "https://api.groq.com/openai/v1",
        base_url_env: None,
        api_key_env: Some("GROQ_API_KEY"),
        wire: WireFormat::OpenAiChat,
        capabilities: CHAT,
    },
    ProviderInfo {
        id: "DeepInfra",
        base_url: "https://api.deepinfra.com/v1/openai",
        base_url_env: None,
        api_key_env: Some("DEEPINFRA_API_KEY"),
        wire: WireFormat::OpenAiChat,
        capabilities: CHAT,
    },
    ProviderInfo {
        id: "OpenRouter",
        base_url: "https://openrouter.ai/api/v1",
        base_url_env: None,
        api_key_env: Some("OPENROUTER_API_KEY"),
        wire: WireFormat::OpenAiChat,
        capabilities: CHAT,
    },
    ProviderInfo {
        id: "Mistral",
        base_url: "https://api.mistral.ai/v1",
        base_url_env: None,
        api_key_env: Some("MISTRAL_API_KEY"),
        wire: WireFormat::OpenAiChat,
        capabilities: CHAT,
    },
    ProviderInfo {
        id: "PollinationsAI",
        base_url: "https://text.pollinations.ai/openai",
        base_url_env: None,
        api_key_env: None,
        wire: WireFormat::OpenAiChat,
        capabilities: CHAT,
    },
    ProviderInfo {
        id: "Ollama",
        base_url: "http://localhost:11434",
        base_url_env: Some("OLLAMA_HOST"),
        api_key_env: None,
        wire: WireFormat::OllamaChat,
        capabilities: CHAT,
    },
    ProviderInfo {
        id: "DallE",
        base_url: "https://api.openai.com/v1",
        base_url_env: None,
        api_key_env: Some("OPENAI_API_KEY"),
        wire: WireFormat::OpenAiChat,
        capabilities: &[Capability::ImageGeneration],
    },
];

/// Outcome of resolving a requested provider name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderSelection<'a> {
    /// No provider requested; the backend uses its own routing.
    Default,
    Provider(&'a ProviderInfo),
}

/// Explicit map from provider id to capability record.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: Vec<ProviderInfo>,
}

impl ProviderRegistry {
    /// Build a registry, rejecting duplicate ids.
    pub fn new(providers: Vec<ProviderInfo>) -> Result<Self> {
        let mut seen = HashSet::new();
        for p in &providers {
            if !seen.insert(p.id) {
                return Err(Error::DuplicateProvider(p.id.to_string()));
            }
        }
        Ok(Self { providers })
    }

    pub fn builtin() -> Result<Self> {
        Self::new(BUILTIN_PROVIDERS.to_vec())
    }

    /// Resolve a provider name. `"auto"` or blank means [`ProviderSelection::Default`];
    /// dotted names such as `g4f.Provider.Groq` are looked up by their last segment.
    pub fn resolve(&self, requested: Option<&str>) -> Result<ProviderSelection<'_>> {
        let name = match requested.map(str::trim) {
            None => return Ok(ProviderSelection::Default),
            Some(n) if n.is_empty() || n == AUTO_PROVIDER => {
                return Ok(ProviderSelection::Default);
            }
            Some(n) => n,
        };

        let id = name.rsplit('.').next().unwrap_or(name);
        let info = self
            .providers
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::UnknownProvider(name.to_string()))?;

        if !info.supports_chat() {
            return Err(Error::InvalidProvider(name.to_string()));
        }

        log::debug!("Resolved provider {name:?} to {}", info.id);
        Ok(ProviderSelection::Provider(info))
    }
}
