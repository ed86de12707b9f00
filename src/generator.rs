use crate::error::{Error, Result};
use crate::llm::prompt_builder::pr_description_prompt;
use crate::llm::{ChatMessage, CompletionBackend, CompletionRequest, truncate};
use crate::provider::{ProviderRegistry, ProviderSelection};

/// Backend reply that means "nothing usable came back".
pub const NO_MESSAGE_SENTINEL: &str = "No message received";

pub const MAX_ATTEMPTS: usize = 10;
pub const MAX_TOKENS: u32 = 2048;

const MARKDOWN_FENCE_OPEN: &str = "```markdown";
const FENCE_CLOSE: &str = "```";

/// Everything needed to generate one description. Built once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub diff: String,
    pub temperature: f32,
    /// `None` or `"auto"` lets the backend choose.
    pub provider: Option<String>,
    pub model: String,
    pub custom_prompt: Option<String>,
}

/// Drives the bounded generate-and-retry loop.
pub struct DescriptionGenerator<'a> {
    backend: &'a dyn CompletionBackend,
    registry: &'a ProviderRegistry,
}

impl<'a> DescriptionGenerator<'a> {
    pub fn new(backend: &'a dyn CompletionBackend, registry: &'a ProviderRegistry) -> Self {
        Self { backend, registry }
    }

    /// Generate a description, retrying up to [`MAX_ATTEMPTS`] times while the
    /// backend returns nothing usable. A backend error ends the run at once.
    pub fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let provider = self.registry.resolve(request.provider.as_deref())?;
        let completion = completion_request(request);

        log::info!(
            "Sending request to {} with temperature {}",
            request.model,
            request.temperature
        );

        let mut last_reason = NO_MESSAGE_SENTINEL;
        for attempt in 1..=MAX_ATTEMPTS {
            let text = self
                .attempt(provider, &completion)
                .map_err(|e| Error::GenerationFailed { attempt, reason: e })?;

            log::info!(
                "Generated description (attempt {attempt}): {}",
                truncate(&text, 100)
            );
            if !is_retryable(&text) {
                return Ok(text);
            }

            last_reason = if text.is_empty() {
                "empty response"
            } else {
                NO_MESSAGE_SENTINEL
            };
            log::warn!("Retry {attempt}/{MAX_ATTEMPTS}: no message received");
        }

        Err(Error::GenerationExhausted {
            attempts: MAX_ATTEMPTS,
            last_reason: last_reason.to_string(),
        })
    }

    fn attempt(
        &self,
        provider: ProviderSelection<'_>,
        completion: &CompletionRequest,
    ) -> anyhow::Result<String> {
        let raw = self.backend.complete(provider, completion)?;
        let cleaned = clean_response(&raw);
        log::debug!(
            "Received response from {}. Length: {} characters",
            completion.model,
            cleaned.len()
        );
        Ok(cleaned)
    }
}

fn completion_request(request: &GenerationRequest) -> CompletionRequest {
    let prompts = pr_description_prompt(&request.diff, request.custom_prompt.as_deref());
    log::trace!("PR description prompt:\n{}", truncate(&prompts.user, 3500));

    CompletionRequest {
        model: request.model.clone(),
        messages: vec![
            ChatMessage::system(prompts.system),
            ChatMessage::user(prompts.user),
        ],
        temperature: request.temperature,
        max_tokens: MAX_TOKENS,
    }
}

/// Trim the reply and unwrap a surrounding ```` ```markdown ```` fence.
pub fn clean_response(raw: &str) -> String {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix(MARKDOWN_FENCE_OPEN) {
        text = rest.strip_suffix(FENCE_CLOSE).unwrap_or(rest);
    }
    text.trim().to_string()
}

/// True when a cleaned reply should be thrown away and the call repeated.
pub fn is_retryable(cleaned: &str) -> bool {
    cleaned == NO_MESSAGE_SENTINEL || cleaned.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::cell::RefCell;

    /// Replays scripted replies and records every call.
    struct ScriptedBackend {
        replies: RefCell<Vec<anyhow::Result<String>>>,
        fallback: String,
        calls: RefCell<Vec<CompletionRequest>>,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<anyhow::Result<String>>, fallback: &str) -> Self {
            Self {
                replies: RefCell::new(replies.into_iter().rev().collect()),
                fallback: fallback.to_string(),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn always(reply: &str) -> Self {
            Self::new(Vec::new(), reply)
        }

        fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl CompletionBackend for ScriptedBackend {
        fn complete(
            &self,
            _provider: ProviderSelection<'_>,
            request: &CompletionRequest,
        ) -> anyhow::Result<String> {
            self.calls.borrow_mut().push(request.clone());
            self.replies
                .borrow_mut()
                .pop()
                .unwrap_or_else(|| Ok(self.fallback.clone()))
        }
    }

    fn request(provider: Option<&str>) -> GenerationRequest {
        GenerationRequest {
            diff: "diff --git a/a.py b/a.py".into(),
            temperature: 0.7,
            provider: provider.map(str::to_string),
            model: "o1-mini".into(),
            custom_prompt: None,
        }
    }

    #[test]
    fn strips_markdown_fence() {
        assert_eq!(clean_response("  ```markdown\n### A\n```  "), "### A");
        assert_eq!(clean_response("```markdown\n### A"), "### A");
        assert_eq!(clean_response("```\n### A\n```"), "```\n### A\n```");
        assert_eq!(clean_response("\n plain \n"), "plain");
    }

    #[test]
    fn sentinel_and_blank_are_retryable() {
        assert!(is_retryable(NO_MESSAGE_SENTINEL));
        assert!(is_retryable(""));
        assert!(is_retryable(" \n"));
        assert!(!is_retryable("### Changes"));
    }

    #[test]
    fn always_sentinel_exhausts_after_exactly_ten_calls() {
        let backend = ScriptedBackend::always(NO_MESSAGE_SENTINEL);
        let registry = ProviderRegistry::builtin().unwrap();
        let err = DescriptionGenerator::new(&backend, &registry)
            .generate(&request(Some("auto")))
            .unwrap_err();

        assert!(matches!(err, Error::GenerationExhausted { attempts: 10, .. }));
        assert_eq!(backend.call_count(), MAX_ATTEMPTS);
    }

    #[test]
    fn stops_at_first_usable_reply() {
        for k in 1..=MAX_ATTEMPTS {
            let mut replies: Vec<anyhow::Result<String>> = (1..k)
                .map(|i| {
                    if i % 2 == 0 {
                        Ok("   ".to_string())
                    } else {
                        Ok(NO_MESSAGE_SENTINEL.to_string())
                    }
                })
                .collect();
            replies.push(Ok("```markdown\n### Fixes\n- a.py: off-by-one\n```".into()));
            let backend = ScriptedBackend::new(replies, NO_MESSAGE_SENTINEL);
            let registry = ProviderRegistry::builtin().unwrap();

            let text = DescriptionGenerator::new(&backend, &registry)
                .generate(&request(None))
                .unwrap();

            assert_eq!(text, "### Fixes\n- a.py: off-by-one");
            assert_eq!(backend.call_count(), k);
        }
    }

    #[test]
    fn backend_error_fails_on_first_call() {
        let backend = ScriptedBackend::new(
            vec![Err(anyhow!("chat completion API error: HTTP 401 - invalid api key"))],
            "### never reached",
        );
        let registry = ProviderRegistry::builtin().unwrap();

        let err = DescriptionGenerator::new(&backend, &registry)
            .generate(&request(None))
            .unwrap_err();

        match err {
            Error::GenerationFailed { attempt, reason } => {
                assert_eq!(attempt, 1);
                assert!(format!("{reason:#}").contains("HTTP 401"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(backend.call_count(), 1);
    }

    #[test]
    fn backend_error_after_empty_replies_stops_the_loop() {
        let backend = ScriptedBackend::new(
            vec![
                Ok(NO_MESSAGE_SENTINEL.into()),
                Ok("".into()),
                Err(anyhow!("HTTP 500")),
            ],
            "### never reached",
        );
        let registry = ProviderRegistry::builtin().unwrap();

        let err = DescriptionGenerator::new(&backend, &registry)
            .generate(&request(None))
            .unwrap_err();

        assert!(matches!(err, Error::GenerationFailed { attempt: 3, .. }));
        assert_eq!(backend.call_count(), 3);
    }

    #[test]
    fn exhaustion_reports_empty_reply() {
        let backend = ScriptedBackend::always("  ");
        let registry = ProviderRegistry::builtin().unwrap();

        match DescriptionGenerator::new(&backend, &registry).generate(&request(None)) {
            Err(Error::GenerationExhausted { last_reason, .. }) => {
                assert_eq!(last_reason, "empty response")
            }
            other => panic!("unexpected result {other:?}"),
        }
        assert_eq!(backend.call_count(), MAX_ATTEMPTS);
    }

    #[test]
    fn unknown_provider_fails_without_calling_backend() {
        let backend = ScriptedBackend::always("### never");
        let registry = ProviderRegistry::builtin().unwrap();

        let err = DescriptionGenerator::new(&backend, &registry)
            .generate(&request(Some("DoesNotExist")))
            .unwrap_err();

        assert!(matches!(err, Error::UnknownProvider(_)));
        assert_eq!(backend.call_count(), 0);
    }

    #[test]
    fn sends_persona_prompt_temperature_and_token_ceiling() {
        let backend = ScriptedBackend::always("### ok");
        let registry = ProviderRegistry::builtin().unwrap();
        let mut req = request(Some("g4f.Provider.Groq"));
        req.custom_prompt = Some("Be brief.".into());
        req.temperature = 1.3;

        DescriptionGenerator::new(&backend, &registry)
            .generate(&req)
            .unwrap();

        let calls = backend.calls.borrow();
        let sent = &calls[0];
        assert_eq!(sent.model, "o1-mini");
        assert_eq!(sent.max_tokens, 2048);
        assert_eq!(sent.temperature, 1.3);
        assert_eq!(sent.messages[0].role, "system");
        assert!(sent.messages[0].content.contains("pull request descriptions"));
        assert_eq!(
            sent.messages[1].content,
            "Be brief.\n\n**Diff:**\ndiff --git a/a.py b/a.py"
        );
    }
}
