use crate::llm::prompts;

pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Build the prompts for a PR description. A non-blank custom prompt replaces
/// the built-in guidelines; the diff is always appended in full.
pub fn pr_description_prompt(diff: &str, custom_prompt: Option<&str>) -> PromptPair {
    let instructions = custom_prompt
        .filter(|p| !p.trim().is_empty())
        .unwrap_or(prompts::PR_DESCRIPTION);

    let user = format!(
        "{instructions}\n\n**Diff:**\n{diff}",
        instructions = instructions,
        diff = diff
    );

    PromptPair {
        system: prompts::SYSTEM_PERSONA.to_owned(),
        user,
    }
}
