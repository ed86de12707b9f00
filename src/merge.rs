//! Text operations on the pull request body.
//!
//! Everything here is pure: plain text in, structured result out. The body is
//! split at [`AUTO_GENERATED_MARKER`] into the human-authored part that must
//! survive every update and the generated part that is replaced on each run.

/// Attribution line separating human-written text from generated text.
pub const AUTO_GENERATED_MARKER: &str = "> Automatically generated by [auto-pr-description](https://github.com/Marty-Byrde/auto-pr-description-g4f-action)";

/// Label placed above the archived copy of a replaced body.
pub const PREVIOUS_DESCRIPTION_LABEL: &str = "**Previous description**:";

const DONE_PHRASE: &str = "description done";
const DONE_GLYPH: &str = "✅";

/// A PR body split at the attribution marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyParts<'a> {
    /// Text before the marker, trimmed. The whole body when there is no marker.
    pub human_prefix: &'a str,
    /// Text after the marker, untouched. Empty when there is no marker.
    pub generated_suffix: &'a str,
}

/// Result of merging a freshly generated description into the current body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub new_body: String,
    /// The previous body cannot be recovered from `new_body` and has to be
    /// archived as a comment before it is overwritten.
    pub must_preserve_old_as_comment: bool,
}

/// True when the body asks us to leave it alone: it mentions
/// "description done" and carries a checkmark, in any letter case.
pub fn is_marked_done(body: &str) -> bool {
    let lower = body.to_lowercase();
    lower.contains(DONE_PHRASE) && lower.contains(DONE_GLYPH)
}

/// Split the body at the first attribution marker.
pub fn partition_body(body: &str) -> BodyParts<'_> {
    match body.split_once(AUTO_GENERATED_MARKER) {
        Some((before, after)) => BodyParts {
            human_prefix: before.trim(),
            generated_suffix: after,
        },
        None => BodyParts {
            human_prefix: body.trim(),
            generated_suffix: "",
        },
    }
}

/// Combine the human prefix of `current_body` with `generated`.
pub fn merge(current_body: &str, generated: &str) -> MergeOutcome {
    let parts = partition_body(current_body);
    let new_body = format!(
        "{prefix}\n\n{marker}\n\n{generated}",
        prefix = parts.human_prefix,
        marker = AUTO_GENERATED_MARKER,
    );

    let previous = current_body.trim();
    let must_preserve_old_as_comment = !previous.is_empty() && !new_body.contains(previous);

    MergeOutcome {
        new_body,
        must_preserve_old_as_comment,
    }
}

/// Comment text archiving a body that is about to be replaced.
pub fn previous_description_comment(previous_body: &str) -> String {
    format!("{PREVIOUS_DESCRIPTION_LABEL}\n\n{previous_body}")
}
