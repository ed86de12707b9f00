use thiserror::Error;

/// Fatal conditions that end a run.
///
/// Nothing is retried except empty or sentinel replies during generation,
/// which surface here as `GenerationExhausted` once the attempt budget is spent.
#[derive(Debug, Error)]
pub enum Error {
    #[error("GitHub token not provided as input")]
    MissingToken,

    #[error("invalid temperature {0:?}: expected a number between 0.0 and 2.0")]
    InvalidTemperature(String),

    #[error("invalid HTTP timeout {0:?}: expected a whole number of seconds")]
    InvalidTimeout(String),

    #[error("GITHUB_EVENT_PATH not found in environment variables")]
    MissingEventPayload,

    #[error("failed to read event payload {path}: {reason}")]
    InvalidEventPayload { path: String, reason: String },

    #[error("this action only runs on pull_request events (got {0:?})")]
    UnsupportedEvent(String),

    #[error("provider not found: {0}")]
    UnknownProvider(String),

    #[error("invalid provider: {0} does not serve chat completions")]
    InvalidProvider(String),

    #[error("provider {0} is registered more than once")]
    DuplicateProvider(String),

    #[error("failed to fetch branches (exit code {code:?}): {stderr}")]
    FetchFailed { code: Option<i32>, stderr: String },

    #[error("failed to get diff (exit code {code:?}): {stderr}")]
    DiffFailed { code: Option<i32>, stderr: String },

    #[error("generation backend failed on attempt {attempt}: {reason:#}")]
    GenerationFailed { attempt: usize, reason: anyhow::Error },

    #[error("failed to generate description after {attempts} attempts: {last_reason}")]
    GenerationExhausted { attempts: usize, last_reason: String },

    #[error("failed to read pull request #{pr_number}: {reason:#}")]
    PullRequestUnavailable { pr_number: u64, reason: anyhow::Error },

    #[error("failed to publish pull request description: {0:#}")]
    PublishFailed(anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
