use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// CLI options. Every option can also come from the environment the GitHub
/// Actions runner sets up, so the binary normally runs without arguments.
#[derive(Parser, Debug, Default)]
#[command(
    name = "auto-pr-description",
    version,
    about = "Generate and maintain pull request descriptions from the branch diff"
)]
pub struct Cli {
    /// GitHub token used to read and update the pull request
    #[arg(long, env = "INPUT_GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Sampling temperature between 0.0 and 2.0 [default: 0.7]
    #[arg(long, env = "INPUT_TEMPERATURE")]
    pub temperature: Option<String>,

    /// Provider name, e.g. Groq or g4f.Provider.Groq; 'auto' uses the default endpoint
    #[arg(long, env = "INPUT_PROVIDER")]
    pub provider: Option<String>,

    /// Model name to request [default: o1-mini]
    #[arg(long, env = "INPUT_MODEL")]
    pub model: Option<String>,

    /// Custom instructions that replace the built-in prompt
    #[arg(long, env = "INPUT_PROMPT")]
    pub prompt: Option<String>,

    /// Name of the event that triggered the run
    #[arg(long, env = "GITHUB_EVENT_NAME")]
    pub event_name: Option<String>,

    /// Path to the JSON event payload
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: Option<PathBuf>,

    /// GitHub REST API base URL (for GitHub Enterprise)
    #[arg(long, env = "GITHUB_API_URL")]
    pub github_api_url: Option<String>,

    /// Checkout directory to mark as a git safe.directory
    #[arg(long, env = "GITHUB_WORKSPACE")]
    pub workspace: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint used when provider is 'auto'
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub api_base_url: Option<String>,

    /// API key for the default endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Per-request HTTP timeout in seconds; unset or 0 means no deadline
    #[arg(long, env = "INPUT_HTTP_TIMEOUT")]
    pub http_timeout: Option<String>,

    /// Generate and print the new description without touching the pull request
    #[arg(long)]
    pub dry_run: bool,

    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}
