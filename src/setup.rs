use log::debug;
use reqwest::blocking::Client;
use std::time::Duration;

use crate::config::Config;
use crate::event::TriggerContext;
use crate::github::GitHubClient;
use crate::llm::HttpBackend;
use anyhow::{Context, Result};

/// Build the one HTTP client every outbound call goes through.
///
/// `timeout` of `None` disables reqwest's default deadline, so slow model
/// backends are left to finish.
pub fn http_client(timeout: Option<Duration>) -> Result<Client> {
    debug!("HTTP timeout: {timeout:?}");

    Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .context("failed to build HTTP client")
}

/// Build the generation backend based on CLI + config.
pub fn build_backend(cfg: &Config, http: &Client) -> HttpBackend {
    debug!(
        "Using HttpBackend with default endpoint {} and model {}",
        cfg.api_base_url, cfg.generation.model
    );

    HttpBackend::new(http.clone(), cfg.api_base_url.clone(), cfg.api_key.clone())
}

/// Build the GitHub client for the repository that triggered the run.
pub fn build_gateway(cfg: &Config, ctx: &TriggerContext, http: &Client) -> GitHubClient {
    debug!("Using GitHub API at {} for {}/{}", cfg.github_api_url, ctx.owner, ctx.repo);

    GitHubClient::new(
        http.clone(),
        &cfg.github_api_url,
        &ctx.owner,
        &ctx.repo,
        &cfg.github_token,
    )
}
