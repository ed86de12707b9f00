//! Pull request access over the GitHub REST API.

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Reads and writes the parts of a pull request this tool touches.
pub trait PullRequestGateway {
    /// Current body, empty when the PR has none.
    fn get_body(&self, pr_number: u64) -> Result<String>;

    fn set_body(&self, pr_number: u64, body: &str) -> Result<()>;

    fn add_comment(&self, pr_number: u64, body: &str) -> Result<()>;
}

#[derive(Deserialize)]
struct PullRequestResponse {
    body: Option<String>,
}

#[derive(Serialize)]
struct BodyPayload<'a> {
    body: &'a str,
}

/// Blocking GitHub client scoped to one repository.
pub struct GitHubClient {
    http: Client,
    api_url: String,
    owner: String,
    repo: String,
    token: String,
}

impl GitHubClient {
    /// `http` must send a `User-Agent`; GitHub rejects requests without one.
    pub fn new(http: Client, api_url: &str, owner: &str, repo: &str, token: &str) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            token: token.to_string(),
        }
    }

    fn pull_url(&self, pr_number: u64) -> String {
        format!(
            "{}/repos/{}/{}/pulls/{}",
            self.api_url, self.owner, self.repo, pr_number
        )
    }

    fn comments_url(&self, pr_number: u64) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.api_url, self.owner, self.repo, pr_number
        )
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }
}

fn check_status(resp: Response, what: &str) -> Result<Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let text = resp.text().unwrap_or_default();
    Err(anyhow!(
        "GitHub API error while {what}: HTTP {} - {}",
        status.as_u16(),
        text
    ))
}

impl PullRequestGateway for GitHubClient {
    fn get_body(&self, pr_number: u64) -> Result<String> {
        let url = self.pull_url(pr_number);
        log::debug!("Fetching PR #{pr_number} from {url}");

        let resp = self
            .authorized(self.http.get(&url))
            .send()
            .with_context(|| format!("failed to request PR #{pr_number}"))?;
        let pr: PullRequestResponse = check_status(resp, "reading the pull request")?
            .json()
            .context("failed to parse pull request response")?;

        Ok(pr.body.unwrap_or_default())
    }

    fn set_body(&self, pr_number: u64, body: &str) -> Result<()> {
        let url = self.pull_url(pr_number);
        let resp = self
            .authorized(self.http.patch(&url))
            .json(&BodyPayload { body })
            .send()
            .with_context(|| format!("failed to update PR #{pr_number} body"))?;
        check_status(resp, "updating the pull request body")?;
        Ok(())
    }

    fn add_comment(&self, pr_number: u64, body: &str) -> Result<()> {
        let url = self.comments_url(pr_number);
        let resp = self
            .authorized(self.http.post(&url))
            .json(&BodyPayload { body })
            .send()
            .with_context(|| format!("failed to comment on PR #{pr_number}"))?;
        check_status(resp, "creating a comment")?;
        Ok(())
    }
}
