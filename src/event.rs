use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

pub const PULL_REQUEST_EVENT: &str = "pull_request";

/// The pull request a run operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerContext {
    pub event_name: String,
    pub pr_number: u64,
    pub base_ref: String,
    pub head_ref: String,
    pub owner: String,
    pub repo: String,
}

#[derive(Deserialize)]
struct EventPayload {
    pull_request: PullRequestPayload,
    repository: RepositoryPayload,
}

#[derive(Deserialize)]
struct PullRequestPayload {
    number: u64,
    base: RefPayload,
    head: RefPayload,
}

#[derive(Deserialize)]
struct RefPayload {
    #[serde(rename = "ref")]
    name: String,
}

#[derive(Deserialize)]
struct RepositoryPayload {
    name: String,
    owner: OwnerPayload,
}

#[derive(Deserialize)]
struct OwnerPayload {
    login: String,
}

impl TriggerContext {
    /// Read the event payload the runner wrote to disk.
    pub fn load(event_name: &str, payload_path: Option<&Path>) -> Result<Self> {
        let path = payload_path.ok_or(Error::MissingEventPayload)?;
        let data = fs::read_to_string(path).map_err(|e| Error::InvalidEventPayload {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::parse(event_name, &data).map_err(|e| match e {
            Error::InvalidEventPayload { reason, .. } => Error::InvalidEventPayload {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    /// Build the context from raw payload JSON. Non pull request events are
    /// rejected before the payload is inspected.
    pub fn parse(event_name: &str, payload: &str) -> Result<Self> {
        if event_name != PULL_REQUEST_EVENT {
            return Err(Error::UnsupportedEvent(event_name.to_string()));
        }

        let event: EventPayload =
            serde_json::from_str(payload).map_err(|e| Error::InvalidEventPayload {
                path: "<inline>".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            event_name: event_name.to_string(),
            pr_number: event.pull_request.number,
            base_ref: event.pull_request.base.name,
            head_ref: event.pull_request.head.name,
            owner: event.repository.owner.login,
            repo: event.repository.name,
        })
    }
}
