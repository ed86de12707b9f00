//! One run: guard, fetch, diff, generate, merge, publish.

use std::fmt;

use crate::config::GenerationSettings;
use crate::error::{Error, Result};
use crate::event::TriggerContext;
use crate::generator::{DescriptionGenerator, GenerationRequest};
use crate::git::Vcs;
use crate::github::PullRequestGateway;
use crate::merge::{self, MergeOutcome};

const REMOTE: &str = "origin";

/// Decision taken after reading the current PR body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// The body is marked done; the run ends without generating.
    Skip,
    Continue,
}

/// Where a run currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Init,
    Guarded(Guard),
    Fetching,
    Generating,
    Merging,
    Publishing,
    Done,
    /// Terminal: the stage that failed and why.
    Aborted { stage: &'static str, reason: String },
}

impl RunState {
    /// Stage name without guard or abort detail.
    pub fn name(&self) -> &'static str {
        match self {
            RunState::Init => "init",
            RunState::Guarded(_) => "guarded",
            RunState::Fetching => "fetching",
            RunState::Generating => "generating",
            RunState::Merging => "merging",
            RunState::Publishing => "publishing",
            RunState::Done => "done",
            RunState::Aborted { .. } => "aborted",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Guarded(Guard::Skip) => f.write_str("guarded(skip)"),
            RunState::Guarded(Guard::Continue) => f.write_str("guarded(continue)"),
            RunState::Aborted { stage, reason } => write!(f, "aborted during {stage}: {reason}"),
            other => f.write_str(other.name()),
        }
    }
}

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The body is marked done; nothing was generated or written.
    Skipped,
    Updated {
        new_body: String,
        archived_previous: bool,
    },
    /// Dry run: the body that would have been written.
    Previewed(MergeOutcome),
}

/// Wires the collaborators together for a single run.
pub struct Orchestrator<'a> {
    gateway: &'a dyn PullRequestGateway,
    vcs: &'a dyn Vcs,
    generator: DescriptionGenerator<'a>,
    workspace: String,
    dry_run: bool,
    state: RunState,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        gateway: &'a dyn PullRequestGateway,
        vcs: &'a dyn Vcs,
        generator: DescriptionGenerator<'a>,
        workspace: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            vcs,
            generator,
            workspace: workspace.into(),
            dry_run: false,
            state: RunState::Init,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Run every stage in order. Any error moves the run to [`RunState::Aborted`].
    pub fn run(
        &mut self,
        ctx: &TriggerContext,
        settings: &GenerationSettings,
    ) -> Result<RunOutcome> {
        let result = self.run_stages(ctx, settings);
        if let Err(e) = &result {
            log::error!("Run aborted while {}: {e}", self.state);
            self.enter(RunState::Aborted {
                stage: self.state.name(),
                reason: e.to_string(),
            });
        }
        result
    }

    fn run_stages(
        &mut self,
        ctx: &TriggerContext,
        settings: &GenerationSettings,
    ) -> Result<RunOutcome> {
        let current_body = self
            .gateway
            .get_body(ctx.pr_number)
            .map_err(|reason| Error::PullRequestUnavailable {
                pr_number: ctx.pr_number,
                reason,
            })?;

        if merge::is_marked_done(&current_body) {
            self.enter(RunState::Guarded(Guard::Skip));
            log::info!("PR description is already marked as done. Skipping update.");
            self.enter(RunState::Done);
            return Ok(RunOutcome::Skipped);
        }
        self.enter(RunState::Guarded(Guard::Continue));

        log::info!("PR number: {}", ctx.pr_number);
        log::info!("Base ref: {}", ctx.base_ref);
        log::info!("Head ref: {}", ctx.head_ref);

        self.enter(RunState::Fetching);
        let diff = self.fetch_diff(ctx)?;

        self.enter(RunState::Generating);
        let request = GenerationRequest {
            diff,
            temperature: settings.temperature,
            provider: Some(settings.provider.clone()),
            model: settings.model.clone(),
            custom_prompt: settings.custom_prompt.clone(),
        };
        let generated = self.generator.generate(&request)?;

        self.enter(RunState::Merging);
        let outcome = merge::merge(&current_body, &generated);
        log::info!(
            "Keeping this part of the description: {}",
            merge::partition_body(&current_body).human_prefix
        );

        if self.dry_run {
            self.enter(RunState::Done);
            return Ok(RunOutcome::Previewed(outcome));
        }

        self.enter(RunState::Publishing);
        self.publish(ctx.pr_number, &current_body, &outcome)?;

        self.enter(RunState::Done);
        log::info!("Successfully updated PR #{} description.", ctx.pr_number);
        Ok(RunOutcome::Updated {
            archived_previous: outcome.must_preserve_old_as_comment,
            new_body: outcome.new_body,
        })
    }

    fn fetch_diff(&self, ctx: &TriggerContext) -> Result<String> {
        self.vcs.configure_identity(&self.workspace);

        log::info!("Fetching branches: {} and {}", ctx.base_ref, ctx.head_ref);
        let fetched = self
            .vcs
            .fetch(REMOTE, &[ctx.base_ref.as_str(), ctx.head_ref.as_str()])
            .map_err(|e| Error::FetchFailed {
                code: None,
                stderr: format!("{e:#}"),
            })?;
        if !fetched.success() {
            return Err(Error::FetchFailed {
                code: fetched.code,
                stderr: fetched.stderr.trim().to_string(),
            });
        }

        let base = format!("{REMOTE}/{}", ctx.base_ref);
        let head = format!("{REMOTE}/{}", ctx.head_ref);
        log::info!("Getting diff between {base} and {head}");
        let diff = self.vcs.diff(&base, &head).map_err(|e| Error::DiffFailed {
            code: None,
            stderr: format!("{e:#}"),
        })?;
        if !diff.success() {
            log::error!("Error output: {}", diff.stderr.trim());
            return Err(Error::DiffFailed {
                code: diff.code,
                stderr: diff.stderr.trim().to_string(),
            });
        }

        log::info!("Diff length: {} characters", diff.stdout.len());
        Ok(diff.stdout)
    }

    fn publish(&self, pr_number: u64, previous: &str, outcome: &MergeOutcome) -> Result<()> {
        if outcome.must_preserve_old_as_comment {
            log::info!("Creating comment with original description...");
            self.gateway
                .add_comment(pr_number, &merge::previous_description_comment(previous))
                .map_err(Error::PublishFailed)?;
        }

        log::info!("Updating PR description...");
        self.gateway
            .set_body(pr_number, &outcome.new_body)
            .map_err(Error::PublishFailed)
    }

    fn enter(&mut self, next: RunState) {
        log::debug!("State {} -> {}", self.state, next);
        self.state = next;
    }
}
