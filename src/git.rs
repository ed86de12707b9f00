use anyhow::{Context, Result};
use std::process::Command as GitCommand;

const BOT_NAME: &str = "github-actions[bot]";
const BOT_EMAIL: &str = "github-actions[bot]@users.noreply.github.com";

/// Exit code and captured streams of a finished git command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// The version control operations a run needs.
pub trait Vcs {
    /// Trust the workspace and set a commit identity. Best effort.
    fn configure_identity(&self, workspace: &str);

    fn fetch(&self, remote: &str, refs: &[&str]) -> Result<CommandOutput>;

    fn diff(&self, from: &str, to: &str) -> Result<CommandOutput>;
}

/// [`Vcs`] backed by the `git` executable.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitCli;

impl GitCli {
    /// Run a git command and capture its exit code and output.
    fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        log::debug!("Running git {}", args.join(" "));
        let output = GitCommand::new("git")
            .args(args)
            .output()
            .with_context(|| format!("failed to run git {:?}", args))?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

impl Vcs for GitCli {
    fn configure_identity(&self, workspace: &str) {
        let commands: [&[&str]; 3] = [
            &["config", "--global", "--add", "safe.directory", workspace],
            &["config", "--global", "user.name", BOT_NAME],
            &["config", "--global", "user.email", BOT_EMAIL],
        ];

        for args in commands {
            match self.run(args) {
                Ok(out) if out.success() => {}
                Ok(out) => log::warn!(
                    "git {} exited with status {:?}: {}",
                    args.join(" "),
                    out.code,
                    out.stderr.trim()
                ),
                Err(e) => log::warn!("{e:#}"),
            }
        }
    }

    fn fetch(&self, remote: &str, refs: &[&str]) -> Result<CommandOutput> {
        let mut args = vec!["fetch", remote];
        args.extend_from_slice(refs);
        self.run(&args)
    }

    fn diff(&self, from: &str, to: &str) -> Result<CommandOutput> {
        self.run(&["diff", from, to])
    }
}
