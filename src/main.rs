use anyhow::Result;
use clap::Parser;

use auto_pr_description::Cli;
use auto_pr_description::config::Config;
use auto_pr_description::event::TriggerContext;
use auto_pr_description::generator::DescriptionGenerator;
use auto_pr_description::git::GitCli;
use auto_pr_description::logging::init_logger;
use auto_pr_description::merge;
use auto_pr_description::pipeline::{Orchestrator, RunOutcome};
use auto_pr_description::provider::ProviderRegistry;
use auto_pr_description::setup::{build_backend, build_gateway, http_client};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose, cli.quiet);

    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let cfg = Config::from_sources(cli)?;

    log::info!("Temperature: {}", cfg.generation.temperature);
    log::info!("Event name: {}", cfg.event_name);

    let ctx = TriggerContext::load(&cfg.event_name, cfg.event_path.as_deref())?;

    // Unknown providers fail here, before any network call.
    let registry = ProviderRegistry::builtin()?;
    registry.resolve(Some(cfg.generation.provider.as_str()))?;

    let http = http_client(cfg.http_timeout)?;
    let backend = build_backend(&cfg, &http);
    let gateway = build_gateway(&cfg, &ctx, &http);
    let vcs = GitCli;

    let generator = DescriptionGenerator::new(&backend, &registry);
    let mut orchestrator =
        Orchestrator::new(&gateway, &vcs, generator, cfg.workspace.clone()).dry_run(cfg.dry_run);

    match orchestrator.run(&ctx, &cfg.generation)? {
        RunOutcome::Skipped | RunOutcome::Updated { .. } => {}
        RunOutcome::Previewed(outcome) => {
            if outcome.must_preserve_old_as_comment {
                println!(
                    "The current body would be archived in a comment under {:?}.",
                    merge::PREVIOUS_DESCRIPTION_LABEL
                );
            }
            println!("----- PR Description Preview -----");
            println!("{}", outcome.new_body);
            println!("----------------------------------");
        }
    }

    Ok(())
}
