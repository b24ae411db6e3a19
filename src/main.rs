mod cli_args;
mod collector;
mod config;
mod github;
mod llm;
mod logging;
mod report;
mod setup;
mod window;

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use clap::Parser;

use crate::cli_args::Cli;
use crate::collector::collect_commits;
use crate::config::Config;
use crate::github::{GitHubClient, SourceHost};
use crate::report::Reporter;

const RULE: &str = "------------------------------------------------------------";

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    let cfg = Config::from_sources(&cli)?;
    log::debug!(
        "Scanning {} organization(s) via {}",
        cfg.organizations.len(),
        cfg.github_api_url
    );

    let github = GitHubClient::new(&cfg.github_api_url, &cfg.github_token, cfg.timeout)?;
    let generator = setup::build_text_generator(&cfg)?;

    let author = github
        .authenticated_login()
        .context("failed to resolve the login of the GitHub token owner")?;

    println!(
        "Fetching commits for user '{author}' between {} and {}",
        cfg.window.start(),
        cfg.window.end()
    );
    println!("{RULE}");

    let mut stdout = io::stdout().lock();
    let collection = collect_commits(
        &github,
        &cfg.organizations,
        &author,
        &cfg.window,
        &mut stdout,
    )?;
    for issue in &collection.issues {
        log::warn!("{issue}");
    }
    log::info!(
        "Collected {} repository group(s), skipped {} item(s)",
        collection.groups.len(),
        collection.issues.len()
    );

    let reporter = Reporter::new(generator.as_ref(), io::stderr().is_terminal());
    let reports = reporter.run(&collection.groups, &mut stdout)?;
    log::info!("Reported on {} repository group(s)", reports.len());

    Ok(())
}
