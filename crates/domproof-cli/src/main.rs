mod cli;
mod suite;

use anyhow::{Result, bail};
use clap::Parser;
use colored::Colorize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use domproof_browser::ChromiumFactory;
use domproof_core::{HarnessConfig, Outcome, Reporter, ScenarioRunner, exit_code};

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("domproof=info")),
        )
        .with_target(false)
        .init();

    let mut config = match &cli.config {
        Some(path) => HarnessConfig::load(path)?,
        None => HarnessConfig::default(),
    };
    cli.apply(&mut config);

    let Some(entry_url) = config.entry_url.clone() else {
        bail!("no entry URL: pass --entry-url or set entry_url in the config file");
    };

    let mut scenarios = suite::scenarios(&entry_url);
    if let Some(filter) = &cli.filter {
        scenarios.retain(|s| s.name.contains(filter.as_str()));
        if scenarios.is_empty() {
            bail!("no scenario name contains {filter:?}");
        }
    }

    if cli.list {
        for scenario in &scenarios {
            println!("{}", scenario.name);
        }
        return Ok(());
    }

    info!(
        scenarios = scenarios.len(),
        headless = config.headless,
        "starting verification run"
    );
    let factory = ChromiumFactory::launch(config.headless).await?;
    let reporter = Reporter::new(config.evidence_dir.clone());
    let runner = ScenarioRunner::new(factory, config.wait).with_reporter(reporter.clone());

    let results = runner.run_all(&scenarios).await;
    runner.factory().shutdown().await;

    for result in &results {
        reporter.report(result);
    }

    let passed = results.iter().filter(|r| r.outcome == Outcome::Pass).count();
    let failed = results.iter().filter(|r| r.outcome == Outcome::Fail).count();
    let errored = results.iter().filter(|r| r.outcome == Outcome::Error).count();
    let summary = format!("{passed} passed, {failed} failed, {errored} errored");
    if failed == 0 && errored == 0 {
        println!("{} {summary}", "OK".green().bold());
    } else {
        println!("{} {summary}", "NOT OK".red().bold());
    }

    std::process::exit(exit_code(&results));
}
