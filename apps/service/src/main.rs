mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use siteup::{CheckAllReport, Config, ObservationStore, Runtime};
use tracing::info;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logger::init_with_level(cli.log_level());

    let config = Config::from_config(cli.config.as_deref()).context("loading configuration")?;

    if let Command::Config = cli.command {
        print!("{config}");
        return Ok(());
    }

    let runtime = Runtime::from_config(&config).await?;
    let result = execute(&runtime, cli.command).await;
    // Pending notifications are delivered even when the command failed.
    runtime.shutdown().await;
    result
}

async fn execute(runtime: &Runtime, command: Command) -> Result<()> {
    let orchestrator = &runtime.orchestrator;

    match command {
        Command::Run => {
            let scheduler = runtime.scheduler().spawn();
            info!("Scheduler started, press Ctrl-C to stop");
            tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;
            info!("Shutting down");
            scheduler.abort();
        }
        Command::Check { site_id } => {
            let outcome = orchestrator
                .check_site(site_id)
                .await
                .with_context(|| format!("checking site {site_id}"))?;
            println!("site {site_id} is {}", if outcome.up { "up" } else { "down" });
        }
        Command::CheckAll => {
            let report = orchestrator.check_all_sites().await?;
            print_report(&report);
        }
        Command::History { site_id, limit } => {
            let observations = orchestrator.store().recent(site_id, limit).await?;
            if observations.is_empty() {
                println!("no observations for site {site_id}");
            }
            for observation in observations {
                println!(
                    "{}  {}",
                    observation.checked_at.to_rfc3339(),
                    if observation.up { "up" } else { "down" }
                );
            }
        }
        Command::Config => unreachable!("handled before the runtime starts"),
    }

    Ok(())
}

fn print_report(report: &CheckAllReport) {
    println!("up: {}  down: {}  failed: {}", report.up.len(), report.down.len(), report.failed.len());
    for site_id in &report.down {
        println!("  site {site_id} is down");
    }
    for failure in &report.failed {
        println!("  site {} could not be checked: {}", failure.site_id, failure.error);
    }
}
