use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use logger::LevelFilter;
use siteup::SiteId;

/// Site reachability monitor.
#[derive(Debug, Parser)]
#[command(name = "siteup", version, about)]
pub struct Cli {
    /// Config file, defaults to $SITEUP_CONFIG or ~/.config/siteup/config.toml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check all sites on the configured interval until interrupted
    Run,
    /// Check one site now
    Check { site_id: SiteId },
    /// Check every configured site once
    CheckAll,
    /// Show recent observations of a site
    History {
        site_id: SiteId,
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Print the effective configuration
    Config,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}
