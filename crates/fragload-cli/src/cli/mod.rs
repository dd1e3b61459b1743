//! CLI for fragload.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use fragload_core::config;
use fragload_core::FragmentId;
use std::path::PathBuf;

use commands::{run_config, run_fetch, run_url, FetchRequest};

/// Top-level CLI for fragload.
#[derive(Debug, Parser)]
#[command(name = "fragload")]
#[command(about = "fragload: fetch split code fragments on demand", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Where the module is served from. Flags override config.toml.
#[derive(Debug, Clone, Default, Args)]
pub struct ModuleArgs {
    /// Module base URL (e.g. https://cdn.example.com/app/).
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,
    /// Build identifier of the module.
    #[arg(long, value_name = "ID")]
    pub build_id: Option<String>,
    /// Fragment directory under the base (default "deferredjs/").
    #[arg(long, value_name = "DIR")]
    pub directory: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Load one or more fragments over HTTP.
    Fetch {
        /// Fragment ids to load.
        #[arg(required = true, value_name = "FRAGMENT")]
        fragments: Vec<FragmentId>,
        #[command(flatten)]
        module: ModuleArgs,
        /// Directory delivered fragments are written to.
        #[arg(long, default_value = ".", value_name = "DIR")]
        out: PathBuf,
        /// Total tries per fragment; each retry gets a fresh cache-busting URL.
        #[arg(long, default_value = "1", value_name = "N")]
        attempts: u32,
        /// Print the per-fragment report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the URL requested for a fragment.
    Url {
        /// Fragment id.
        fragment: FragmentId,
        /// Attempt serial (0 = first attempt, no query string).
        #[arg(long, default_value = "0", value_name = "N")]
        serial: u64,
        #[command(flatten)]
        module: ModuleArgs,
    },

    /// Show the config file path and effective configuration.
    Config,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Fetch {
                fragments,
                module,
                out,
                attempts,
                json,
            } => run_fetch(
                &cfg,
                FetchRequest {
                    fragments,
                    module,
                    out,
                    attempts,
                    json,
                },
            )?,
            CliCommand::Url {
                fragment,
                serial,
                module,
            } => run_url(&cfg, fragment, serial, &module)?,
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
