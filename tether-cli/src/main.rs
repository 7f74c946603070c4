//! tether: keep the monitoring system's device list in line with the registry.
//!
//! # Usage
//!
//! ```text
//! tether init [--force]
//! tether run [--config PATH] [--dry-run] [--json]
//! tether status [--json]
//! tether logs [--lines N]
//! ```
//!
//! `tether run` is a one-shot batch job meant to be invoked periodically
//! (cron, systemd timer). It exits non-zero only when the configuration is
//! unusable or a snapshot could not be fetched.

mod commands;
mod log_rotation;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{init::InitArgs, logs::LogsArgs, run::RunArgs, status::StatusArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "tether",
    version,
    about = "Reconcile monitoring devices against the source-of-truth inventory",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a configuration template to ~/.tether/config.yaml.
    Init(InitArgs),

    /// Reconcile once: link, update and create monitor devices.
    Run(RunArgs),

    /// Show the outcome of the last recorded run.
    Status(StatusArgs),

    /// Print recent log lines.
    Logs(LogsArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Run(args) => args.run(),
        Commands::Status(args) => args.run(),
        Commands::Logs(args) => args.run(),
    }
}
