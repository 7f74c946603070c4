//! `tether run`: one reconciliation pass.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use tether_client::{build_agent, LibreNmsClient, NetBoxClient};
use tether_core::{config, paths};
use tether_sync::{pipeline, record, DeviceState, RunContext, RunReport};

use super::{describe_action, describe_anomaly, describe_failure, state_colored};

/// Arguments for `tether run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Config file to use instead of ~/.tether/config.yaml.
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Compute and print the changes without calling any monitor mutation.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
        let (config_path, loaded) = match &self.config {
            Some(path) => (path.clone(), config::load_from(path)),
            None => (paths::config_path(&home), config::load_at(&home)),
        };
        let cfg = loaded.context("failed to load configuration")?;

        crate::logging::init(&cfg.log.path_at(&home), cfg.log.max_bytes, cfg.log.backups)?;

        let ctx = RunContext::new(cfg.registry_filter(), cfg.device_defaults(), self.dry_run);
        tracing::info!(
            config = %config_path.display(),
            registry = %cfg.registry.url,
            monitor = %cfg.monitor.url,
            dry_run = self.dry_run,
            "run started"
        );

        let agent = build_agent(Duration::from_secs(cfg.http.timeout_secs));
        let registry = NetBoxClient::new(
            agent.clone(),
            &cfg.registry.url,
            cfg.registry.token.as_deref().unwrap_or_default(),
        );
        let monitor = LibreNmsClient::new(
            agent,
            &cfg.monitor.url,
            cfg.monitor.token.as_deref().unwrap_or_default(),
            &cfg.monitor.component_type,
        );

        let report = match pipeline::run(&registry, &monitor, &ctx) {
            Ok(report) => report,
            Err(err) => {
                tracing::error!(error = %err, "run aborted");
                return Err(err).context("run aborted before any device was reconciled");
            }
        };

        tracing::info!(
            devices = report.devices.len(),
            synced = report.count(DeviceState::Synced),
            degraded = report.count(DeviceState::Degraded),
            unlinked = report.count(DeviceState::Unlinked),
            mutations = report.mutation_count(),
            failures = report.failure_count(),
            anomalies = report.anomalies.len(),
            "run finished"
        );

        if !self.dry_run {
            let path = record::save_at(&home, &report).context("failed to save run record")?;
            tracing::debug!(path = %path.display(), "run record saved");
        }

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize run report")?
            );
        } else {
            print_summary(&report);
        }
        Ok(())
    }
}

fn print_summary(report: &RunReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    println!(
        "{prefix}✓ {} registry devices against {} monitor devices",
        report.registry_devices, report.monitor_devices
    );

    for outcome in &report.devices {
        if outcome.actions.is_empty() && outcome.failures.is_empty() {
            continue;
        }
        println!(
            "{} {} ({})",
            state_colored(outcome.state),
            outcome.name,
            outcome.registry_id
        );
        for action in &outcome.actions {
            let marker = if report.dry_run { "~" } else { "✎" };
            println!("  {marker}  {}", describe_action(action.action()));
        }
        for failure in &outcome.failures {
            println!("  {}  {}", "✗".red(), describe_failure(failure));
        }
    }

    for anomaly in &report.anomalies {
        println!("{}  {}", "!".yellow().bold(), describe_anomaly(anomaly));
    }
    for skipped in &report.skipped {
        println!("{}  skipped: {}", "!".yellow().bold(), describe_failure(skipped));
    }

    println!(
        "{prefix}{} synced | {} degraded | {} unlinked | {} changes | {} failures",
        report.count(DeviceState::Synced),
        report.count(DeviceState::Degraded),
        report.count(DeviceState::Unlinked),
        report.mutation_count(),
        report.failure_count(),
    );
}
