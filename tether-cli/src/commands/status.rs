//! `tether status`: outcome of the last recorded run.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use tether_sync::{record, DeviceOutcome, DeviceState, Resolution, RunReport};

use super::{describe_anomaly, describe_failure, format_age, state_label};

/// Arguments for `tether status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit the stored run record as JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
        let report = record::load_at(&home).context("failed to load last run record")?;

        let Some(report) = report else {
            println!("No runs recorded yet. Run `tether run` first.");
            return Ok(());
        };

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize run record")?
            );
            return Ok(());
        }

        print_table(&report);
        Ok(())
    }
}

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "registry id")]
    registry_id: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "resolution")]
    resolution: String,
    #[tabled(rename = "state")]
    state: String,
    #[tabled(rename = "changes")]
    changes: usize,
    #[tabled(rename = "failures")]
    failures: usize,
}

impl From<&DeviceOutcome> for DeviceRow {
    fn from(outcome: &DeviceOutcome) -> Self {
        Self {
            registry_id: outcome.registry_id.to_string(),
            name: outcome.name.clone(),
            resolution: resolution_label(&outcome.resolution),
            state: state_label(outcome.state).to_string(),
            changes: outcome.actions.len(),
            failures: outcome.failures.len(),
        }
    }
}

fn print_table(report: &RunReport) {
    println!(
        "Tether v{} | last run {} ago{} | {} synced | {} degraded | {} unlinked",
        env!("CARGO_PKG_VERSION"),
        format_age(report.finished_at),
        if report.dry_run { " (dry-run)" } else { "" },
        report.count(DeviceState::Synced),
        report.count(DeviceState::Degraded),
        report.count(DeviceState::Unlinked),
    );

    if report.devices.is_empty() {
        println!("No eligible registry devices.");
    } else {
        let rows: Vec<DeviceRow> = report.devices.iter().map(DeviceRow::from).collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }

    for outcome in report.devices.iter().filter(|o| !o.failures.is_empty()) {
        for failure in &outcome.failures {
            println!("{}  {}", "✗".red(), describe_failure(failure));
        }
    }
    for anomaly in &report.anomalies {
        println!("{}  {}", "!".yellow().bold(), describe_anomaly(anomaly));
    }

    if report.count(DeviceState::Synced) < report.devices.len() {
        println!("Unresolved devices are retried on the next `tether run`.");
    }
}

fn resolution_label(resolution: &Resolution) -> String {
    match resolution {
        Resolution::AlreadyLinked { hostname } => format!("linked ({hostname})"),
        Resolution::Matched { hostname } => format!("matched ({hostname})"),
        Resolution::Created => "created".to_string(),
    }
}
