//! Subcommand implementations plus the text rendering they share.

pub mod init;
pub mod logs;
pub mod run;
pub mod status;

use chrono::{DateTime, Utc};
use colored::Colorize;

use tether_sync::{Action, Anomaly, DeviceState, Failure};

pub(crate) fn describe_action(action: &Action) -> String {
    match action {
        Action::Linked {
            hostname,
            component_id: Some(id),
            label,
        } => format!("linked '{hostname}' (component {id}, label {label})"),
        Action::Linked {
            hostname, label, ..
        } => format!("link '{hostname}' with label {label}"),
        Action::Renamed { from, to } => format!("renamed '{from}' → '{to}'"),
        Action::IpOverwritten { hostname, from, to } => {
            format!("IP of '{hostname}' {from} → {to}")
        }
        Action::Created { hostname, ip } => format!("created '{hostname}' ({ip})"),
    }
}

pub(crate) fn describe_failure(failure: &Failure) -> String {
    format!(
        "{} failed for '{}': {}",
        failure.operation, failure.hostname, failure.message
    )
}

pub(crate) fn describe_anomaly(anomaly: &Anomaly) -> String {
    match anomaly {
        Anomaly::MultipleLinks {
            hostname,
            labels,
            chosen,
        } => {
            let chosen = chosen.map_or_else(|| "none".to_string(), |id| id.to_string());
            format!(
                "'{hostname}' carries {} link components [{}]; classified as {chosen}",
                labels.len(),
                labels.join(", ")
            )
        }
        Anomaly::InvalidLabel {
            hostname,
            component_id,
            label,
        } => format!("'{hostname}' component {component_id} has non-numeric label '{label}'"),
        Anomaly::DuplicateRegistryId {
            registry_id,
            kept,
            displaced,
        } => format!("registry id {registry_id} linked on both '{displaced}' and '{kept}'; using '{kept}'"),
    }
}

pub(crate) fn state_label(state: DeviceState) -> &'static str {
    match state {
        DeviceState::Synced => "SYNCED",
        DeviceState::Degraded => "DEGRADED",
        DeviceState::Unlinked => "UNLINKED",
    }
}

pub(crate) fn state_colored(state: DeviceState) -> String {
    let label = state_label(state);
    match state {
        DeviceState::Synced => label.green().bold().to_string(),
        DeviceState::Degraded => label.yellow().bold().to_string(),
        DeviceState::Unlinked => label.red().bold().to_string(),
    }
}

/// Compact age: `42s`, `5m`, `3h`, `2d`.
pub(crate) fn format_age(timestamp: DateTime<Utc>) -> String {
    let seconds = Utc::now()
        .signed_duration_since(timestamp)
        .num_seconds()
        .max(0) as u64;
    if seconds < 60 {
        return format!("{seconds}s");
    }
    if seconds < 60 * 60 {
        return format!("{}m", seconds / 60);
    }
    if seconds < 60 * 60 * 24 {
        return format!("{}h", seconds / (60 * 60));
    }
    format!("{}d", seconds / (60 * 60 * 24))
}
