//! Shared run entrypoint: fetch both snapshots, then reconcile.

use tether_core::{MonitorApi, RegistryApi};

use crate::{Reconciler, RunContext, RunReport, SyncError};

/// Run one reconciliation.
///
/// A failure to fetch either snapshot returns [`SyncError::Fetch`] before any
/// monitor mutation is issued. Everything after that is contained per device
/// and reported on the returned [`RunReport`].
pub fn run<R, M>(registry: &R, monitor: &M, ctx: &RunContext) -> Result<RunReport, SyncError>
where
    R: RegistryApi + ?Sized,
    M: MonitorApi + ?Sized,
{
    let registry_devices = registry.list_eligible_devices(&ctx.filter)?;
    let monitor_devices = monitor.list_devices()?;
    tracing::info!(
        registry = registry_devices.len(),
        monitor = monitor_devices.len(),
        dry_run = ctx.dry_run,
        "snapshots fetched"
    );

    Ok(Reconciler::new(monitor, ctx).reconcile(&registry_devices, monitor_devices))
}
