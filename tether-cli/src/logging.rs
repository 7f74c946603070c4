//! Run log: rotate, then route `tracing` output to the log file.

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::log_rotation::rotate_if_needed;

/// Install the global subscriber writing to `log_path`.
///
/// Level comes from `RUST_LOG`, defaulting to `info`.
pub fn init(log_path: &Path, max_bytes: u64, backups: usize) -> Result<()> {
    if let Some(dir) = log_path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("cannot create log directory {}", dir.display()))?;
    }
    let rotated = rotate_if_needed(log_path, max_bytes, backups)
        .with_context(|| format!("log rotation failed for {}", log_path.display()))?;

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("cannot open log file {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))?;

    if rotated {
        tracing::info!(path = %log_path.display(), "log file rotated");
    }
    Ok(())
}
