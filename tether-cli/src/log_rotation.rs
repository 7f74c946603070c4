//! Size-based rotation for the run log.
//!
//! Checked once when a run starts. With `backups = 2`:
//!   tether.log → tether.log.1 → tether.log.2 (dropped on the next rotation)
//! With `backups = 0` the live file is simply truncated.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Rotate `log_path` if its size has reached `max_bytes`.
///
/// Returns `true` if rotation occurred, `false` if the file was under the
/// threshold or did not exist yet.
///
/// # Errors
/// Returns `io::Error` only on unexpected filesystem failures; missing files
/// are silently skipped.
pub fn rotate_if_needed(log_path: &Path, max_bytes: u64, backups: usize) -> io::Result<bool> {
    let size = match fs::metadata(log_path) {
        Ok(meta) => meta.len(),
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };

    if size < max_bytes {
        return Ok(false);
    }

    if backups > 0 {
        let oldest = numbered_path(log_path, backups);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        for n in (1..backups).rev() {
            let src = numbered_path(log_path, n);
            if src.exists() {
                fs::rename(&src, numbered_path(log_path, n + 1))?;
            }
        }

        fs::rename(log_path, numbered_path(log_path, 1))?;
    }

    // Fresh empty live file.
    fs::OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(log_path)?;

    Ok(true)
}

/// `tether.log` → `tether.log.<n>`.
fn numbered_path(base: &Path, n: usize) -> PathBuf {
    let name = base
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("tether.log");
    base.with_file_name(format!("{name}.{n}"))
}

// ─── Tests ────────────────────────────────────────────────────────────────────
