//! Last-run record: the JSON summary `tether status` reads.
//!
//! Persists the [`RunReport`] of the most recent run at
//! `<home>/.tether/runs/last_run.json`. Writes use an atomic `.tmp` + rename.

use std::path::{Path, PathBuf};

use tether_core::paths;

use crate::error::{io_err, SyncError};
use crate::RunReport;

/// `~/.tether/runs/last_run.json`
pub fn record_path_at(home: &Path) -> PathBuf {
    paths::last_run_path(home)
}

/// Load the last run record, or `None` if no run has been recorded yet.
pub fn load_at(home: &Path) -> Result<Option<RunReport>, SyncError> {
    let path = record_path_at(home);
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    Ok(Some(serde_json::from_str(&contents)?))
}

/// Save `report` as the last run record.
pub fn save_at(home: &Path, report: &RunReport) -> Result<PathBuf, SyncError> {
    let path = record_path_at(home);
    let Some(dir) = path.parent() else {
        return Err(io_err(
            path,
            std::io::Error::other("invalid run record path"),
        ));
    };
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    let json = serde_json::to_string_pretty(report)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tempfile::TempDir;
    use tether_core::{Hostname, RegistryId};

    use super::*;
    use crate::{Action, ActionResult, DeviceOutcome, DeviceState, Resolution};

    fn report() -> RunReport {
        let now = Utc::now();
        RunReport {
            started_at: now,
            finished_at: now,
            dry_run: false,
            registry_devices: 1,
            monitor_devices: 0,
            devices: vec![DeviceOutcome {
                registry_id: RegistryId(10),
                name: "sw1".into(),
                resolution: Resolution::Created,
                state: DeviceState::Synced,
                actions: vec![ActionResult::Applied(Action::Created {
                    hostname: Hostname::from("sw1"),
                    ip: "10.0.0.1".into(),
                })],
                failures: vec![],
            }],
            anomalies: vec![],
            skipped: vec![],
        }
    }

    #[test]
    fn missing_record_loads_as_none() {
        let home = TempDir::new().unwrap();
        assert!(load_at(home.path()).unwrap().is_none());
    }

    #[test]
    fn saved_record_loads_back() {
        let home = TempDir::new().unwrap();
        let original = report();
        let path = save_at(home.path(), &original).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let loaded = load_at(home.path()).unwrap().expect("record present");
        assert_eq!(loaded, original);
    }

    #[test]
    fn corrupt_record_is_a_json_error() {
        let home = TempDir::new().unwrap();
        let path = record_path_at(home.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_at(home.path()), Err(SyncError::Json(_))));
    }
}
