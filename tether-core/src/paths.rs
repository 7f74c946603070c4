use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.yaml";
pub const LOG_FILE: &str = "tether.log";
pub const LAST_RUN_FILE: &str = "last_run.json";

pub fn tether_root(home: &Path) -> PathBuf {
    home.join(".tether")
}

pub fn config_path(home: &Path) -> PathBuf {
    tether_root(home).join(CONFIG_FILE)
}

pub fn logs_dir(home: &Path) -> PathBuf {
    tether_root(home).join("logs")
}

pub fn log_path(home: &Path) -> PathBuf {
    logs_dir(home).join(LOG_FILE)
}

pub fn runs_dir(home: &Path) -> PathBuf {
    tether_root(home).join("runs")
}

pub fn last_run_path(home: &Path) -> PathBuf {
    runs_dir(home).join(LAST_RUN_FILE)
}
