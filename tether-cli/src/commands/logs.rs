//! `tether logs [--lines N]`

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use tether_core::{config, paths};

/// Arguments for `tether logs`.
#[derive(Args, Debug)]
pub struct LogsArgs {
    /// Number of trailing lines to print.
    #[arg(long, short = 'n', default_value_t = 100)]
    pub lines: usize,

    /// Config file whose `log.path` should be read.
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl LogsArgs {
    pub fn run(self) -> Result<()> {
        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
        let loaded = match &self.config {
            Some(path) => config::load_from(path),
            None => config::load_at(&home),
        };

        // An unusable config still leaves the default log location readable.
        let log_path = match loaded {
            Ok(cfg) => cfg.log.path_at(&home),
            Err(_) => paths::log_path(&home),
        };
        print_tail(&log_path, self.lines).context("failed to read run log")
    }
}

fn print_tail(path: &Path, lines: usize) -> Result<()> {
    if !path.exists() {
        println!("log file not found: {}", path.display());
        return Ok(());
    }

    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut tail = VecDeque::<String>::new();
    for line in reader.lines() {
        let line = line.with_context(|| format!("read {}", path.display()))?;
        if lines == 0 {
            continue;
        }
        if tail.len() == lines {
            tail.pop_front();
        }
        tail.push_back(line);
    }

    println!("==> {} <==", path.display());
    for line in tail {
        println!("{line}");
    }
    Ok(())
}
