//! `tether init [--force]`

use anyhow::{Context, Result};
use clap::Args;

use tether_core::config;

/// Write a commented configuration template.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let path = config::write_template(self.force).context("failed to write config template")?;
        println!("✓ Wrote config template to {}", path.display());
        println!("  Fill in the registry and monitor URLs and tokens, then run `tether run --dry-run`.");
        Ok(())
    }
}
