//! `fragload config` – show where the config lives and what it says.

use anyhow::Result;
use fragload_core::config::{self, FragloadConfig};

pub fn run_config(cfg: &FragloadConfig) -> Result<()> {
    println!("# {}", config::config_path()?.display());
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}
