//! `fragload url` – print the URL a given attempt would request.

use anyhow::Result;
use fragload_core::config::FragloadConfig;
use fragload_core::url_model::build_url;
use fragload_core::FragmentId;

use crate::cli::ModuleArgs;

pub fn run_url(cfg: &FragloadConfig, fragment: FragmentId, serial: u64, module: &ModuleArgs) -> Result<()> {
    let location = cfg.module_location(module.base_url.as_deref(), module.build_id.as_deref())?;
    let directory = module.directory.as_deref().unwrap_or(&cfg.directory);
    println!(
        "{}",
        build_url(location.base_url(), location.build_id(), directory, fragment, serial)
    );
    Ok(())
}
