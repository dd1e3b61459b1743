use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::host::SignalStyle;
use crate::url_model::{ModuleLocation, DEFAULT_DEFERRED_DIRECTORY};

/// Transfer settings (optional `[fetch]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Seconds to wait for the TCP/TLS connection.
    pub connect_timeout_secs: u64,
    /// Seconds allowed for the whole fetch.
    pub timeout_secs: u64,
    /// Maximum redirects followed per fetch.
    pub max_redirections: u32,
    /// Largest fragment body accepted, in bytes (None = unlimited).
    #[serde(default)]
    pub max_body_bytes: Option<usize>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            timeout_secs: 60,
            max_redirections: 10,
            max_body_bytes: None,
        }
    }
}

fn default_directory() -> String {
    DEFAULT_DEFERRED_DIRECTORY.to_string()
}

/// Global configuration loaded from `~/.config/fragload/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FragloadConfig {
    /// Module base URL fragments are served under. Usually given on the command line.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Build (permutation) identifier of the running module.
    #[serde(default)]
    pub build_id: Option<String>,
    /// Directory under the base holding fragment artifacts.
    #[serde(default = "default_directory")]
    pub directory: String,
    /// "distinct" (load/error signals) or "ready-state" (state-change only).
    #[serde(default)]
    pub signal_style: SignalStyle,
    /// Optional transfer settings; if missing, built-in defaults are used.
    #[serde(default)]
    pub fetch: Option<FetchConfig>,
}

impl Default for FragloadConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            build_id: None,
            directory: default_directory(),
            signal_style: SignalStyle::default(),
            fetch: None,
        }
    }
}

impl FragloadConfig {
    pub fn fetch_or_default(&self) -> FetchConfig {
        self.fetch.clone().unwrap_or_default()
    }

    /// Resolves the module location, preferring explicit overrides over file values.
    pub fn module_location(
        &self,
        base_url: Option<&str>,
        build_id: Option<&str>,
    ) -> Result<ModuleLocation> {
        let base = base_url
            .or(self.base_url.as_deref())
            .ok_or_else(|| anyhow::anyhow!("no module base URL (set base_url or pass --base-url)"))?;
        let build = build_id
            .or(self.build_id.as_deref())
            .ok_or_else(|| anyhow::anyhow!("no build id (set build_id or pass --build-id)"))?;
        ModuleLocation::new(base, build)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("fragload")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FragloadConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FragloadConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: FragloadConfig = toml::from_str(&data)?;
    Ok(cfg)
}
