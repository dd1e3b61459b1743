//! Sink that stores delivered fragments on disk.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::{announced_fragment, CodeSink, Evaluation};
use crate::checksum::sha256_hex;
use crate::fragment::FragmentId;
use crate::url_model::filename_from_url_path;

const FALLBACK_NAME: &str = "fragment.cache.js";

/// One body written by a [`DirectorySink`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct DeliveredFragment {
    pub url: String,
    pub path: PathBuf,
    pub bytes: usize,
    pub sha256: String,
    pub announced: Option<FragmentId>,
}

/// Writes each body to `<out_dir>/<last URL segment>`, replacing earlier
/// attempts of the same fragment. A body that cannot be written is treated
/// as never delivered, so its load terminates.
pub struct DirectorySink {
    out_dir: PathBuf,
    delivered: Vec<DeliveredFragment>,
}

impl DirectorySink {
    pub fn new(out_dir: &Path) -> Result<Self> {
        fs::create_dir_all(out_dir)
            .with_context(|| format!("create output directory {}", out_dir.display()))?;
        Ok(Self {
            out_dir: out_dir.to_path_buf(),
            delivered: Vec::new(),
        })
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn delivered(&self) -> &[DeliveredFragment] {
        &self.delivered
    }

    /// Most recent delivery that announced `fragment`.
    pub fn delivered_for(&self, fragment: FragmentId) -> Option<&DeliveredFragment> {
        self.delivered
            .iter()
            .rev()
            .find(|d| d.announced == Some(fragment))
    }

    fn store(&mut self, url: &str, body: &[u8]) -> Result<DeliveredFragment> {
        let name = filename_from_url_path(url).unwrap_or_else(|| FALLBACK_NAME.to_string());
        let path = self.out_dir.join(name);
        fs::write(&path, body).with_context(|| format!("write {}", path.display()))?;
        Ok(DeliveredFragment {
            url: url.to_string(),
            path,
            bytes: body.len(),
            sha256: sha256_hex(body),
            announced: announced_fragment(body),
        })
    }
}

impl CodeSink for DirectorySink {
    fn evaluate(&mut self, url: &str, body: &[u8]) -> Evaluation {
        match self.store(url, body) {
            Ok(delivered) => {
                tracing::debug!(
                    url,
                    path = %delivered.path.display(),
                    bytes = delivered.bytes,
                    sha256 = %delivered.sha256,
                    "fragment stored"
                );
                let announced = delivered.announced;
                self.delivered.push(delivered);
                announced.map_or_else(Evaluation::silent, Evaluation::announced)
            }
            Err(e) => {
                tracing::warn!(url, "could not store fragment: {:#}", e);
                Evaluation::silent()
            }
        }
    }
}
