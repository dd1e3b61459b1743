//! Module base location and build identifier, validated once up front.

use anyhow::{Context, Result};

/// The two facts the embedding environment supplies about the running module:
/// where it was served from and which build (permutation) it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLocation {
    base_url: String,
    build_id: String,
}

impl ModuleLocation {
    /// Validates `base_url` as an absolute URL and normalises it to end in `/`.
    pub fn new(base_url: &str, build_id: &str) -> Result<Self> {
        let parsed = url::Url::parse(base_url)
            .with_context(|| format!("invalid module base URL: {base_url}"))?;
        if parsed.cannot_be_a_base() {
            anyhow::bail!("module base URL cannot be a base: {base_url}");
        }
        if build_id.is_empty() {
            anyhow::bail!("build id must not be empty");
        }
        if build_id.trim() != build_id {
            anyhow::bail!("build id has surrounding whitespace: {build_id:?}");
        }
        if build_id.contains(['/', '?', '#']) {
            anyhow::bail!("build id must be a single path segment: {build_id}");
        }
        let mut base_url = base_url.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(Self {
            base_url,
            build_id: build_id.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_id(&self) -> &str {
        &self.build_id
    }
}
