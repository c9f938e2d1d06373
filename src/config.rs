//! Resolver configuration loader.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use url::Url;

use crate::error::PrecacheError;
use crate::resolver::parse_base;

/// File name searched for by [`ResolverConfig::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "precache.config.json";

/// Discoverable configuration describing where manifests live and how to resolve them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverConfig {
    /// Absolute URL relative manifest entries are resolved against.
    pub base_url: String,
    /// Path to the precache manifest, relative to the config directory.
    pub manifest_path: String,
    /// Optional path the resolved entries are written to instead of stdout.
    pub output_path: Option<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost/".into(),
            manifest_path: "precache-manifest.json".into(),
            output_path: None,
        }
    }
}

impl ResolverConfig {
    /// Attempt to load configuration from the provided directory.
    ///
    /// Missing or malformed files fall back to the defaults.
    pub fn discover(dir: &Path) -> Self {
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        Self::from_path(&candidate).unwrap_or_default()
    }

    /// Read configuration from a specific JSON file.
    pub fn from_path(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Parsed resolution base.
    pub fn base(&self) -> Result<Url, PrecacheError> {
        parse_base(&self.base_url)
    }

    /// Manifest location relative to `dir`.
    pub fn manifest_file(&self, dir: &Path) -> PathBuf {
        dir.join(&self.manifest_path)
    }

    /// Output location relative to `dir`, when one is configured.
    pub fn output_file(&self, dir: &Path) -> Option<PathBuf> {
        self.output_path.as_ref().map(|path| dir.join(path))
    }
}
