//! Reading precache manifests from disk.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use crate::entry::ManifestEntry;

const ENTRIES_FIELD: &str = "entries";

/// Load a precache manifest from disk.
///
/// The file holds either a JSON array of entries or an object with an `entries` array.
pub fn load_manifest(path: &Path) -> Result<Vec<ManifestEntry>> {
  let content = fs::read_to_string(path)
    .with_context(|| format!("manifest not found at {}", path.display()))?;
  parse_manifest(&content)
    .with_context(|| format!("failed to parse precache manifest {}", path.display()))
}

/// Parse manifest JSON held in memory.
///
/// Each element is validated on its own so a rejected entry is reported with its index and
/// the offending value.
pub fn parse_manifest(content: &str) -> Result<Vec<ManifestEntry>> {
  let document: Value = serde_json::from_str(content).context("manifest is not valid JSON")?;
  let items = match &document {
    Value::Array(items) => items,
    Value::Object(fields) => match fields.get(ENTRIES_FIELD) {
      Some(Value::Array(items)) => items,
      _ => return Err(anyhow!("manifest object must hold an `entries` array")),
    },
    _ => return Err(anyhow!("manifest must be an array of entries")),
  };

  items
    .iter()
    .enumerate()
    .map(|(index, item)| {
      ManifestEntry::from_value(item)
        .with_context(|| format!("invalid manifest entry at index {index}"))
    })
    .collect()
}
