//! Manifest entry shapes accepted by the resolver and the identifiers it produces.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::PrecacheError;

const URL_FIELD: &str = "url";
const REVISION_FIELD: &str = "revision";
const INTEGRITY_FIELD: &str = "integrity";

/// A single descriptor naming a resource to precache.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ManifestEntry {
  /// Bare reference that already carries its version, e.g. `/app.abcd1234.js`.
  Versioned(String),
  /// Structured descriptor with an optional revision token.
  Descriptor(EntryDescriptor),
}

/// Structured manifest entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntryDescriptor {
  /// Resource locator, absolute or relative.
  pub url: String,
  /// Opaque version token combined with `url` to build the cache key.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub revision: Option<String>,
  /// Fields consumed by other collaborators (integrity, fetch options).
  #[serde(flatten)]
  pub extra: BTreeMap<String, Value>,
}

/// Canonical identifiers derived from a manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedEntry {
  /// Absolute locator to fetch.
  pub url: String,
  /// Absolute identifier the response is stored under.
  pub cache_key: String,
}

impl ManifestEntry {
  /// Entry for a url that is already self-versioning.
  pub fn versioned(url: impl Into<String>) -> Self {
    Self::Versioned(url.into())
  }

  /// Entry pairing a stable url with a revision token.
  pub fn revisioned(url: impl Into<String>, revision: impl Into<String>) -> Self {
    Self::Descriptor(EntryDescriptor {
      url: url.into(),
      revision: Some(revision.into()),
      extra: BTreeMap::new(),
    })
  }

  /// Validate a raw JSON value and discriminate between the two entry shapes.
  ///
  /// Strings become [`ManifestEntry::Versioned`]; objects with a non-empty string `url` become
  /// [`ManifestEntry::Descriptor`]. Anything else, including an empty string, is rejected with
  /// [`PrecacheError::InvalidEntry`].
  pub fn from_value(value: &Value) -> Result<Self, PrecacheError> {
    match value {
      Value::String(url) if !url.is_empty() => Ok(Self::Versioned(url.clone())),
      Value::Object(fields) => EntryDescriptor::from_fields(fields)
        .map(Self::Descriptor)
        .ok_or_else(|| PrecacheError::invalid_entry(value)),
      _ => Err(PrecacheError::invalid_entry(value)),
    }
  }

  /// The url as authored in the manifest.
  pub fn url(&self) -> &str {
    match self {
      Self::Versioned(url) => url,
      Self::Descriptor(descriptor) => &descriptor.url,
    }
  }

  /// Revision token, if one was supplied and is non-empty.
  pub fn revision(&self) -> Option<&str> {
    match self {
      Self::Versioned(_) => None,
      Self::Descriptor(descriptor) => descriptor.revision.as_deref().filter(|rev| !rev.is_empty()),
    }
  }

  /// Subresource integrity metadata carried alongside a descriptor.
  pub fn integrity(&self) -> Option<&str> {
    match self {
      Self::Versioned(_) => None,
      Self::Descriptor(descriptor) => descriptor
        .extra
        .get(INTEGRITY_FIELD)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty()),
    }
  }

  pub(crate) fn to_value(&self) -> Value {
    serde_json::to_value(self).unwrap_or(Value::Null)
  }
}

impl EntryDescriptor {
  fn from_fields(fields: &Map<String, Value>) -> Option<Self> {
    let url = match fields.get(URL_FIELD) {
      Some(Value::String(url)) if !url.is_empty() => url.clone(),
      _ => return None,
    };

    // Zero counts as no revision; other non-string revisions besides numbers are rejected.
    let revision = match fields.get(REVISION_FIELD) {
      None | Some(Value::Null) => None,
      Some(Value::String(revision)) => (!revision.is_empty()).then(|| revision.clone()),
      Some(Value::Number(number)) => number_revision(number),
      Some(_) => return None,
    };

    let extra = fields
      .iter()
      .filter(|(key, _)| key.as_str() != URL_FIELD && key.as_str() != REVISION_FIELD)
      .map(|(key, value)| (key.clone(), value.clone()))
      .collect();

    Some(Self {
      url,
      revision,
      extra,
    })
  }
}

/// Render a numeric revision the way a string conversion would, so `3.0` becomes `"3"`.
fn number_revision(number: &Number) -> Option<String> {
  if number.is_i64() || number.is_u64() {
    return (number.as_f64() != Some(0.0)).then(|| number.to_string());
  }

  let value = number.as_f64()?;
  if value == 0.0 {
    None
  } else if value.fract() == 0.0 && value.abs() < 1e21 {
    Some(format!("{value:.0}"))
  } else {
    Some(value.to_string())
  }
}

impl<'de> Deserialize<'de> for ManifestEntry {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let value = Value::deserialize(deserializer)?;
    Self::from_value(&value).map_err(serde::de::Error::custom)
  }
}

impl From<&str> for ManifestEntry {
  fn from(url: &str) -> Self {
    Self::versioned(url)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn strings_become_versioned_entries() {
    let entry = ManifestEntry::from_value(&json!("/app.abcd1234.js")).unwrap();
    assert_eq!(entry, ManifestEntry::versioned("/app.abcd1234.js"));
    assert_eq!(entry.revision(), None);
  }

  #[test]
  fn objects_keep_extra_fields() {
    let entry = ManifestEntry::from_value(&json!({
      "url": "/index.html",
      "revision": "v3",
      "integrity": "sha256-abc",
    }))
    .unwrap();

    assert_eq!(entry.url(), "/index.html");
    assert_eq!(entry.revision(), Some("v3"));
    assert_eq!(entry.integrity(), Some("sha256-abc"));
  }

  #[test]
  fn rejects_unusable_shapes() {
    for value in [
      json!(null),
      json!(42),
      json!(true),
      json!([]),
      json!(""),
      json!({}),
      json!({ "revision": "x" }),
      json!({ "url": "" }),
      json!({ "url": 7 }),
      json!({ "url": "/a.js", "revision": ["v1"] }),
    ] {
      let err = ManifestEntry::from_value(&value).unwrap_err();
      assert!(err.is_invalid_entry(), "expected rejection for {value}");
    }
  }

  #[test]
  fn invalid_entry_carries_offending_value() {
    let err = ManifestEntry::from_value(&json!({ "revision": "x" })).unwrap_err();
    match err {
      PrecacheError::InvalidEntry { entry } => assert_eq!(entry, json!({ "revision": "x" })),
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn empty_and_null_revisions_mean_unrevisioned() {
    let empty = ManifestEntry::from_value(&json!({ "url": "/a.js", "revision": "" })).unwrap();
    let null = ManifestEntry::from_value(&json!({ "url": "/a.js", "revision": null })).unwrap();
    assert_eq!(empty.revision(), None);
    assert_eq!(null.revision(), None);
  }

  #[test]
  fn numeric_revisions_are_coerced() {
    let revision_of = |revision: Value| {
      ManifestEntry::from_value(&json!({ "url": "/a.js", "revision": revision }))
        .unwrap()
        .revision()
        .map(str::to_string)
    };

    assert_eq!(revision_of(json!(3)), Some("3".to_string()));
    assert_eq!(revision_of(json!(3.0)), Some("3".to_string()));
    assert_eq!(revision_of(json!(-2)), Some("-2".to_string()));
    assert_eq!(revision_of(json!(1.5)), Some("1.5".to_string()));
  }

  #[test]
  fn zero_revisions_mean_unrevisioned() {
    for revision in [json!(0), json!(0.0), json!(-0.0)] {
      let entry =
        ManifestEntry::from_value(&json!({ "url": "/a.js", "revision": revision })).unwrap();
      assert_eq!(entry.revision(), None, "revision {revision}");
    }
  }

  #[test]
  fn deserializes_manifest_arrays() {
    let entries: Vec<ManifestEntry> =
      serde_json::from_str(r#"["/app.js", {"url": "/index.html", "revision": "v1"}]"#).unwrap();
    assert_eq!(entries, vec![
      ManifestEntry::versioned("/app.js"),
      ManifestEntry::revisioned("/index.html", "v1"),
    ]);
  }

  #[test]
  fn resolved_entries_use_camel_case_keys() {
    let resolved = ResolvedEntry {
      url: "https://example.com/a".into(),
      cache_key: "https://example.com/a".into(),
    };
    let value = serde_json::to_value(&resolved).unwrap();
    assert_eq!(value, json!({
      "url": "https://example.com/a",
      "cacheKey": "https://example.com/a",
    }));
  }
}
