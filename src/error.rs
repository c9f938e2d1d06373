//! Error type shared by entry validation, resolution and manifest bookkeeping.

use serde_json::Value;
use thiserror::Error;

/// Failures raised while turning manifest entries into cache identifiers.
#[derive(Debug, Error)]
pub enum PrecacheError {
  /// The entry is absent, of an unsupported type, or lacks a usable `url`.
  #[error("unexpected precache manifest entry: {entry}")]
  InvalidEntry {
    /// The offending entry as it appeared in the manifest.
    entry: Value,
  },
  /// The entry's url could not be resolved against the base.
  #[error("invalid url {url:?} in precache manifest entry")]
  InvalidUrl {
    /// Reference that failed to parse.
    url: String,
    /// Underlying parser error.
    #[source]
    source: url::ParseError,
  },
  /// The resolution base is not an absolute URL.
  #[error("invalid resolution base {base:?}")]
  InvalidBase {
    /// Base string that failed to parse.
    base: String,
    /// Underlying parser error.
    #[source]
    source: url::ParseError,
  },
  /// The same url was added twice with different cache keys.
  #[error("conflicting precache entries: {first} and {second} share a url")]
  ConflictingEntries {
    /// Cache key recorded first for the url.
    first: String,
    /// Cache key of the entry that clashed with it.
    second: String,
  },
  /// Two different urls resolved to the same cache key.
  #[error("cache key {cache_key} is shared by {first} and {second}")]
  CacheKeyCollision {
    /// Cache key both urls resolved to.
    cache_key: String,
    /// Url recorded first under the cache key.
    first: String,
    /// Url of the entry that clashed with it.
    second: String,
  },
  /// The same cache key was added twice with different integrity metadata.
  #[error("conflicting integrity values for {cache_key}")]
  ConflictingIntegrities {
    /// Cache key whose integrity values disagree.
    cache_key: String,
  },
}

impl PrecacheError {
  pub(crate) fn invalid_entry(entry: &Value) -> Self {
    Self::InvalidEntry {
      entry: entry.clone(),
    }
  }

  /// Returns `true` for the validation failure raised on malformed entries.
  pub fn is_invalid_entry(&self) -> bool {
    matches!(self, Self::InvalidEntry { .. })
  }
}
