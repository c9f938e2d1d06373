//! Derive `{url, cacheKey}` pairs from manifest entries.
//!
//! Entries that already carry their version in the path are cached under the resolved url
//! itself. Entries that pair a stable url with a revision keep the resolved url for fetching
//! and gain a reserved query parameter in the cache key, so bumping the revision invalidates
//! the stored response without changing what gets requested.

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::entry::{ManifestEntry, ResolvedEntry};
use crate::error::PrecacheError;

/// Name of the query parameter that stores revision info in cache keys.
pub const REVISION_SEARCH_PARAM: &str = "_wbRevision";

/// Parse a resolution base, which must be an absolute URL.
pub fn parse_base(base: &str) -> Result<Url, PrecacheError> {
  Url::parse(base).map_err(|source| PrecacheError::InvalidBase {
    base: base.to_string(),
    source,
  })
}

/// Resolve a manifest entry against `base`.
///
/// Relative references follow the URL Standard resolution rules; absolute references ignore
/// `base` entirely.
pub fn resolve(entry: &ManifestEntry, base: &Url) -> Result<ResolvedEntry, PrecacheError> {
  let reference = entry.url();
  if reference.is_empty() {
    return Err(PrecacheError::InvalidEntry {
      entry: entry.to_value(),
    });
  }

  let resolved = match entry.revision() {
    None => {
      let href = String::from(resolve_reference(reference, base)?);
      ResolvedEntry {
        cache_key: href.clone(),
        url: href,
      }
    }
    Some(revision) => {
      // Two independent parses so the revision never leaks into the fetch url.
      let original_url = resolve_reference(reference, base)?;
      let mut cache_key_url = resolve_reference(reference, base)?;
      set_search_param(&mut cache_key_url, REVISION_SEARCH_PARAM, revision);
      ResolvedEntry {
        url: original_url.into(),
        cache_key: cache_key_url.into(),
      }
    }
  };

  debug!(
    url = %resolved.url,
    cache_key = %resolved.cache_key,
    "resolved precache entry"
  );
  Ok(resolved)
}

/// Validate a raw JSON entry and resolve it against `base`.
pub fn resolve_value(value: &Value, base: &Url) -> Result<ResolvedEntry, PrecacheError> {
  let entry = ManifestEntry::from_value(value)?;
  resolve(&entry, base)
}

/// Resolve a single reference against `base` into an absolute URL.
pub fn resolve_reference(reference: &str, base: &Url) -> Result<Url, PrecacheError> {
  base
    .join(reference)
    .map_err(|source| PrecacheError::InvalidUrl {
      url: reference.to_string(),
      source,
    })
}

/// Set `name` to `value` in the query of `url`.
///
/// The first existing pair with that name is overwritten and any later duplicates are dropped;
/// otherwise the pair is appended. The whole query is re-serialised as form-urlencoded.
fn set_search_param(url: &mut Url, name: &str, value: &str) {
  let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
  let mut found = false;
  pairs.retain_mut(|(key, current)| {
    if key != name {
      return true;
    }
    if found {
      return false;
    }
    found = true;
    *current = value.to_string();
    true
  });
  if !found {
    pairs.push((name.to_string(), value.to_string()));
  }

  url.query_pairs_mut().clear().extend_pairs(pairs);
}
