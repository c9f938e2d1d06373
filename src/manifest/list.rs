//! Accumulate resolved entries for a whole manifest and answer lookups against them.

use std::collections::BTreeMap;

use tracing::{debug, warn};
use url::Url;

use crate::entry::{ManifestEntry, ResolvedEntry};
use crate::error::PrecacheError;
use crate::resolver::{resolve, resolve_reference};

/// Request cache mode the fetching collaborator should use for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
  /// Regular HTTP cache semantics; the url itself is versioned.
  Default,
  /// Bypass the HTTP cache; the url is stable and only the revision changed.
  Reload,
}

/// Ordered collection of resolved manifest entries sharing one resolution base.
#[derive(Debug, Clone)]
pub struct PrecacheList {
  base: Url,
  entries: Vec<ResolvedEntry>,
  urls_to_cache_keys: BTreeMap<String, String>,
  cache_keys_to_urls: BTreeMap<String, String>,
  urls_to_cache_modes: BTreeMap<String, CacheMode>,
  cache_keys_to_integrities: BTreeMap<String, String>,
  unrevisioned: Vec<String>,
}

impl PrecacheList {
  /// Create an empty list resolving entries against `base`.
  pub fn new(base: Url) -> Self {
    Self {
      base,
      entries: Vec::new(),
      urls_to_cache_keys: BTreeMap::new(),
      cache_keys_to_urls: BTreeMap::new(),
      urls_to_cache_modes: BTreeMap::new(),
      cache_keys_to_integrities: BTreeMap::new(),
      unrevisioned: Vec::new(),
    }
  }

  /// Resolution base applied to every entry.
  pub fn base(&self) -> &Url {
    &self.base
  }

  /// Resolve and record a single entry.
  ///
  /// Adding an identical entry twice is a no-op. The list is left untouched when an error is
  /// returned.
  pub fn add(&mut self, entry: &ManifestEntry) -> Result<ResolvedEntry, PrecacheError> {
    let resolved = resolve(entry, &self.base)?;

    if let Some(existing) = self.urls_to_cache_keys.get(&resolved.url) {
      if existing != &resolved.cache_key {
        return Err(PrecacheError::ConflictingEntries {
          first: existing.clone(),
          second: resolved.cache_key,
        });
      }
    }

    if let Some(existing) = self.cache_keys_to_urls.get(&resolved.cache_key) {
      if existing != &resolved.url {
        return Err(PrecacheError::CacheKeyCollision {
          cache_key: resolved.cache_key,
          first: existing.clone(),
          second: resolved.url,
        });
      }
    }

    if let Some(integrity) = entry.integrity() {
      if let Some(existing) = self.cache_keys_to_integrities.get(&resolved.cache_key) {
        if existing != integrity {
          return Err(PrecacheError::ConflictingIntegrities {
            cache_key: resolved.cache_key,
          });
        }
      }
      self
        .cache_keys_to_integrities
        .insert(resolved.cache_key.clone(), integrity.to_string());
    }

    if self
      .urls_to_cache_keys
      .insert(resolved.url.clone(), resolved.cache_key.clone())
      .is_some()
    {
      debug!(url = %resolved.url, "skipping duplicate precache entry");
      return Ok(resolved);
    }

    let mode = if entry.revision().is_some() {
      CacheMode::Reload
    } else {
      self.unrevisioned.push(resolved.url.clone());
      CacheMode::Default
    };
    self.urls_to_cache_modes.insert(resolved.url.clone(), mode);
    self
      .cache_keys_to_urls
      .insert(resolved.cache_key.clone(), resolved.url.clone());
    self.entries.push(resolved.clone());

    Ok(resolved)
  }

  /// Resolve and record entries in manifest order, stopping at the first failure.
  ///
  /// Entries added before a failure stay in the list. Urls in the batch that were added without
  /// revision info are reported in a single warning, including when the batch fails.
  pub fn extend<'a, I>(&mut self, entries: I) -> Result<(), PrecacheError>
  where
    I: IntoIterator<Item = &'a ManifestEntry>,
  {
    let warned_before = self.unrevisioned.len();
    let outcome = entries
      .into_iter()
      .try_for_each(|entry| self.add(entry).map(drop));

    let batch = &self.unrevisioned[warned_before..];
    if !batch.is_empty() {
      warn!(
        count = batch.len(),
        urls = ?batch,
        "precache entries were added without revision info; make sure their urls carry a hash"
      );
    }
    outcome
  }

  /// Resolved entries in the order they were first added.
  pub fn entries(&self) -> &[ResolvedEntry] {
    &self.entries
  }

  /// Number of distinct entries.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Returns `true` when nothing has been added.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Urls added without revision info, in insertion order.
  pub fn unrevisioned_urls(&self) -> &[String] {
    &self.unrevisioned
  }

  /// Cache key for a url, which may be relative to the list's base.
  pub fn cache_key_for_url(&self, url: &str) -> Option<&str> {
    let resolved = resolve_reference(url, &self.base).ok()?;
    self
      .urls_to_cache_keys
      .get(resolved.as_str())
      .map(String::as_str)
  }

  /// Fetch url stored under a cache key.
  pub fn url_for_cache_key(&self, cache_key: &str) -> Option<&str> {
    self.cache_keys_to_urls.get(cache_key).map(String::as_str)
  }

  /// Cache mode the fetcher should use for a url, which may be relative to the base.
  pub fn cache_mode_for_url(&self, url: &str) -> Option<CacheMode> {
    let resolved = resolve_reference(url, &self.base).ok()?;
    self.urls_to_cache_modes.get(resolved.as_str()).copied()
  }

  /// Integrity metadata recorded for a cache key.
  pub fn integrity_for_cache_key(&self, cache_key: &str) -> Option<&str> {
    self
      .cache_keys_to_integrities
      .get(cache_key)
      .map(String::as_str)
  }

  /// Serialise the ordered resolved entries as prettified JSON.
  pub fn to_json_pretty(&self) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&self.entries)
  }
}
