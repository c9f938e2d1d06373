#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod config;
pub mod entry;
pub mod error;
pub mod manifest;
pub mod resolver;

pub use config::ResolverConfig;
pub use entry::{EntryDescriptor, ManifestEntry, ResolvedEntry};
pub use error::PrecacheError;
pub use manifest::{CacheMode, PrecacheList, load_manifest};
pub use resolver::{REVISION_SEARCH_PARAM, parse_base, resolve, resolve_value};
