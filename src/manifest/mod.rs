//! Ordered manifest processing built on top of the entry resolver.

mod list;
mod loading;

pub use list::{CacheMode, PrecacheList};
pub use loading::{load_manifest, parse_manifest};
