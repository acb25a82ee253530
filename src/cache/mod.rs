//! Cache module for storing upstream API responses in memory
//!
//! This module provides a time-boxed cache that each API client owns
//! privately. Entries carry an expiry timestamp and expired entries are
//! treated as absent, being evicted lazily on the next lookup.

mod manager;

pub use manager::{cache_key, CacheManager};
