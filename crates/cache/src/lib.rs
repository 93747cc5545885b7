//! In-memory record cache.
//!
//! Entries are keyed by the operation that produced them plus its normalized
//! arguments, and expire after a TTL fixed when they were stored. There is no
//! background sweep: expired entries are dropped lazily when next read.
//!
//! Concurrent misses for the same key are coalesced: the first caller runs
//! the computation while the rest wait on the key's slot and then observe
//! whatever it stored. Failed computations are never stored.

mod key;
mod store;

pub use crate::key::{CacheKey, Operation};
pub use crate::store::{Cache, Cached};
