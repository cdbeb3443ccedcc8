//! Cache Module
//!
//! Key normalization, expiring FIFO caches with a durable mirror, and the
//! negative registry of keys known to be absent from the catalog.

mod context;
mod entry;
mod fifo;
mod key;
mod mirror;
mod negative;
mod stats;
mod store;


// Re-export public types
pub use context::{CacheContext, ContextStats, ENTITY_NAMESPACE, IMAGE_NAMESPACE};
pub use entry::{CacheEntry, MINUTE_MS};
pub use fifo::InsertionOrder;
pub use key::normalize;
pub use mirror::{DurableMirror, SessionStore};
pub use negative::{is_out_of_range_id, NegativeRegistry, CUSTOM_ID_PREFIX, DEFAULT_CATALOG_MAX_ID};
pub use stats::CacheStats;
pub use store::ExpiringCache;
