//! Folio cache system
//!
//! A single in-memory store sits between the content service and the CMS:
//!
//! - **Keys** are namespaced strings (`blog:list`, `projects:single:abc123`)
//! - **Entries** carry their own TTL and expire lazily on read
//! - **Invalidation** is explicit, by key list or by substring pattern
//!
//! State lives for the process lifetime only; a restart starts cold and
//! refills from the CMS.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! list_ttl_seconds = 300
//! detail_ttl_seconds = 600
//! ```

mod clock;
mod config;
mod keys;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use keys::{CacheKey, KIND_LIST, KIND_SINGLE};
pub use store::{CacheStats, TtlCache};

pub(crate) use store::{
    METRIC_CACHE_EXPIRED, METRIC_CACHE_FETCH_ERROR, METRIC_CACHE_HIT, METRIC_CACHE_MISS,
};
