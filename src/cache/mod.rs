//! The feed cache and its invalidation pipeline.
//!
//! Cached feeds are ephemeral derived state with bounded TTLs; losing
//! them only costs a recompute. Write paths publish events which are
//! consumed synchronously before the write is acknowledged, purging
//! the affected category and the aggregate `All` across every sort.

mod config;
mod consumer;
mod events;
mod keys;
mod lock;
mod store;
mod trigger;

pub use config::FeedCacheConfig;
pub use consumer::CacheConsumer;
pub use events::{CacheEvent, EventKind, EventQueue};
pub use keys::FeedKey;
pub use store::FeedStore;
pub use trigger::CacheTrigger;
