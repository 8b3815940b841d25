//! Cache consumer.
//!
//! Drains pending events and purges the affected categories from the
//! feed store. Consumption runs synchronously on the write path, so an
//! invalidation is complete before the write is acknowledged.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use metrics::histogram;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::types::Category;

use super::config::FeedCacheConfig;
use super::events::EventQueue;
use super::store::FeedStore;

const METRIC_CACHE_CONSUME_MS: &str = "candor_feed_cache_consume_ms";

/// Processes invalidation events against the feed store.
///
/// Each batch:
/// 1. Drains up to `consume_batch_limit` events from the queue
/// 2. Collects the distinct categories they staled
/// 3. Purges those categories (the store fans out to `All` itself)
pub struct CacheConsumer {
    config: FeedCacheConfig,
    store: Arc<FeedStore>,
    queue: Arc<EventQueue>,
}

impl CacheConsumer {
    pub fn new(config: FeedCacheConfig, store: Arc<FeedStore>, queue: Arc<EventQueue>) -> Self {
        Self {
            config,
            store,
            queue,
        }
    }

    /// Consume pending events. Returns true if any were processed.
    #[instrument(skip(self))]
    pub fn consume(&self) -> bool {
        let consume_started_at = Instant::now();
        let events = self.queue.drain(self.config.consume_batch_limit);
        if events.is_empty() {
            return false;
        }

        let event_count = events.len();
        let event_ids: Vec<Uuid> = events.iter().map(|e| e.id).collect();

        // BTreeSet dedupes categories across the batch, so a burst of
        // writes to one category costs a single purge.
        let mut categories: BTreeSet<Category> = BTreeSet::new();
        for event in &events {
            categories.extend(event.affected_categories());
        }

        info!(
            event_count,
            event_ids = ?event_ids,
            categories = ?categories,
            "feed cache consumption starting"
        );

        let mut removed = 0;
        for category in &categories {
            removed += self.store.invalidate_category(*category);
        }

        info!(
            event_count,
            invalidated = removed,
            "feed cache consumption complete"
        );

        histogram!(METRIC_CACHE_CONSUME_MS)
            .record(consume_started_at.elapsed().as_secs_f64() * 1000.0);

        true
    }

    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    pub fn store(&self) -> &Arc<FeedStore> {
        &self.store
    }
}
