//! Cache trigger service.
//!
//! High-level API the write paths call to publish invalidation events.
//! Every convenience method consumes immediately, so the purge lands
//! before the write is acknowledged to the client.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::domain::types::Category;

use super::config::FeedCacheConfig;
use super::consumer::CacheConsumer;
use super::events::{EventKind, EventQueue};

pub struct CacheTrigger {
    config: FeedCacheConfig,
    queue: Arc<EventQueue>,
    consumer: Arc<CacheConsumer>,
}

impl CacheTrigger {
    pub fn new(
        config: FeedCacheConfig,
        queue: Arc<EventQueue>,
        consumer: Arc<CacheConsumer>,
    ) -> Self {
        Self {
            config,
            queue,
            consumer,
        }
    }

    /// Publish an event and optionally consume the queue right away.
    pub fn trigger(&self, kind: EventKind, consume_now: bool) {
        if !self.config.enabled {
            debug!(event_kind = ?kind, "cache trigger skipped: cache disabled");
            return;
        }

        self.queue.publish(kind);

        if consume_now {
            self.consumer.consume();
        }
    }

    pub fn post_created(&self, post_id: Uuid, category: Category) {
        self.trigger(EventKind::PostCreated { post_id, category }, true);
    }

    pub fn post_edited(
        &self,
        post_id: Uuid,
        category: Category,
        previous_category: Option<Category>,
    ) {
        self.trigger(
            EventKind::PostEdited {
                post_id,
                category,
                previous_category,
            },
            true,
        );
    }

    pub fn post_archived(&self, post_id: Uuid, category: Category) {
        self.trigger(EventKind::PostArchived { post_id, category }, true);
    }

    pub fn post_unarchived(&self, post_id: Uuid, category: Category) {
        self.trigger(EventKind::PostUnarchived { post_id, category }, true);
    }

    pub fn post_deleted(&self, post_id: Uuid, category: Category) {
        self.trigger(EventKind::PostDeleted { post_id, category }, true);
    }

    pub fn config(&self) -> &FeedCacheConfig {
        &self.config
    }

    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    pub fn consumer(&self) -> &Arc<CacheConsumer> {
        &self.consumer
    }
}
