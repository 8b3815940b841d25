//! Cache invalidation events.
//!
//! Write paths that change a cached key's population publish an event;
//! interaction counters (reactions, downvotes, views, reports) do not,
//! and are allowed to drift within one TTL window.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::domain::types::Category;

use super::lock::mutex_guard;

/// Monotonic epoch ordering events within this process.
pub type Epoch = u64;

#[derive(Debug, Clone)]
pub struct CacheEvent {
    /// Unique identifier for idempotency.
    pub id: Uuid,
    /// Monotonic epoch within this process.
    pub epoch: Epoch,
    pub kind: EventKind,
    pub timestamp: OffsetDateTime,
}

impl CacheEvent {
    pub fn new(kind: EventKind, epoch: Epoch) -> Self {
        Self {
            id: Uuid::new_v4(),
            epoch,
            kind,
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    /// Categories whose cached feeds this event staled. The consumer
    /// adds the aggregate `All` itself.
    pub fn affected_categories(&self) -> Vec<Category> {
        match &self.kind {
            EventKind::PostCreated { category, .. }
            | EventKind::PostArchived { category, .. }
            | EventKind::PostUnarchived { category, .. }
            | EventKind::PostDeleted { category, .. } => vec![*category],
            EventKind::PostEdited {
                category,
                previous_category,
                ..
            } => match previous_category {
                Some(previous) if previous != category => vec![*category, *previous],
                _ => vec![*category],
            },
        }
    }
}

/// Population-changing writes that trigger invalidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    PostCreated {
        post_id: Uuid,
        category: Category,
    },
    /// Covers content edits and category moves; a move stales both the
    /// new and the previous category.
    PostEdited {
        post_id: Uuid,
        category: Category,
        previous_category: Option<Category>,
    },
    PostArchived {
        post_id: Uuid,
        category: Category,
    },
    PostUnarchived {
        post_id: Uuid,
        category: Category,
    },
    PostDeleted {
        post_id: Uuid,
        category: Category,
    },
}

/// In-memory FIFO of pending invalidation events.
///
/// A mutex suffices: the queue is drained synchronously on every write
/// path, so contention stays low.
pub struct EventQueue {
    queue: Mutex<VecDeque<CacheEvent>>,
    epoch_counter: AtomicU64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            epoch_counter: AtomicU64::new(0),
        }
    }

    pub fn next_epoch(&self) -> Epoch {
        self.epoch_counter.fetch_add(1, Ordering::SeqCst)
    }

    pub fn publish(&self, kind: EventKind) {
        let event = CacheEvent::new(kind, self.next_epoch());
        info!(
            event_id = %event.id,
            event_epoch = event.epoch,
            event_kind = ?event.kind,
            "feed cache event enqueued"
        );
        mutex_guard(&self.queue, "publish").push_back(event);
    }

    /// Drain up to `limit` events in FIFO order.
    pub fn drain(&self, limit: usize) -> Vec<CacheEvent> {
        let mut queue = mutex_guard(&self.queue, "drain");
        let count = limit.min(queue.len());
        queue.drain(..count).collect()
    }

    pub fn len(&self) -> usize {
        mutex_guard(&self.queue, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epochs_are_monotonic() {
        let queue = EventQueue::new();
        let a = queue.next_epoch();
        let b = queue.next_epoch();
        assert!(a < b);
    }

    #[test]
    fn publish_and_drain_fifo() {
        let queue = EventQueue::new();
        queue.publish(EventKind::PostCreated {
            post_id: Uuid::nil(),
            category: Category::Career,
        });
        queue.publish(EventKind::PostArchived {
            post_id: Uuid::nil(),
            category: Category::Life,
        });

        assert_eq!(queue.len(), 2);
        let events = queue.drain(1);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0].kind, EventKind::PostCreated { .. }));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn drain_beyond_available_takes_all() {
        let queue = EventQueue::new();
        queue.publish(EventKind::PostDeleted {
            post_id: Uuid::nil(),
            category: Category::Health,
        });
        assert_eq!(queue.drain(100).len(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn category_move_affects_both_categories() {
        let event = CacheEvent::new(
            EventKind::PostEdited {
                post_id: Uuid::nil(),
                category: Category::Career,
                previous_category: Some(Category::Life),
            },
            0,
        );
        assert_eq!(
            event.affected_categories(),
            vec![Category::Career, Category::Life]
        );
    }

    #[test]
    fn plain_edit_affects_one_category() {
        let event = CacheEvent::new(
            EventKind::PostEdited {
                post_id: Uuid::nil(),
                category: Category::Career,
                previous_category: Some(Category::Career),
            },
            0,
        );
        assert_eq!(event.affected_categories(), vec![Category::Career]);
    }
}
