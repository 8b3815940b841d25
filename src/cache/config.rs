//! Feed cache configuration.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::types::FeedSort;

const DEFAULT_TTL_NEW_SECONDS: u64 = 15;
const DEFAULT_TTL_RANKED_SECONDS: u64 = 30;
const DEFAULT_ENTRY_LIMIT: usize = 64;
const DEFAULT_CONSUME_BATCH_LIMIT: usize = 100;

/// Feed cache tuning knobs.
///
/// `new` carries a shorter TTL than `hot`/`top` because its population
/// changes on every write; `for-you` is never cached.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedCacheConfig {
    /// Enable the feed cache. Disabling it changes latency, never
    /// results.
    pub enabled: bool,
    /// TTL for `new` feeds, in seconds.
    pub ttl_new_seconds: u64,
    /// TTL for `hot` and `top` feeds, in seconds.
    pub ttl_ranked_seconds: u64,
    /// Maximum cached feed lists (LRU beyond this).
    pub entry_limit: usize,
    /// Maximum events per consumption batch.
    pub consume_batch_limit: usize,
}

impl Default for FeedCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_new_seconds: DEFAULT_TTL_NEW_SECONDS,
            ttl_ranked_seconds: DEFAULT_TTL_RANKED_SECONDS,
            entry_limit: DEFAULT_ENTRY_LIMIT,
            consume_batch_limit: DEFAULT_CONSUME_BATCH_LIMIT,
        }
    }
}

impl FeedCacheConfig {
    /// TTL for a sort, or `None` when that sort is never cached.
    pub fn ttl_for(&self, sort: FeedSort) -> Option<Duration> {
        match sort {
            FeedSort::New => Some(Duration::from_secs(self.ttl_new_seconds)),
            FeedSort::Hot | FeedSort::Top => Some(Duration::from_secs(self.ttl_ranked_seconds)),
            FeedSort::ForYou => None,
        }
    }

    /// Entry limit as `NonZeroUsize`, clamping zero to 1.
    pub fn entry_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.entry_limit).unwrap_or(NonZeroUsize::MIN)
    }
}
