//! Feed cache storage.
//!
//! An in-process LRU of precomputed feed lists with per-entry TTLs and
//! per-category generation stamps. The stamps resolve the set/
//! invalidate race: a `set` carries the generation observed before
//! scoring began and is dropped if invalidation advanced the category
//! meanwhile, so stale data can never be resurrected.

use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use lru::LruCache;
use metrics::counter;

use crate::domain::posts::FeedPost;
use crate::domain::types::Category;

use super::config::FeedCacheConfig;
use super::keys::FeedKey;
use super::lock::write_guard;

struct CachedFeed {
    posts: Vec<FeedPost>,
    stored_at: Instant,
    ttl: Duration,
    generation: u64,
}

impl CachedFeed {
    fn is_expired(&self) -> bool {
        self.stored_at.elapsed() >= self.ttl
    }
}

/// Bounded feed cache with TTL expiry and generation-checked writes.
pub struct FeedStore {
    entries: RwLock<LruCache<FeedKey, CachedFeed>>,
    generations: [AtomicU64; Category::SLOT_COUNT],
}

impl FeedStore {
    pub fn new(config: &FeedCacheConfig) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.entry_limit_non_zero())),
            generations: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }

    /// Current generation for a key's category. Captured by the
    /// assembler before scoring and passed back to [`Self::set`].
    pub fn generation(&self, category: Category) -> u64 {
        self.generations[category.slot()].load(Ordering::SeqCst)
    }

    /// Fetch a cached feed, evicting it if expired.
    pub fn get(&self, key: &FeedKey) -> Option<Vec<FeedPost>> {
        let mut entries = write_guard(&self.entries, "get");
        match entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                counter!("candor_feed_cache_hit_total").increment(1);
                Some(entry.posts.clone())
            }
            Some(_) => {
                entries.pop(key);
                counter!("candor_feed_cache_miss_total").increment(1);
                None
            }
            None => {
                counter!("candor_feed_cache_miss_total").increment(1);
                None
            }
        }
    }

    /// Store a feed computed under `observed_generation`.
    ///
    /// Returns false (and stores nothing) when invalidation advanced
    /// the key's category since the generation was observed. The
    /// generation comparison and the insert happen under one write
    /// lock, so they are linearized against [`Self::invalidate_category`].
    pub fn set(
        &self,
        key: FeedKey,
        posts: Vec<FeedPost>,
        ttl: Duration,
        observed_generation: u64,
    ) -> bool {
        let mut entries = write_guard(&self.entries, "set");
        let current = self.generations[key.category().slot()].load(Ordering::SeqCst);
        if current != observed_generation {
            counter!("candor_feed_cache_stale_set_dropped_total").increment(1);
            return false;
        }
        entries.put(
            key,
            CachedFeed {
                posts,
                stored_at: Instant::now(),
                ttl,
                generation: observed_generation,
            },
        );
        true
    }

    /// Purge every entry for a category plus the aggregate `All`, and
    /// advance both generations. Returns the number of entries removed.
    pub fn invalidate_category(&self, category: Category) -> usize {
        let mut entries = write_guard(&self.entries, "invalidate_category");

        self.generations[category.slot()].fetch_add(1, Ordering::SeqCst);
        if !category.is_aggregate() {
            self.generations[Category::All.slot()].fetch_add(1, Ordering::SeqCst);
        }

        let doomed: Vec<FeedKey> = entries
            .iter()
            .filter(|(key, _)| {
                key.category() == category || key.category() == Category::All
            })
            .map(|(key, _)| key.clone())
            .collect();
        for key in &doomed {
            entries.pop(key);
        }

        counter!("candor_feed_cache_invalidated_total").increment(doomed.len() as u64);
        doomed.len()
    }

    /// Drop every cached feed. Generations advance so in-flight sets
    /// are dropped too.
    pub fn clear(&self) {
        let mut entries = write_guard(&self.entries, "clear");
        for generation in &self.generations {
            generation.fetch_add(1, Ordering::SeqCst);
        }
        entries.clear();
    }

    pub fn len(&self) -> usize {
        write_guard(&self.entries, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use time::OffsetDateTime;
    use uuid::Uuid;

    use crate::domain::types::FeedSort;

    use super::*;

    fn sample_post() -> FeedPost {
        FeedPost {
            id: Uuid::new_v4(),
            author_id: Some("user-1".to_string()),
            author_name: "Ada".to_string(),
            author_handle: "@ada".to_string(),
            author_avatar: None,
            content: "test".to_string(),
            category: Category::Career,
            tags: Vec::new(),
            image_url: None,
            is_anonymous: false,
            reaction_count: 0,
            downvote_count: 0,
            report_count: 0,
            view_count: 0,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn store() -> FeedStore {
        FeedStore::new(&FeedCacheConfig::default())
    }

    fn career_key() -> FeedKey {
        FeedKey::shared(FeedSort::Hot, Category::Career).expect("key")
    }

    const TTL: Duration = Duration::from_secs(30);

    #[test]
    fn set_then_get_round_trip() {
        let store = store();
        let key = career_key();
        let generation = store.generation(Category::Career);

        assert!(store.get(&key).is_none());
        assert!(store.set(key.clone(), vec![sample_post()], TTL, generation));

        let cached = store.get(&key).expect("cached feed");
        assert_eq!(cached.len(), 1);
    }

    #[test]
    fn expired_entries_are_evicted_on_read() {
        let store = store();
        let key = career_key();
        let generation = store.generation(Category::Career);

        store.set(key.clone(), vec![sample_post()], Duration::ZERO, generation);
        assert!(store.get(&key).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn invalidation_purges_category_and_all() {
        let store = store();
        let career = career_key();
        let all = FeedKey::shared(FeedSort::Hot, Category::All).expect("key");
        let health = FeedKey::shared(FeedSort::Hot, Category::Health).expect("key");

        store.set(
            career.clone(),
            vec![sample_post()],
            TTL,
            store.generation(Category::Career),
        );
        store.set(
            all.clone(),
            vec![sample_post()],
            TTL,
            store.generation(Category::All),
        );
        store.set(
            health.clone(),
            vec![sample_post()],
            TTL,
            store.generation(Category::Health),
        );

        let removed = store.invalidate_category(Category::Career);
        assert_eq!(removed, 2);

        assert!(store.get(&career).is_none());
        assert!(store.get(&all).is_none());
        assert!(store.get(&health).is_some());
    }

    #[test]
    fn stale_set_cannot_resurrect_invalidated_entry() {
        let store = store();
        let key = career_key();

        // A slow read observes the generation, then invalidation runs
        // before its set lands.
        let observed = store.generation(Category::Career);
        store.invalidate_category(Category::Career);

        assert!(!store.set(key.clone(), vec![sample_post()], TTL, observed));
        assert!(store.get(&key).is_none());
    }

    #[test]
    fn invalidating_one_category_blocks_stale_all_set() {
        let store = store();
        let all = FeedKey::shared(FeedSort::New, Category::All).expect("key");

        let observed = store.generation(Category::All);
        store.invalidate_category(Category::Life);

        // `All` includes every category, so its generation advanced too.
        assert!(!store.set(all, vec![sample_post()], TTL, observed));
    }

    #[test]
    fn lru_evicts_beyond_entry_limit() {
        let config = FeedCacheConfig {
            entry_limit: 2,
            ..Default::default()
        };
        let store = FeedStore::new(&config);

        let keys = [
            FeedKey::shared(FeedSort::Hot, Category::Career).expect("key"),
            FeedKey::shared(FeedSort::Hot, Category::Health).expect("key"),
            FeedKey::shared(FeedSort::Hot, Category::Life).expect("key"),
        ];
        for key in &keys {
            store.set(
                key.clone(),
                vec![sample_post()],
                TTL,
                store.generation(key.category()),
            );
        }

        assert!(store.get(&keys[0]).is_none());
        assert!(store.get(&keys[1]).is_some());
        assert!(store.get(&keys[2]).is_some());
    }

    #[test]
    fn recovers_from_poisoned_lock() {
        let store = store();

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = store.entries.write().expect("lock");
            panic!("poison entries lock");
        }));

        let key = career_key();
        store.set(
            key.clone(),
            vec![sample_post()],
            TTL,
            store.generation(Category::Career),
        );
        assert!(store.get(&key).is_some());
    }
}
