//! Feed assembly: cache lookup, candidate scoring, enrichment.
//!
//! The assembler is the only reader of the feed cache. It captures the
//! category generation before scoring and hands it back on `set`, so a
//! racing invalidation always wins. Enrichment failures degrade to the
//! author snapshot captured at post creation; only signal-store
//! unavailability surfaces to the caller.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use serde::Serialize;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::cache::{FeedCacheConfig, FeedKey, FeedStore};
use crate::domain::posts::FeedPost;
use crate::domain::ranking;
use crate::domain::types::{Category, FeedSort};

use super::error::AppError;
use super::repos::{InteractionsRepo, PostsRepo, UsersRepo};

/// Which pipeline produced a feed. `Standard` covers the shared sorts;
/// the rest trace the personalized chain so callers (and tests) can
/// tell a real recommendation from a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedSource {
    Standard,
    Personalized,
    HotFallback,
    Empty,
}

impl FeedSource {
    fn as_str(self) -> &'static str {
        match self {
            FeedSource::Standard => "standard",
            FeedSource::Personalized => "personalized",
            FeedSource::HotFallback => "hot-fallback",
            FeedSource::Empty => "empty",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedResponse {
    pub posts: Vec<FeedPost>,
    pub source: FeedSource,
}

pub struct FeedService {
    posts: Arc<dyn PostsRepo>,
    interactions: Arc<dyn InteractionsRepo>,
    users: Arc<dyn UsersRepo>,
    store: Arc<FeedStore>,
    cache_config: FeedCacheConfig,
    enrich_timeout: Duration,
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        interactions: Arc<dyn InteractionsRepo>,
        users: Arc<dyn UsersRepo>,
        store: Arc<FeedStore>,
        cache_config: FeedCacheConfig,
        enrich_timeout: Duration,
    ) -> Self {
        Self {
            posts,
            interactions,
            users,
            store,
            cache_config,
            enrich_timeout,
        }
    }

    /// Assemble a feed. `user` is required only for personalized sorts;
    /// a personalized request without a user degrades to hot.
    #[instrument(skip(self), fields(category = %category.as_str(), sort = %sort.as_str()))]
    pub async fn feed(
        &self,
        category: Category,
        sort: FeedSort,
        user: Option<&str>,
    ) -> Result<FeedResponse, AppError> {
        let response = match (sort, user) {
            (FeedSort::ForYou, Some(user)) => self.personalized_feed(category, user).await?,
            (FeedSort::ForYou, None) => {
                debug!("personalized sort without a user, serving hot");
                let posts = self.shared_feed(category, FeedSort::Hot).await?;
                FeedResponse {
                    posts,
                    source: FeedSource::HotFallback,
                }
            }
            _ => {
                let posts = self.shared_feed(category, sort).await?;
                FeedResponse {
                    posts,
                    source: FeedSource::Standard,
                }
            }
        };

        counter!("candor_feed_served_total", "source" => response.source.as_str()).increment(1);
        Ok(response)
    }

    /// Shared (non-personalized) pipeline: cache, then score + enrich,
    /// then a generation-checked set.
    async fn shared_feed(
        &self,
        category: Category,
        sort: FeedSort,
    ) -> Result<Vec<FeedPost>, AppError> {
        let key = FeedKey::shared(sort, category)?;

        if self.cache_config.enabled
            && let Some(cached) = self.store.get(&key)
        {
            return Ok(cached);
        }

        let observed_generation = self.store.generation(category);

        let candidates = self.posts.list_candidates(category).await?;
        let ranked = match sort {
            FeedSort::New => ranking::rank_new(candidates),
            FeedSort::Hot => ranking::rank_hot(candidates),
            FeedSort::Top => ranking::rank_top(candidates),
            // Routed to `personalized_feed` before we get here.
            FeedSort::ForYou => Vec::new(),
        };
        let posts = self.enrich(ranked.into_iter().map(FeedPost::from_record).collect()).await;

        if self.cache_config.enabled
            && let Some(ttl) = self.cache_config.ttl_for(sort)
            && !self.store.set(key, posts.clone(), ttl, observed_generation)
        {
            debug!(
                category = category.as_str(),
                "feed write superseded by invalidation, serving uncached"
            );
        }

        Ok(posts)
    }

    /// Personalized pipeline: likes, similar users, candidate scoring.
    /// Never cached; every empty stage falls back to hot, except an
    /// empty category filter which yields an empty feed.
    async fn personalized_feed(
        &self,
        category: Category,
        user: &str,
    ) -> Result<FeedResponse, AppError> {
        let liked = self.interactions.reactions_by_user(user).await?;
        if liked.is_empty() {
            return self.hot_fallback(category).await;
        }

        let edges_on_liked = self.interactions.reactions_on_posts(&liked, user).await?;
        let similar = ranking::similar_users(&edges_on_liked, user);
        if similar.is_empty() {
            return self.hot_fallback(category).await;
        }

        let similar_edges = self.interactions.reactions_of_users(&similar).await?;
        let liked_set: HashSet<Uuid> = liked.into_iter().collect();
        let scored = ranking::recommendation_scores(&liked_set, &similar_edges);
        if scored.is_empty() {
            return self.hot_fallback(category).await;
        }

        let ids: Vec<Uuid> = scored.iter().map(|(id, _)| *id).collect();
        let records = self.posts.posts_by_ids(&ids).await?;
        let by_id: HashMap<Uuid, _> = records.into_iter().map(|r| (r.id, r)).collect();

        // Recommendation order, category filter applied after scoring.
        let selected: Vec<FeedPost> = ids
            .iter()
            .filter_map(|id| by_id.get(id))
            .filter(|record| record.is_rankable())
            .filter(|record| category.is_aggregate() || record.category == category)
            .cloned()
            .map(FeedPost::from_record)
            .collect();

        if selected.is_empty() {
            return Ok(FeedResponse {
                posts: Vec::new(),
                source: FeedSource::Empty,
            });
        }

        let posts = self.enrich(selected).await;
        Ok(FeedResponse {
            posts,
            source: FeedSource::Personalized,
        })
    }

    async fn hot_fallback(&self, category: Category) -> Result<FeedResponse, AppError> {
        let posts = self.shared_feed(category, FeedSort::Hot).await?;
        Ok(FeedResponse {
            posts,
            source: FeedSource::HotFallback,
        })
    }

    /// Refresh author identity from the live user snapshots, bounded by
    /// the enrichment timeout. On timeout or lookup failure the posts
    /// keep their creation-time snapshots; shielding has already run.
    async fn enrich(&self, mut posts: Vec<FeedPost>) -> Vec<FeedPost> {
        let author_ids: Vec<String> = posts
            .iter()
            .filter(|post| !post.is_anonymous)
            .filter_map(|post| post.author_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        if author_ids.is_empty() {
            return posts;
        }

        let lookup = self.users.snapshots_by_ids(&author_ids);
        let snapshots = match tokio::time::timeout(self.enrich_timeout, lookup).await {
            Ok(Ok(snapshots)) => snapshots,
            Ok(Err(err)) => {
                warn!(error = %err, "author enrichment failed, serving captured snapshots");
                return posts;
            }
            Err(_) => {
                warn!("author enrichment timed out, serving captured snapshots");
                return posts;
            }
        };

        let by_id: HashMap<&str, _> = snapshots
            .iter()
            .map(|snapshot| (snapshot.id.as_str(), snapshot))
            .collect();
        for post in &mut posts {
            if let Some(author_id) = post.author_id.clone()
                && let Some(snapshot) = by_id.get(author_id.as_str())
            {
                post.apply_author_snapshot(snapshot);
            }
        }
        posts
    }
}
