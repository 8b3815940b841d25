//! In-memory repository implementations shared by integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use candor::application::feed::FeedService;
use candor::application::interactions::InteractionService;
use candor::application::posts::PostService;
use candor::application::repos::{
    CreatePostParams, InteractionsRepo, PostsRepo, PostsWriteRepo, RepoError, ReportsRepo,
    ToggleOutcome, UsersRepo,
};
use candor::cache::{CacheConsumer, CacheTrigger, EventQueue, FeedCacheConfig, FeedStore};
use candor::domain::posts::{AuthorSnapshot, PostRecord};
use candor::domain::ranking::ReactionEdge;
use candor::domain::types::{Category, InteractionKind};
use candor::infra::moderation::WordListGate;

#[derive(Default)]
pub struct MemoryRepo {
    pub posts: Mutex<Vec<PostRecord>>,
    pub users: Mutex<Vec<AuthorSnapshot>>,
    pub reactions: Mutex<Vec<ReactionEdge>>,
    pub downvotes: Mutex<Vec<ReactionEdge>>,
    pub reports: Mutex<Vec<(Uuid, String, Option<String>)>>,
}

impl MemoryRepo {
    pub fn add_user(&self, id: &str, username: &str) {
        self.users.lock().unwrap().push(AuthorSnapshot {
            id: id.to_string(),
            username: username.to_string(),
            display_name: None,
            photo_url: None,
        });
    }

    pub fn add_post(&self, post: PostRecord) -> Uuid {
        let id = post.id;
        self.posts.lock().unwrap().push(post);
        id
    }

    pub fn add_reaction(&self, user_id: &str, post_id: Uuid) {
        self.reactions.lock().unwrap().push(ReactionEdge {
            user_id: user_id.to_string(),
            post_id,
        });
        if let Some(post) = self
            .posts
            .lock()
            .unwrap()
            .iter_mut()
            .find(|p| p.id == post_id)
        {
            post.reaction_count += 1;
        }
    }
}

pub fn post(author_id: &str, category: Category, created_at: OffsetDateTime) -> PostRecord {
    PostRecord {
        id: Uuid::new_v4(),
        author_id: author_id.to_string(),
        author_name: author_id.to_string(),
        author_handle: format!("@{author_id}"),
        author_avatar: None,
        content: format!("post by {author_id}"),
        category,
        tags: Vec::new(),
        image_url: None,
        is_anonymous: false,
        reaction_count: 0,
        downvote_count: 0,
        report_count: 0,
        view_count: 0,
        is_rejected: false,
        is_archived: false,
        created_at,
    }
}

fn matches_query(record: &PostRecord, needle: &str) -> bool {
    record.content.to_lowercase().contains(needle)
        || record.category.as_str().to_lowercase().contains(needle)
        || record.author_handle.to_lowercase().contains(needle)
        || record
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle))
}

#[async_trait]
impl PostsRepo for MemoryRepo {
    async fn list_candidates(&self, category: Category) -> Result<Vec<PostRecord>, RepoError> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.is_rankable())
            .filter(|p| category.is_aggregate() || p.category == category)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn posts_by_ids(&self, ids: &[Uuid]) -> Result<Vec<PostRecord>, RepoError> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn posts_by_author(&self, author_id: &str) -> Result<Vec<PostRecord>, RepoError> {
        let mut posts: Vec<PostRecord> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn search_posts(&self, query: &str) -> Result<Vec<PostRecord>, RepoError> {
        let needle = query.to_lowercase();
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.is_rankable())
            .filter(|p| matches_query(p, &needle))
            .cloned()
            .collect())
    }

    async fn tag_counts(&self, limit: usize) -> Result<Vec<(String, i64)>, RepoError> {
        let mut counts: HashMap<String, i64> = HashMap::new();
        for record in self.posts.lock().unwrap().iter() {
            if !record.is_rankable() {
                continue;
            }
            for tag in &record.tags {
                *counts.entry(tag.clone()).or_insert(0) += 1;
            }
        }
        let mut ranked: Vec<(String, i64)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(limit);
        Ok(ranked)
    }
}

#[async_trait]
impl PostsWriteRepo for MemoryRepo {
    async fn insert_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let record = PostRecord {
            id: Uuid::new_v4(),
            author_id: params.author.id.clone(),
            author_name: params
                .author
                .display_name
                .clone()
                .unwrap_or_else(|| params.author.username.clone()),
            author_handle: format!("@{}", params.author.username),
            author_avatar: params.author.photo_url.clone(),
            content: params.content,
            category: params.category,
            tags: params.tags,
            image_url: params.image_url,
            is_anonymous: params.is_anonymous,
            reaction_count: 0,
            downvote_count: 0,
            report_count: 0,
            view_count: 0,
            is_rejected: params.is_rejected,
            is_archived: false,
            created_at: OffsetDateTime::now_utc(),
        };
        self.posts.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn set_archived(&self, id: Uuid, archived: bool) -> Result<PostRecord, RepoError> {
        let mut posts = self.posts.lock().unwrap();
        let post = posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepoError::NotFound)?;
        post.is_archived = archived;
        Ok(post.clone())
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| p.id != id);
        if posts.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn adjust_counter(
        &self,
        id: Uuid,
        kind: InteractionKind,
        delta: i64,
    ) -> Result<(), RepoError> {
        let mut posts = self.posts.lock().unwrap();
        let post = posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepoError::NotFound)?;
        let counter = match kind {
            InteractionKind::Reaction => &mut post.reaction_count,
            InteractionKind::Downvote => &mut post.downvote_count,
            InteractionKind::View => &mut post.view_count,
        };
        *counter = (*counter + delta).max(0);
        Ok(())
    }
}

impl MemoryRepo {
    fn toggle_edge(
        &self,
        own: &Mutex<Vec<ReactionEdge>>,
        opposite: &Mutex<Vec<ReactionEdge>>,
        own_kind: InteractionKind,
        opposite_kind: InteractionKind,
        post_id: Uuid,
        user_id: &str,
    ) -> Result<ToggleOutcome, RepoError> {
        let mut edges = own.lock().unwrap();
        let existing = edges
            .iter()
            .position(|e| e.post_id == post_id && e.user_id == user_id);
        if let Some(index) = existing {
            edges.remove(index);
            drop(edges);
            self.bump(post_id, own_kind, -1)?;
            return Ok(ToggleOutcome {
                active: false,
                removed_opposite: false,
            });
        }
        edges.push(ReactionEdge {
            user_id: user_id.to_string(),
            post_id,
        });
        drop(edges);
        self.bump(post_id, own_kind, 1)?;

        let mut other = opposite.lock().unwrap();
        let removed = other
            .iter()
            .position(|e| e.post_id == post_id && e.user_id == user_id);
        let removed_opposite = removed.is_some();
        if let Some(index) = removed {
            other.remove(index);
        }
        drop(other);
        if removed_opposite {
            self.bump(post_id, opposite_kind, -1)?;
        }

        Ok(ToggleOutcome {
            active: true,
            removed_opposite,
        })
    }

    fn bump(&self, post_id: Uuid, kind: InteractionKind, delta: i64) -> Result<(), RepoError> {
        let mut posts = self.posts.lock().unwrap();
        let post = posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or(RepoError::NotFound)?;
        let counter = match kind {
            InteractionKind::Reaction => &mut post.reaction_count,
            InteractionKind::Downvote => &mut post.downvote_count,
            InteractionKind::View => &mut post.view_count,
        };
        *counter = (*counter + delta).max(0);
        Ok(())
    }
}

#[async_trait]
impl InteractionsRepo for MemoryRepo {
    async fn toggle_reaction(
        &self,
        post_id: Uuid,
        user_id: &str,
    ) -> Result<ToggleOutcome, RepoError> {
        self.toggle_edge(
            &self.reactions,
            &self.downvotes,
            InteractionKind::Reaction,
            InteractionKind::Downvote,
            post_id,
            user_id,
        )
    }

    async fn toggle_downvote(
        &self,
        post_id: Uuid,
        user_id: &str,
    ) -> Result<ToggleOutcome, RepoError> {
        self.toggle_edge(
            &self.downvotes,
            &self.reactions,
            InteractionKind::Downvote,
            InteractionKind::Reaction,
            post_id,
            user_id,
        )
    }

    async fn reactions_by_user(&self, user_id: &str) -> Result<Vec<Uuid>, RepoError> {
        Ok(self
            .reactions
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.user_id == user_id)
            .map(|e| e.post_id)
            .collect())
    }

    async fn reactions_on_posts(
        &self,
        post_ids: &[Uuid],
        exclude_user: &str,
    ) -> Result<Vec<ReactionEdge>, RepoError> {
        Ok(self
            .reactions
            .lock()
            .unwrap()
            .iter()
            .filter(|e| post_ids.contains(&e.post_id) && e.user_id != exclude_user)
            .cloned()
            .collect())
    }

    async fn reactions_of_users(
        &self,
        user_ids: &[String],
    ) -> Result<Vec<ReactionEdge>, RepoError> {
        Ok(self
            .reactions
            .lock()
            .unwrap()
            .iter()
            .filter(|e| user_ids.contains(&e.user_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UsersRepo for MemoryRepo {
    async fn find_snapshot(&self, user_id: &str) -> Result<Option<AuthorSnapshot>, RepoError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == user_id)
            .cloned())
    }

    async fn snapshots_by_ids(
        &self,
        user_ids: &[String],
    ) -> Result<Vec<AuthorSnapshot>, RepoError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| user_ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AuthorSnapshot>, RepoError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn search_users(&self, query: &str) -> Result<Vec<AuthorSnapshot>, RepoError> {
        let needle = query.to_lowercase();
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| {
                u.username.to_lowercase().contains(&needle)
                    || u.display_name
                        .as_ref()
                        .is_some_and(|name| name.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ReportsRepo for MemoryRepo {
    async fn insert_report(
        &self,
        post_id: Uuid,
        reporter_id: &str,
        reason: Option<String>,
    ) -> Result<i64, RepoError> {
        self.reports
            .lock()
            .unwrap()
            .push((post_id, reporter_id.to_string(), reason));
        let mut posts = self.posts.lock().unwrap();
        let post = posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or(RepoError::NotFound)?;
        post.report_count += 1;
        Ok(post.report_count)
    }

    async fn backfill_report_counts(&self) -> Result<u64, RepoError> {
        let reports = self.reports.lock().unwrap();
        let mut posts = self.posts.lock().unwrap();
        let mut updated = 0;
        for post in posts.iter_mut() {
            let tally = reports.iter().filter(|(id, _, _)| *id == post.id).count() as i64;
            if tally > 0 && post.report_count != tally {
                post.report_count = tally;
                updated += 1;
            }
        }
        Ok(updated)
    }
}

/// Fully wired application services over one shared in-memory repo.
pub struct TestApp {
    pub repo: Arc<MemoryRepo>,
    pub store: Arc<FeedStore>,
    pub trigger: Arc<CacheTrigger>,
    pub feed: FeedService,
    pub posts: PostService,
    pub interactions: InteractionService,
}

pub fn test_app(cache_config: FeedCacheConfig) -> TestApp {
    let repo = Arc::new(MemoryRepo::default());
    let store = Arc::new(FeedStore::new(&cache_config));
    let queue = Arc::new(EventQueue::new());
    let consumer = Arc::new(CacheConsumer::new(
        cache_config.clone(),
        store.clone(),
        queue.clone(),
    ));
    let trigger = Arc::new(CacheTrigger::new(cache_config.clone(), queue, consumer));

    let feed = FeedService::new(
        repo.clone(),
        repo.clone(),
        repo.clone(),
        store.clone(),
        cache_config,
        Duration::from_millis(500),
    );
    let posts = PostService::new(
        repo.clone(),
        repo.clone(),
        repo.clone(),
        Arc::new(WordListGate),
        trigger.clone(),
    );
    let interactions = InteractionService::new(repo.clone(), repo.clone(), repo.clone());

    TestApp {
        repo,
        store,
        trigger,
        feed,
        posts,
        interactions,
    }
}
