//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::posts::{AuthorSnapshot, PostRecord};
use crate::domain::ranking::ReactionEdge;
use crate::domain::types::{Category, InteractionKind};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreatePostParams {
    pub author: AuthorSnapshot,
    pub content: String,
    pub category: Category,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub is_anonymous: bool,
    pub is_rejected: bool,
}

/// What a reaction/downvote toggle did, with the counter deltas already
/// applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// True when the edge now exists, false when the toggle removed it.
    pub active: bool,
    /// True when the opposite edge was removed in the same transaction.
    pub removed_opposite: bool,
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    /// Rankable posts for a category (`All` means every category),
    /// excluding rejected and archived posts.
    async fn list_candidates(&self, category: Category) -> Result<Vec<PostRecord>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError>;

    /// Fetch many posts at once; missing ids are silently absent.
    async fn posts_by_ids(&self, ids: &[Uuid]) -> Result<Vec<PostRecord>, RepoError>;

    /// A user's own posts, newest first, archived included.
    async fn posts_by_author(&self, author_id: &str) -> Result<Vec<PostRecord>, RepoError>;

    /// Case-insensitive substring search over content and tags,
    /// rankable posts only.
    async fn search_posts(&self, query: &str) -> Result<Vec<PostRecord>, RepoError>;

    /// Tag frequencies across rankable posts, descending.
    async fn tag_counts(&self, limit: usize) -> Result<Vec<(String, i64)>, RepoError>;
}

#[async_trait]
pub trait PostsWriteRepo: Send + Sync {
    async fn insert_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError>;

    async fn set_archived(&self, id: Uuid, archived: bool) -> Result<PostRecord, RepoError>;

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError>;

    /// Bump a counter column by `delta` (may be negative).
    async fn adjust_counter(
        &self,
        id: Uuid,
        kind: InteractionKind,
        delta: i64,
    ) -> Result<(), RepoError>;
}

#[async_trait]
pub trait InteractionsRepo: Send + Sync {
    /// Toggle a reaction edge, removing any downvote edge by the same
    /// user in the same transaction. Counter columns are adjusted
    /// atomically with the edge changes.
    async fn toggle_reaction(&self, post_id: Uuid, user_id: &str)
    -> Result<ToggleOutcome, RepoError>;

    /// Toggle a downvote edge, removing any reaction edge by the same
    /// user in the same transaction.
    async fn toggle_downvote(&self, post_id: Uuid, user_id: &str)
    -> Result<ToggleOutcome, RepoError>;

    /// Post ids the user has reacted to.
    async fn reactions_by_user(&self, user_id: &str) -> Result<Vec<Uuid>, RepoError>;

    /// Reaction edges on the given posts, excluding one user's own.
    async fn reactions_on_posts(
        &self,
        post_ids: &[Uuid],
        exclude_user: &str,
    ) -> Result<Vec<ReactionEdge>, RepoError>;

    /// Every reaction edge authored by the given users.
    async fn reactions_of_users(&self, user_ids: &[String]) -> Result<Vec<ReactionEdge>, RepoError>;
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn find_snapshot(&self, user_id: &str) -> Result<Option<AuthorSnapshot>, RepoError>;

    /// Snapshots for many users at once; missing ids are absent.
    async fn snapshots_by_ids(&self, user_ids: &[String])
    -> Result<Vec<AuthorSnapshot>, RepoError>;

    async fn find_by_username(&self, username: &str)
    -> Result<Option<AuthorSnapshot>, RepoError>;

    /// Case-insensitive substring search over usernames and display
    /// names.
    async fn search_users(&self, query: &str) -> Result<Vec<AuthorSnapshot>, RepoError>;
}

#[async_trait]
pub trait ReportsRepo: Send + Sync {
    /// Record a report and bump the post's report counter. Duplicate
    /// reports by the same user are accepted and counted again.
    async fn insert_report(
        &self,
        post_id: Uuid,
        reporter_id: &str,
        reason: Option<String>,
    ) -> Result<i64, RepoError>;

    /// Recompute every post's `report_count` from the reports table.
    /// Returns the number of posts updated.
    async fn backfill_report_counts(&self) -> Result<u64, RepoError>;
}
