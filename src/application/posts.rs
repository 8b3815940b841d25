//! Post lifecycle: creation with moderation and classification,
//! archive/unarchive, delete.

use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::cache::CacheTrigger;
use crate::domain::classify::{classify_category, extract_tags};
use crate::domain::error::DomainError;
use crate::domain::posts::FeedPost;
use crate::domain::types::Category;
use crate::infra::moderation::ModerationGate;

use super::error::AppError;
use super::repos::{CreatePostParams, PostsRepo, PostsWriteRepo, RepoError, UsersRepo};

const MAX_CONTENT_CHARS: usize = 5_000;

#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: String,
    pub content: String,
    /// `None` or `All` means "classify from content".
    pub category: Option<Category>,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub is_anonymous: bool,
}

pub struct PostService {
    posts: Arc<dyn PostsRepo>,
    writes: Arc<dyn PostsWriteRepo>,
    users: Arc<dyn UsersRepo>,
    moderation: Arc<dyn ModerationGate>,
    trigger: Arc<CacheTrigger>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        writes: Arc<dyn PostsWriteRepo>,
        users: Arc<dyn UsersRepo>,
        moderation: Arc<dyn ModerationGate>,
        trigger: Arc<CacheTrigger>,
    ) -> Self {
        Self {
            posts,
            writes,
            users,
            moderation,
            trigger,
        }
    }

    /// Create a post. A post the moderation gate rejects is still
    /// persisted, flagged `is_rejected`, and excluded from every feed;
    /// the author sees it on their own profile only.
    #[instrument(skip(self, new_post), fields(author_id = %new_post.author_id))]
    pub async fn create_post(&self, new_post: NewPost) -> Result<FeedPost, AppError> {
        let content = new_post.content.trim();
        if content.is_empty() {
            return Err(AppError::validation("post content must not be empty"));
        }
        if content.chars().count() > MAX_CONTENT_CHARS {
            return Err(AppError::validation("post content exceeds maximum length"));
        }

        let author = self
            .users
            .find_snapshot(&new_post.author_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user"))?;

        // Fail open: a gate outage must not block posting.
        let is_rejected = match self.moderation.is_toxic(content).await {
            Ok(toxic) => toxic,
            Err(err) => {
                warn!(error = %err, "moderation gate unavailable, accepting post");
                false
            }
        };

        let category = match new_post.category {
            Some(category) if !category.is_aggregate() => category,
            _ => classify_category(content),
        };
        let tags = if new_post.tags.is_empty() {
            extract_tags(content)
        } else {
            new_post.tags
        };

        let record = self
            .writes
            .insert_post(CreatePostParams {
                author,
                content: content.to_string(),
                category,
                tags,
                image_url: new_post.image_url,
                is_anonymous: new_post.is_anonymous,
                is_rejected,
            })
            .await?;

        info!(
            post_id = %record.id,
            category = category.as_str(),
            is_rejected,
            "post created"
        );

        // Rejected posts never enter a feed, so there is nothing to
        // invalidate for them.
        if !is_rejected {
            self.trigger.post_created(record.id, record.category);
        }

        Ok(FeedPost::from_record(record))
    }

    pub async fn get_post(&self, id: Uuid) -> Result<FeedPost, AppError> {
        let record = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or(RepoError::NotFound)?;
        Ok(FeedPost::from_record(record))
    }

    #[instrument(skip(self))]
    pub async fn archive_post(&self, id: Uuid, user_id: &str) -> Result<FeedPost, AppError> {
        let record = self.owned_post(id, user_id).await?;
        let updated = self.writes.set_archived(record.id, true).await?;
        self.trigger.post_archived(updated.id, updated.category);
        Ok(FeedPost::from_record(updated))
    }

    #[instrument(skip(self))]
    pub async fn unarchive_post(&self, id: Uuid, user_id: &str) -> Result<FeedPost, AppError> {
        let record = self.owned_post(id, user_id).await?;
        let updated = self.writes.set_archived(record.id, false).await?;
        self.trigger.post_unarchived(updated.id, updated.category);
        Ok(FeedPost::from_record(updated))
    }

    #[instrument(skip(self))]
    pub async fn delete_post(&self, id: Uuid, user_id: &str) -> Result<(), AppError> {
        let record = self.owned_post(id, user_id).await?;
        self.writes.delete_post(record.id).await?;
        info!(post_id = %record.id, "post deleted");
        self.trigger.post_deleted(record.id, record.category);
        Ok(())
    }

    async fn owned_post(
        &self,
        id: Uuid,
        user_id: &str,
    ) -> Result<crate::domain::posts::PostRecord, AppError> {
        let record = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or(RepoError::NotFound)?;
        if record.author_id != user_id {
            return Err(
                DomainError::permission_denied("only the author may modify this post").into(),
            );
        }
        Ok(record)
    }
}
