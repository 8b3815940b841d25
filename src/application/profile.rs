//! User profiles: identity, authored posts, aggregate stats.

use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;

use crate::domain::posts::{FeedPost, PostRecord};

use super::error::AppError;
use super::repos::{PostsRepo, RepoError, UsersRepo};
use super::search::UserSummary;

const REPUTATION_PER_POST: i64 = 10;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProfileStats {
    pub total_posts: i64,
    pub total_views: i64,
    pub reputation: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user: UserSummary,
    pub posts: Vec<FeedPost>,
    pub stats: ProfileStats,
}

pub struct ProfileService {
    posts: Arc<dyn PostsRepo>,
    users: Arc<dyn UsersRepo>,
}

impl ProfileService {
    pub fn new(posts: Arc<dyn PostsRepo>, users: Arc<dyn UsersRepo>) -> Self {
        Self { posts, users }
    }

    /// Profile by user id. Anonymous posts stay ghost-shielded even on
    /// the author's own profile surface; stats still count them.
    #[instrument(skip(self))]
    pub async fn profile(&self, user_id: &str) -> Result<Profile, AppError> {
        let user = self
            .users
            .find_snapshot(user_id)
            .await?
            .ok_or(RepoError::NotFound)?;
        self.assemble(user).await
    }

    #[instrument(skip(self))]
    pub async fn profile_by_username(&self, username: &str) -> Result<Profile, AppError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(RepoError::NotFound)?;
        self.assemble(user).await
    }

    async fn assemble(
        &self,
        user: crate::domain::posts::AuthorSnapshot,
    ) -> Result<Profile, AppError> {
        let records = self.posts.posts_by_author(&user.id).await?;
        let stats = Self::stats(&records);
        let posts = records.into_iter().map(FeedPost::from_record).collect();
        Ok(Profile {
            user: UserSummary::from(user),
            posts,
            stats,
        })
    }

    fn stats(records: &[PostRecord]) -> ProfileStats {
        let total_posts = records.len() as i64;
        let total_views: i64 = records.iter().map(|record| record.view_count).sum();
        ProfileStats {
            total_posts,
            total_views,
            reputation: total_posts * REPUTATION_PER_POST + total_views,
        }
    }
}
