//! Combined user and post search.

use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;

use crate::domain::posts::{AuthorSnapshot, FeedPost};

use super::error::AppError;
use super::repos::{PostsRepo, UsersRepo};

const MIN_QUERY_CHARS: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

impl From<AuthorSnapshot> for UserSummary {
    fn from(snapshot: AuthorSnapshot) -> Self {
        Self {
            id: snapshot.id,
            username: snapshot.username,
            display_name: snapshot.display_name,
            photo_url: snapshot.photo_url,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub users: Vec<UserSummary>,
    pub posts: Vec<FeedPost>,
}

pub struct SearchService {
    posts: Arc<dyn PostsRepo>,
    users: Arc<dyn UsersRepo>,
}

impl SearchService {
    pub fn new(posts: Arc<dyn PostsRepo>, users: Arc<dyn UsersRepo>) -> Self {
        Self { posts, users }
    }

    /// Case-insensitive substring search across users and posts.
    ///
    /// An anonymous post whose hidden author handle matches the query
    /// is dropped outright, even if its content also matches: surfacing
    /// it would confirm who wrote it.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<SearchResponse, AppError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Err(AppError::validation(
                "search query must be at least 3 characters",
            ));
        }
        let query_lower = query.to_lowercase();

        let users = self
            .users
            .search_users(query)
            .await?
            .into_iter()
            .map(UserSummary::from)
            .collect();

        let posts = self
            .posts
            .search_posts(query)
            .await?
            .into_iter()
            .filter(|record| {
                !(record.is_anonymous
                    && record.author_handle.to_lowercase().contains(&query_lower))
            })
            .map(FeedPost::from_record)
            .collect();

        Ok(SearchResponse { users, posts })
    }
}
