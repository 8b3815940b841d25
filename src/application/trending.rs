//! Trending tags across the rankable post population.

use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;

use super::error::AppError;
use super::repos::PostsRepo;

const TRENDING_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct TrendingTag {
    pub tag: String,
    pub count: i64,
}

pub struct TrendingService {
    posts: Arc<dyn PostsRepo>,
}

impl TrendingService {
    pub fn new(posts: Arc<dyn PostsRepo>) -> Self {
        Self { posts }
    }

    /// Top tag frequencies over non-rejected, non-archived posts.
    #[instrument(skip(self))]
    pub async fn trending(&self) -> Result<Vec<TrendingTag>, AppError> {
        let counts = self.posts.tag_counts(TRENDING_LIMIT).await?;
        Ok(counts
            .into_iter()
            .map(|(tag, count)| TrendingTag { tag, count })
            .collect())
    }
}
