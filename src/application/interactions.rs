//! Reaction, downvote, and view recording.
//!
//! Interaction counters never invalidate the feed cache; a feed may be
//! stale by at most one TTL window, which the product accepts in
//! exchange for cheap high-frequency writes.

use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::types::InteractionKind;

use super::error::AppError;
use super::repos::{InteractionsRepo, PostsRepo, PostsWriteRepo, RepoError};

/// Toggle result returned to the client so it can update its local
/// state without refetching.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ToggleResult {
    pub active: bool,
    pub removed_opposite: bool,
}

pub struct InteractionService {
    posts: Arc<dyn PostsRepo>,
    writes: Arc<dyn PostsWriteRepo>,
    interactions: Arc<dyn InteractionsRepo>,
}

impl InteractionService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        writes: Arc<dyn PostsWriteRepo>,
        interactions: Arc<dyn InteractionsRepo>,
    ) -> Self {
        Self {
            posts,
            writes,
            interactions,
        }
    }

    /// Toggle the user's reaction on a post. Removes an existing
    /// downvote by the same user in the same transaction, so the two
    /// edges stay mutually exclusive and every counter moves by at
    /// most one.
    #[instrument(skip(self))]
    pub async fn toggle_reaction(
        &self,
        post_id: Uuid,
        user_id: &str,
    ) -> Result<ToggleResult, AppError> {
        self.require_post(post_id).await?;
        let outcome = self.interactions.toggle_reaction(post_id, user_id).await?;
        Ok(ToggleResult {
            active: outcome.active,
            removed_opposite: outcome.removed_opposite,
        })
    }

    /// Toggle the user's downvote, removing any reaction edge in the
    /// same transaction.
    #[instrument(skip(self))]
    pub async fn toggle_downvote(
        &self,
        post_id: Uuid,
        user_id: &str,
    ) -> Result<ToggleResult, AppError> {
        self.require_post(post_id).await?;
        let outcome = self.interactions.toggle_downvote(post_id, user_id).await?;
        Ok(ToggleResult {
            active: outcome.active,
            removed_opposite: outcome.removed_opposite,
        })
    }

    /// Record a view: a plain atomic increment, no edge, no toggle.
    #[instrument(skip(self))]
    pub async fn record_view(&self, post_id: Uuid) -> Result<(), AppError> {
        self.require_post(post_id).await?;
        self.writes
            .adjust_counter(post_id, InteractionKind::View, 1)
            .await?;
        Ok(())
    }

    async fn require_post(&self, post_id: Uuid) -> Result<(), AppError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or(RepoError::NotFound)?;
        Ok(())
    }
}
