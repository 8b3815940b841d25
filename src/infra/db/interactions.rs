use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::application::repos::{InteractionsRepo, RepoError, ToggleOutcome};
use crate::domain::ranking::ReactionEdge;

use super::PostgresRepositories;
use super::util::map_sqlx_error;

/// One edge table plus the counter column it mirrors.
struct EdgeTables {
    own: &'static str,
    own_counter: &'static str,
    opposite: &'static str,
    opposite_counter: &'static str,
}

const REACTION_TABLES: EdgeTables = EdgeTables {
    own: "reactions",
    own_counter: "reaction_count",
    opposite: "downvotes",
    opposite_counter: "downvote_count",
};

const DOWNVOTE_TABLES: EdgeTables = EdgeTables {
    own: "downvotes",
    own_counter: "downvote_count",
    opposite: "reactions",
    opposite_counter: "reaction_count",
};

/// Flip one edge inside a transaction, keeping it mutually exclusive
/// with its opposite. Counter deltas ride in the same transaction, so
/// each counter moves by at most one per call.
async fn toggle_edge(
    tx: &mut Transaction<'_, Postgres>,
    tables: &EdgeTables,
    post_id: Uuid,
    user_id: &str,
) -> Result<ToggleOutcome, sqlx::Error> {
    let removed = sqlx::query(&format!(
        "DELETE FROM {} WHERE post_id = $1 AND user_id = $2",
        tables.own
    ))
    .bind(post_id)
    .bind(user_id)
    .execute(&mut **tx)
    .await?
    .rows_affected();

    if removed > 0 {
        sqlx::query(&format!(
            "UPDATE posts SET {0} = GREATEST({0} - 1, 0) WHERE id = $1",
            tables.own_counter
        ))
        .bind(post_id)
        .execute(&mut **tx)
        .await?;
        return Ok(ToggleOutcome {
            active: false,
            removed_opposite: false,
        });
    }

    sqlx::query(&format!(
        "INSERT INTO {} (post_id, user_id, created_at) VALUES ($1, $2, now())",
        tables.own
    ))
    .bind(post_id)
    .bind(user_id)
    .execute(&mut **tx)
    .await?;
    sqlx::query(&format!(
        "UPDATE posts SET {0} = {0} + 1 WHERE id = $1",
        tables.own_counter
    ))
    .bind(post_id)
    .execute(&mut **tx)
    .await?;

    let removed_opposite = sqlx::query(&format!(
        "DELETE FROM {} WHERE post_id = $1 AND user_id = $2",
        tables.opposite
    ))
    .bind(post_id)
    .bind(user_id)
    .execute(&mut **tx)
    .await?
    .rows_affected()
        > 0;
    if removed_opposite {
        sqlx::query(&format!(
            "UPDATE posts SET {0} = GREATEST({0} - 1, 0) WHERE id = $1",
            tables.opposite_counter
        ))
        .bind(post_id)
        .execute(&mut **tx)
        .await?;
    }

    Ok(ToggleOutcome {
        active: true,
        removed_opposite,
    })
}

impl PostgresRepositories {
    async fn toggle(
        &self,
        tables: &EdgeTables,
        post_id: Uuid,
        user_id: &str,
    ) -> Result<ToggleOutcome, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;
        let outcome = toggle_edge(&mut tx, tables, post_id, user_id)
            .await
            .map_err(map_sqlx_error)?;
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(outcome)
    }
}

#[async_trait]
impl InteractionsRepo for PostgresRepositories {
    async fn toggle_reaction(
        &self,
        post_id: Uuid,
        user_id: &str,
    ) -> Result<ToggleOutcome, RepoError> {
        self.toggle(&REACTION_TABLES, post_id, user_id).await
    }

    async fn toggle_downvote(
        &self,
        post_id: Uuid,
        user_id: &str,
    ) -> Result<ToggleOutcome, RepoError> {
        self.toggle(&DOWNVOTE_TABLES, post_id, user_id).await
    }

    async fn reactions_by_user(&self, user_id: &str) -> Result<Vec<Uuid>, RepoError> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            "SELECT post_id FROM reactions WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn reactions_on_posts(
        &self,
        post_ids: &[Uuid],
        exclude_user: &str,
    ) -> Result<Vec<ReactionEdge>, RepoError> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<(String, Uuid)> = sqlx::query_as(
            "SELECT user_id, post_id FROM reactions WHERE post_id = ANY($1) AND user_id <> $2",
        )
        .bind(post_ids)
        .bind(exclude_user)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows
            .into_iter()
            .map(|(user_id, post_id)| ReactionEdge { user_id, post_id })
            .collect())
    }

    async fn reactions_of_users(
        &self,
        user_ids: &[String],
    ) -> Result<Vec<ReactionEdge>, RepoError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<(String, Uuid)> =
            sqlx::query_as("SELECT user_id, post_id FROM reactions WHERE user_id = ANY($1)")
                .bind(user_ids)
                .fetch_all(self.pool())
                .await
                .map_err(map_sqlx_error)?;
        Ok(rows
            .into_iter()
            .map(|(user_id, post_id)| ReactionEdge { user_id, post_id })
            .collect())
    }
}
