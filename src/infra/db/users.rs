use async_trait::async_trait;

use crate::application::repos::{RepoError, UsersRepo};
use crate::domain::posts::AuthorSnapshot;

use super::PostgresRepositories;
use super::util::map_sqlx_error;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    username: String,
    display_name: Option<String>,
    photo_url: Option<String>,
}

impl From<UserRow> for AuthorSnapshot {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            display_name: row.display_name,
            photo_url: row.photo_url,
        }
    }
}

#[async_trait]
impl UsersRepo for PostgresRepositories {
    async fn find_snapshot(&self, user_id: &str) -> Result<Option<AuthorSnapshot>, RepoError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, display_name, photo_url FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.map(AuthorSnapshot::from))
    }

    async fn snapshots_by_ids(
        &self,
        user_ids: &[String],
    ) -> Result<Vec<AuthorSnapshot>, RepoError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<UserRow> = sqlx::query_as(
            "SELECT id, username, display_name, photo_url FROM users WHERE id = ANY($1)",
        )
        .bind(user_ids)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(AuthorSnapshot::from).collect())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AuthorSnapshot>, RepoError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, display_name, photo_url FROM users \
             WHERE LOWER(username) = LOWER($1)",
        )
        .bind(username)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.map(AuthorSnapshot::from))
    }

    async fn search_users(&self, query: &str) -> Result<Vec<AuthorSnapshot>, RepoError> {
        let pattern = format!("%{query}%");
        let rows: Vec<UserRow> = sqlx::query_as(
            "SELECT id, username, display_name, photo_url FROM users \
             WHERE username ILIKE $1 OR display_name ILIKE $1 \
             ORDER BY username ASC LIMIT 50",
        )
        .bind(&pattern)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(AuthorSnapshot::from).collect())
    }
}
