use async_trait::async_trait;
use uuid::Uuid;

use crate::application::repos::{RepoError, ReportsRepo};

use super::PostgresRepositories;
use super::util::map_sqlx_error;

#[async_trait]
impl ReportsRepo for PostgresRepositories {
    async fn insert_report(
        &self,
        post_id: Uuid,
        reporter_id: &str,
        reason: Option<String>,
    ) -> Result<i64, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        sqlx::query(
            "INSERT INTO reports (id, post_id, reporter_id, reason, created_at) \
             VALUES ($1, $2, $3, $4, now())",
        )
        .bind(Uuid::new_v4())
        .bind(post_id)
        .bind(reporter_id)
        .bind(&reason)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let (report_count,): (i64,) = sqlx::query_as(
            "UPDATE posts SET report_count = report_count + 1 WHERE id = $1 \
             RETURNING report_count",
        )
        .bind(post_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(report_count)
    }

    async fn backfill_report_counts(&self) -> Result<u64, RepoError> {
        // Full recompute from the source of truth; covers rows imported
        // before the counter column existed.
        let result = sqlx::query(
            "UPDATE posts p SET report_count = r.tally \
             FROM (SELECT post_id, COUNT(*) AS tally FROM reports GROUP BY post_id) r \
             WHERE p.id = r.post_id AND p.report_count <> r.tally",
        )
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }
}
