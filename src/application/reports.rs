//! Report filing and the report-count backfill.

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use super::error::AppError;
use super::repos::{PostsRepo, RepoError, ReportsRepo};

pub struct ReportService {
    posts: Arc<dyn PostsRepo>,
    reports: Arc<dyn ReportsRepo>,
}

impl ReportService {
    pub fn new(posts: Arc<dyn PostsRepo>, reports: Arc<dyn ReportsRepo>) -> Self {
        Self { posts, reports }
    }

    /// File a report against a post. The report counter moves with the
    /// insert; feeds pick the new count up on their next recompute, so
    /// no invalidation fires here. Returns the post's new report count.
    #[instrument(skip(self, reason))]
    pub async fn file_report(
        &self,
        post_id: Uuid,
        reporter_id: &str,
        reason: Option<String>,
    ) -> Result<i64, AppError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or(RepoError::NotFound)?;
        let report_count = self
            .reports
            .insert_report(post_id, reporter_id, reason)
            .await?;
        info!(%post_id, report_count, "report filed");
        Ok(report_count)
    }

    /// Recompute every post's report counter from the reports table.
    /// Run as a one-shot maintenance command after importing data that
    /// predates the counter column.
    pub async fn backfill_report_counts(&self) -> Result<u64, AppError> {
        let updated = self.reports.backfill_report_counts().await?;
        info!(updated, "report count backfill complete");
        Ok(updated)
    }
}
