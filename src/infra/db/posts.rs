use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{
    CreatePostParams, PostsRepo, PostsWriteRepo, RepoError,
};
use crate::domain::posts::PostRecord;
use crate::domain::types::{Category, InteractionKind};

use super::PostgresRepositories;
use super::util::map_sqlx_error;

const POST_COLUMNS: &str = "id, author_id, author_name, author_handle, author_avatar, \
    content, category, tags, image_url, is_anonymous, reaction_count, downvote_count, \
    report_count, view_count, is_rejected, is_archived, created_at";

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    author_id: String,
    author_name: String,
    author_handle: String,
    author_avatar: Option<String>,
    content: String,
    category: String,
    tags: Vec<String>,
    image_url: Option<String>,
    is_anonymous: bool,
    reaction_count: i64,
    downvote_count: i64,
    report_count: i64,
    view_count: i64,
    is_rejected: bool,
    is_archived: bool,
    created_at: OffsetDateTime,
}

impl TryFrom<PostRow> for PostRecord {
    type Error = RepoError;

    fn try_from(row: PostRow) -> Result<Self, RepoError> {
        let category = Category::try_from(row.category.as_str())
            .map_err(|_| RepoError::integrity(format!("unknown category `{}`", row.category)))?;
        Ok(Self {
            id: row.id,
            author_id: row.author_id,
            author_name: row.author_name,
            author_handle: row.author_handle,
            author_avatar: row.author_avatar,
            content: row.content,
            category,
            tags: row.tags,
            image_url: row.image_url,
            is_anonymous: row.is_anonymous,
            reaction_count: row.reaction_count,
            downvote_count: row.downvote_count,
            report_count: row.report_count,
            view_count: row.view_count,
            is_rejected: row.is_rejected,
            is_archived: row.is_archived,
            created_at: row.created_at,
        })
    }
}

fn collect_records(rows: Vec<PostRow>) -> Result<Vec<PostRecord>, RepoError> {
    rows.into_iter().map(PostRecord::try_from).collect()
}

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn list_candidates(&self, category: Category) -> Result<Vec<PostRecord>, RepoError> {
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE NOT is_rejected AND NOT is_archived"
        ));
        if !category.is_aggregate() {
            qb.push(" AND category = ");
            qb.push_bind(category.as_str());
        }
        qb.push(" ORDER BY created_at DESC");

        let rows: Vec<PostRow> = qb
            .build_query_as()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        collect_records(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        let row: Option<PostRow> = sqlx::query_as(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        row.map(PostRecord::try_from).transpose()
    }

    async fn posts_by_ids(&self, ids: &[Uuid]) -> Result<Vec<PostRecord>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<PostRow> = sqlx::query_as(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        collect_records(rows)
    }

    async fn posts_by_author(&self, author_id: &str) -> Result<Vec<PostRecord>, RepoError> {
        let rows: Vec<PostRow> = sqlx::query_as(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE author_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(author_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        collect_records(rows)
    }

    async fn search_posts(&self, query: &str) -> Result<Vec<PostRecord>, RepoError> {
        let pattern = format!("%{query}%");
        let rows: Vec<PostRow> = sqlx::query_as(&format!(
            "SELECT {POST_COLUMNS} FROM posts \
             WHERE NOT is_rejected AND NOT is_archived \
               AND (content ILIKE $1 \
                    OR category ILIKE $1 \
                    OR author_handle ILIKE $1 \
                    OR EXISTS (SELECT 1 FROM unnest(tags) tag WHERE tag ILIKE $1)) \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(&pattern)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        collect_records(rows)
    }

    async fn tag_counts(&self, limit: usize) -> Result<Vec<(String, i64)>, RepoError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT tag, COUNT(*) AS uses FROM posts, unnest(tags) tag \
             WHERE NOT is_rejected AND NOT is_archived \
             GROUP BY tag ORDER BY uses DESC, tag ASC LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows)
    }
}

#[async_trait]
impl PostsWriteRepo for PostgresRepositories {
    async fn insert_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let author_name = params
            .author
            .display_name
            .clone()
            .unwrap_or_else(|| params.author.username.clone());
        let author_handle = format!("@{}", params.author.username);

        let row: PostRow = sqlx::query_as(&format!(
            "INSERT INTO posts (id, author_id, author_name, author_handle, author_avatar, \
                 content, category, tags, image_url, is_anonymous, is_rejected, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, now()) \
             RETURNING {POST_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&params.author.id)
        .bind(&author_name)
        .bind(&author_handle)
        .bind(&params.author.photo_url)
        .bind(&params.content)
        .bind(params.category.as_str())
        .bind(&params.tags)
        .bind(&params.image_url)
        .bind(params.is_anonymous)
        .bind(params.is_rejected)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        PostRecord::try_from(row)
    }

    async fn set_archived(&self, id: Uuid, archived: bool) -> Result<PostRecord, RepoError> {
        let row: PostRow = sqlx::query_as(&format!(
            "UPDATE posts SET is_archived = $2 WHERE id = $1 RETURNING {POST_COLUMNS}"
        ))
        .bind(id)
        .bind(archived)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        PostRecord::try_from(row)
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn adjust_counter(
        &self,
        id: Uuid,
        kind: InteractionKind,
        delta: i64,
    ) -> Result<(), RepoError> {
        let column = match kind {
            InteractionKind::Reaction => "reaction_count",
            InteractionKind::Downvote => "downvote_count",
            InteractionKind::View => "view_count",
        };
        // Relative update: commutes with concurrent deltas, never
        // read-modify-write.
        let result = sqlx::query(&format!(
            "UPDATE posts SET {column} = GREATEST({column} + $2, 0) WHERE id = $1"
        ))
        .bind(id)
        .bind(delta)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
