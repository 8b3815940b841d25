//! Post records, enriched feed snapshots, and ghost shielding.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::types::Category;

/// Fixed placeholder identity for anonymous authors. Applied after
/// every enrichment step so a stale author join can never leak.
pub const GHOST_NAME: &str = "Anonymous";
pub const GHOST_HANDLE: &str = "@ghost";
pub const GHOST_AVATAR: &str = "/assets/ghost_avatar.png";

/// A post as stored in the signal store.
///
/// Counters are adjusted only through atomic increments; they are never
/// recomputed by full re-aggregation outside the report backfill.
#[derive(Debug, Clone)]
pub struct PostRecord {
    pub id: Uuid,
    pub author_id: String,
    /// Display name captured at creation; refreshed from the author
    /// snapshot during enrichment.
    pub author_name: String,
    pub author_handle: String,
    pub author_avatar: Option<String>,
    pub content: String,
    pub category: Category,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub is_anonymous: bool,
    pub reaction_count: i64,
    pub downvote_count: i64,
    pub report_count: i64,
    pub view_count: i64,
    pub is_rejected: bool,
    pub is_archived: bool,
    pub created_at: OffsetDateTime,
}

impl PostRecord {
    /// Rejected or archived posts are excluded from every ranked feed
    /// and from the for-you candidate pool.
    pub fn is_rankable(&self) -> bool {
        !self.is_rejected && !self.is_archived
    }
}

/// Current author display snapshot joined during enrichment.
#[derive(Debug, Clone)]
pub struct AuthorSnapshot {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// An enriched post as returned on every read surface.
#[derive(Debug, Clone, Serialize)]
pub struct FeedPost {
    pub id: Uuid,
    pub author_id: Option<String>,
    pub author_name: String,
    pub author_handle: String,
    pub author_avatar: Option<String>,
    pub content: String,
    pub category: Category,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub is_anonymous: bool,
    pub reaction_count: i64,
    pub downvote_count: i64,
    pub report_count: i64,
    pub view_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl FeedPost {
    /// Build the output snapshot from a stored record, without any
    /// author refresh. Shielding still applies.
    pub fn from_record(record: PostRecord) -> Self {
        let mut post = Self {
            id: record.id,
            author_id: Some(record.author_id),
            author_name: record.author_name,
            author_handle: record.author_handle,
            author_avatar: record.author_avatar,
            content: record.content,
            category: record.category,
            tags: record.tags,
            image_url: record.image_url,
            is_anonymous: record.is_anonymous,
            reaction_count: record.reaction_count,
            downvote_count: record.downvote_count,
            report_count: record.report_count,
            view_count: record.view_count,
            created_at: record.created_at,
        };
        post.shield_if_anonymous();
        post
    }

    /// Refresh identity fields from the live author snapshot, then
    /// re-apply shielding. Enrichment must never be able to undo the
    /// ghost placeholder, so the shield always runs last.
    pub fn apply_author_snapshot(&mut self, author: &AuthorSnapshot) {
        self.author_name = author
            .display_name
            .clone()
            .unwrap_or_else(|| author.username.clone());
        self.author_handle = format!("@{}", author.username);
        if author.photo_url.is_some() {
            self.author_avatar = author.photo_url.clone();
        }
        self.shield_if_anonymous();
    }

    /// Overwrite identity fields with the fixed ghost placeholder when
    /// the post is anonymous.
    pub fn shield_if_anonymous(&mut self) {
        if !self.is_anonymous {
            return;
        }
        self.author_id = None;
        self.author_name = GHOST_NAME.to_string();
        self.author_handle = GHOST_HANDLE.to_string();
        self.author_avatar = Some(GHOST_AVATAR.to_string());
    }
}
