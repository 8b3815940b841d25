//! Request and response shapes for the JSON API.

use serde::Deserialize;

use super::error::ApiError;
use crate::domain::types::{Category, FeedSort};

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub category: Option<String>,
    pub sort_by: Option<String>,
    pub user_id: Option<String>,
}

impl FeedQuery {
    pub fn category(&self) -> Result<Category, ApiError> {
        match self.category.as_deref() {
            None => Ok(Category::All),
            Some(raw) => Category::try_from(raw)
                .map_err(|_| ApiError::bad_request(format!("unknown category `{raw}`"))),
        }
    }

    pub fn sort(&self) -> Result<FeedSort, ApiError> {
        match self.sort_by.as_deref() {
            None => Ok(FeedSort::New),
            Some(raw) => FeedSort::try_from(raw)
                .map_err(|_| ApiError::bad_request(format!("unknown sort `{raw}`"))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePostBody {
    pub author_id: String,
    pub content: String,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
}

/// Owner-gated operations carry the acting user in the body (or query
/// for DELETE); there is no session layer in front of this service.
#[derive(Debug, Deserialize)]
pub struct ActorBody {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ActorQuery {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ReportBody {
    pub post_id: uuid::Uuid,
    pub reporter_id: String,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}
