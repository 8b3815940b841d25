use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::posts::NewPost;
use crate::domain::types::Category;
use crate::infra::http::ApiState;
use crate::infra::http::error::ApiError;
use crate::infra::http::models::{ActorBody, ActorQuery, CreatePostBody};

pub async fn create_post(
    State(state): State<ApiState>,
    Json(body): Json<CreatePostBody>,
) -> Result<impl IntoResponse, ApiError> {
    let category = body
        .category
        .as_deref()
        .map(Category::try_from)
        .transpose()
        .map_err(|_| ApiError::bad_request("unknown category"))?;

    let post = state
        .posts
        .create_post(NewPost {
            author_id: body.author_id,
            content: body.content,
            category,
            tags: body.tags,
            image_url: body.image_url,
            is_anonymous: body.is_anonymous,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn get_post(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.posts.get_post(id).await?;
    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Query(actor): Query<ActorQuery>,
) -> Result<impl IntoResponse, ApiError> {
    state.posts.delete_post(id, &actor.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn archive_post(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(actor): Json<ActorBody>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.posts.archive_post(id, &actor.user_id).await?;
    Ok(Json(post))
}

pub async fn unarchive_post(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(actor): Json<ActorBody>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.posts.unarchive_post(id, &actor.user_id).await?;
    Ok(Json(post))
}
