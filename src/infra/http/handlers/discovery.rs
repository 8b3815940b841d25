use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;

use crate::infra::http::ApiState;
use crate::infra::http::error::ApiError;
use crate::infra::http::models::SearchQuery;

pub async fn search(
    State(state): State<ApiState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let results = state.search.search(&query.q).await?;
    Ok(Json(results))
}

pub async fn profile(
    State(state): State<ApiState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state.profiles.profile(&user_id).await?;
    Ok(Json(profile))
}

pub async fn profile_by_username(
    State(state): State<ApiState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state.profiles.profile_by_username(&username).await?;
    Ok(Json(profile))
}

pub async fn trending(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let tags = state.trending.trending().await?;
    Ok(Json(tags))
}
