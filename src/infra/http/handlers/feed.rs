use axum::Json;
use axum::extract::{Query, State};
use axum::response::IntoResponse;

use crate::infra::http::ApiState;
use crate::infra::http::error::ApiError;
use crate::infra::http::models::FeedQuery;

pub async fn get_feed(
    State(state): State<ApiState>,
    Query(query): Query<FeedQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let category = query.category()?;
    let sort = query.sort()?;
    let response = state
        .feed
        .feed(category, sort, query.user_id.as_deref())
        .await?;
    Ok(Json(response))
}
