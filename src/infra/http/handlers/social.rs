use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use uuid::Uuid;

use crate::infra::http::ApiState;
use crate::infra::http::error::ApiError;
use crate::infra::http::models::{ActorBody, ReportBody};

pub async fn react(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(actor): Json<ActorBody>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .interactions
        .toggle_reaction(id, &actor.user_id)
        .await?;
    Ok(Json(result))
}

pub async fn downvote(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(actor): Json<ActorBody>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .interactions
        .toggle_downvote(id, &actor.user_id)
        .await?;
    Ok(Json(result))
}

pub async fn view(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.interactions.record_view(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn file_report(
    State(state): State<ApiState>,
    Json(body): Json<ReportBody>,
) -> Result<impl IntoResponse, ApiError> {
    let report_count = state
        .reports
        .file_report(body.post_id, &body.reporter_id, body.reason)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "report_count": report_count })),
    ))
}
