//! HTTP surface: a JSON API over the feed, post, and profile services.

pub mod error;
pub mod handlers;
pub mod models;

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::error;

use crate::application::feed::FeedService;
use crate::application::interactions::InteractionService;
use crate::application::posts::PostService;
use crate::application::profile::ProfileService;
use crate::application::reports::ReportService;
use crate::application::search::SearchService;
use crate::application::trending::TrendingService;
use crate::infra::db::PostgresRepositories;

#[derive(Clone)]
pub struct ApiState {
    pub feed: Arc<FeedService>,
    pub posts: Arc<PostService>,
    pub interactions: Arc<InteractionService>,
    pub reports: Arc<ReportService>,
    pub search: Arc<SearchService>,
    pub profiles: Arc<ProfileService>,
    pub trending: Arc<TrendingService>,
    pub db: Arc<PostgresRepositories>,
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/feed", get(handlers::feed::get_feed))
        .route("/posts", post(handlers::posts::create_post))
        .route(
            "/posts/{id}",
            get(handlers::posts::get_post).delete(handlers::posts::delete_post),
        )
        .route("/posts/{id}/archive", post(handlers::posts::archive_post))
        .route(
            "/posts/{id}/unarchive",
            post(handlers::posts::unarchive_post),
        )
        .route("/posts/{id}/react", post(handlers::social::react))
        .route("/posts/{id}/downvote", post(handlers::social::downvote))
        .route("/posts/{id}/view", post(handlers::social::view))
        .route("/reports", post(handlers::social::file_report))
        .route("/search", get(handlers::discovery::search))
        .route(
            "/users/{user_id}/profile",
            get(handlers::discovery::profile),
        )
        .route(
            "/users/username/{username}",
            get(handlers::discovery::profile_by_username),
        )
        .route("/stats/trending", get(handlers::discovery::trending))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn healthz(State(state): State<ApiState>) -> Response {
    match state.db.health_check().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            error!(error = %err, "health check failed");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}
