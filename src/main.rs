use std::process;
use std::sync::Arc;

use candor::{
    application::{
        error::AppError,
        feed::FeedService,
        interactions::InteractionService,
        posts::PostService,
        profile::ProfileService,
        reports::ReportService,
        repos::{InteractionsRepo, PostsRepo, PostsWriteRepo, ReportsRepo, UsersRepo},
        search::SearchService,
        trending::TrendingService,
    },
    cache::{CacheConsumer, CacheTrigger, EventQueue, FeedStore},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState},
        moderation::{HttpModerationGate, ModerationGate, WordListGate},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(config::ServeArgs::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::BackfillReports(_) => run_backfill(settings).await,
    }
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool =
        PostgresRepositories::connect(database_url, settings.database.max_connections.get())
            .await
            .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_state(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> Result<ApiState, AppError> {
    let posts_repo: Arc<dyn PostsRepo> = repositories.clone();
    let posts_write_repo: Arc<dyn PostsWriteRepo> = repositories.clone();
    let interactions_repo: Arc<dyn InteractionsRepo> = repositories.clone();
    let users_repo: Arc<dyn UsersRepo> = repositories.clone();
    let reports_repo: Arc<dyn ReportsRepo> = repositories.clone();

    let store = Arc::new(FeedStore::new(&settings.cache));
    let queue = Arc::new(EventQueue::new());
    let consumer = Arc::new(CacheConsumer::new(
        settings.cache.clone(),
        store.clone(),
        queue.clone(),
    ));
    let trigger = Arc::new(CacheTrigger::new(settings.cache.clone(), queue, consumer));

    let moderation: Arc<dyn ModerationGate> = match settings.moderation.endpoint.as_ref() {
        Some(endpoint) => Arc::new(
            HttpModerationGate::new(endpoint.clone(), settings.moderation.timeout)
                .map_err(AppError::from)?,
        ),
        None => Arc::new(WordListGate),
    };

    let feed = Arc::new(FeedService::new(
        posts_repo.clone(),
        interactions_repo.clone(),
        users_repo.clone(),
        store,
        settings.cache.clone(),
        settings.feed.enrich_timeout,
    ));
    let posts = Arc::new(PostService::new(
        posts_repo.clone(),
        posts_write_repo.clone(),
        users_repo.clone(),
        moderation,
        trigger,
    ));
    let interactions = Arc::new(InteractionService::new(
        posts_repo.clone(),
        posts_write_repo,
        interactions_repo,
    ));
    let reports = Arc::new(ReportService::new(posts_repo.clone(), reports_repo));
    let search = Arc::new(SearchService::new(posts_repo.clone(), users_repo.clone()));
    let profiles = Arc::new(ProfileService::new(posts_repo.clone(), users_repo));
    let trending = Arc::new(TrendingService::new(posts_repo));

    Ok(ApiState {
        feed,
        posts,
        interactions,
        reports,
        search,
        profiles,
        trending,
        db: repositories,
    })
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let state = build_state(repositories, &settings)?;
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(addr = %settings.server.addr, "listening");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to install shutdown handler");
        return;
    }
    info!("shutdown signal received");
}

async fn run_backfill(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let posts_repo: Arc<dyn PostsRepo> = repositories.clone();
    let reports_repo: Arc<dyn ReportsRepo> = repositories;

    let reports = ReportService::new(posts_repo, reports_repo);
    let updated = reports.backfill_report_counts().await?;
    info!(updated, "backfill finished");
    Ok(())
}
