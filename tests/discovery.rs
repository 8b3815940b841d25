//! Search, profiles, trending tags, and report filing over in-memory
//! repositories.

mod common;

use std::sync::Arc;

use candor::application::profile::ProfileService;
use candor::application::reports::ReportService;
use candor::application::search::SearchService;
use candor::application::trending::TrendingService;
use candor::cache::FeedCacheConfig;
use candor::domain::posts::GHOST_NAME;
use candor::domain::types::Category;
use time::macros::datetime;

use common::{MemoryRepo, post, test_app};

const T0: time::OffsetDateTime = datetime!(2025-06-01 12:00 UTC);

fn search_service(repo: &Arc<MemoryRepo>) -> SearchService {
    SearchService::new(repo.clone(), repo.clone())
}

#[tokio::test]
async fn short_queries_are_rejected() {
    let app = test_app(FeedCacheConfig::default());
    let search = search_service(&app.repo);

    assert!(search.search("ab").await.is_err());
    assert!(search.search("  a  ").await.is_err());
}

#[tokio::test]
async fn search_matches_users_and_posts() {
    let app = test_app(FeedCacheConfig::default());
    app.repo.add_user("u1", "quietfox");

    let mut matching = post("u1", Category::Career, T0);
    matching.content = "burnout is real in this industry".to_string();
    app.repo.add_post(matching);
    app.repo.add_post(post("u2", Category::Life, T0));

    let search = search_service(&app.repo);
    let response = search.search("burnout").await.expect("search");
    assert!(response.users.is_empty());
    assert_eq!(response.posts.len(), 1);

    let response = search.search("quietfox").await.expect("search");
    assert_eq!(response.users.len(), 1);
}

#[tokio::test]
async fn search_never_unmasks_anonymous_authors() {
    let app = test_app(FeedCacheConfig::default());

    // An anonymous post whose hidden handle matches the query is
    // dropped even though its content matches too.
    let mut anonymous = post("quietfox", Category::Life, T0);
    anonymous.is_anonymous = true;
    anonymous.content = "quietfox was here".to_string();
    app.repo.add_post(anonymous);

    let mut named = post("other", Category::Life, T0);
    named.is_anonymous = true;
    named.content = "searching for quietfox".to_string();
    app.repo.add_post(named);

    let search = search_service(&app.repo);
    let response = search.search("quietfox").await.expect("search");

    assert_eq!(response.posts.len(), 1);
    assert_eq!(response.posts[0].author_name, GHOST_NAME);
}

#[tokio::test]
async fn profile_includes_archived_posts_and_stats() {
    let app = test_app(FeedCacheConfig::default());
    app.repo.add_user("ada", "ada");

    let mut visible = post("ada", Category::Career, T0);
    visible.view_count = 7;
    app.repo.add_post(visible);

    let mut archived = post("ada", Category::Life, T0);
    archived.is_archived = true;
    archived.view_count = 3;
    app.repo.add_post(archived);

    let profiles = ProfileService::new(app.repo.clone(), app.repo.clone());
    let profile = profiles.profile("ada").await.expect("profile");

    assert_eq!(profile.posts.len(), 2);
    assert_eq!(profile.stats.total_posts, 2);
    assert_eq!(profile.stats.total_views, 10);
    assert_eq!(profile.stats.reputation, 30);

    let by_username = profiles.profile_by_username("ADA").await.expect("profile");
    assert_eq!(by_username.user.id, "ada");
}

#[tokio::test]
async fn trending_ranks_tags_by_frequency() {
    let app = test_app(FeedCacheConfig::default());

    for tags in [
        vec!["work", "stress"],
        vec!["work"],
        vec!["startup"],
    ] {
        let mut record = post("ada", Category::Career, T0);
        record.tags = tags.into_iter().map(str::to_string).collect();
        app.repo.add_post(record);
    }

    let trending = TrendingService::new(app.repo.clone());
    let tags = trending.trending().await.expect("trending");

    assert_eq!(tags[0].tag, "work");
    assert_eq!(tags[0].count, 2);
    assert_eq!(tags.len(), 3);
}

#[tokio::test]
async fn filing_reports_moves_the_counter() {
    let app = test_app(FeedCacheConfig::default());
    let post_id = app.repo.add_post(post("ada", Category::Career, T0));

    let reports = ReportService::new(app.repo.clone(), app.repo.clone());

    let first = reports
        .file_report(post_id, "bob", Some("spam".to_string()))
        .await
        .expect("report");
    assert_eq!(first, 1);

    // Duplicate reports by the same user count again.
    let second = reports
        .file_report(post_id, "bob", None)
        .await
        .expect("report");
    assert_eq!(second, 2);
}

#[tokio::test]
async fn backfill_recomputes_drifted_counters() {
    let app = test_app(FeedCacheConfig::default());
    let post_id = app.repo.add_post(post("ada", Category::Career, T0));

    let reports = ReportService::new(app.repo.clone(), app.repo.clone());
    reports
        .file_report(post_id, "bob", None)
        .await
        .expect("report");

    // Simulate a counter that drifted out of sync with the reports
    // table.
    app.repo
        .posts
        .lock()
        .unwrap()
        .iter_mut()
        .for_each(|p| p.report_count = 0);

    let updated = reports.backfill_report_counts().await.expect("backfill");
    assert_eq!(updated, 1);

    let posts = app.repo.posts.lock().unwrap();
    assert_eq!(posts[0].report_count, 1);
}
