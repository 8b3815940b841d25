//! Reaction/downvote toggling and view recording through
//! `InteractionService`: mutual exclusion and counter integrity.

mod common;

use candor::cache::FeedCacheConfig;
use candor::domain::types::Category;
use time::macros::datetime;
use uuid::Uuid;

use common::{MemoryRepo, post, test_app, TestApp};

const T0: time::OffsetDateTime = datetime!(2025-06-01 12:00 UTC);

fn app_with_post() -> (TestApp, Uuid) {
    let app = test_app(FeedCacheConfig::default());
    let post_id = app.repo.add_post(post("ada", Category::Career, T0));
    (app, post_id)
}

fn counters(repo: &MemoryRepo, post_id: Uuid) -> (i64, i64, i64) {
    let posts = repo.posts.lock().unwrap();
    let post = posts.iter().find(|p| p.id == post_id).expect("post");
    (post.reaction_count, post.downvote_count, post.view_count)
}

#[tokio::test]
async fn reaction_toggles_on_and_off() {
    let (app, post_id) = app_with_post();

    let on = app
        .interactions
        .toggle_reaction(post_id, "bob")
        .await
        .expect("toggle");
    assert!(on.active);
    assert!(!on.removed_opposite);
    assert_eq!(counters(&app.repo, post_id), (1, 0, 0));

    let off = app
        .interactions
        .toggle_reaction(post_id, "bob")
        .await
        .expect("toggle");
    assert!(!off.active);
    assert_eq!(counters(&app.repo, post_id), (0, 0, 0));
}

#[tokio::test]
async fn downvote_displaces_an_existing_reaction() {
    let (app, post_id) = app_with_post();

    app.interactions
        .toggle_reaction(post_id, "bob")
        .await
        .expect("toggle");

    let outcome = app
        .interactions
        .toggle_downvote(post_id, "bob")
        .await
        .expect("toggle");
    assert!(outcome.active);
    assert!(outcome.removed_opposite);
    assert_eq!(counters(&app.repo, post_id), (0, 1, 0));
    assert!(app.repo.reactions.lock().unwrap().is_empty());
}

#[tokio::test]
async fn reaction_displaces_an_existing_downvote() {
    let (app, post_id) = app_with_post();

    app.interactions
        .toggle_downvote(post_id, "bob")
        .await
        .expect("toggle");

    let outcome = app
        .interactions
        .toggle_reaction(post_id, "bob")
        .await
        .expect("toggle");
    assert!(outcome.active);
    assert!(outcome.removed_opposite);
    assert_eq!(counters(&app.repo, post_id), (1, 0, 0));
    assert!(app.repo.downvotes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn distinct_users_accumulate_counters() {
    let (app, post_id) = app_with_post();

    for user in ["bob", "carol", "dan"] {
        app.interactions
            .toggle_reaction(post_id, user)
            .await
            .expect("toggle");
    }
    assert_eq!(counters(&app.repo, post_id), (3, 0, 0));
}

#[tokio::test]
async fn views_are_plain_increments() {
    let (app, post_id) = app_with_post();

    app.interactions.record_view(post_id).await.expect("view");
    app.interactions.record_view(post_id).await.expect("view");
    assert_eq!(counters(&app.repo, post_id), (0, 0, 2));
}

#[tokio::test]
async fn interacting_with_a_missing_post_fails() {
    let app = test_app(FeedCacheConfig::default());

    let missing = Uuid::new_v4();
    assert!(app.interactions.toggle_reaction(missing, "bob").await.is_err());
    assert!(app.interactions.toggle_downvote(missing, "bob").await.is_err());
    assert!(app.interactions.record_view(missing).await.is_err());
}
