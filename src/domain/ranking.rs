//! The scorer: pure ranking functions for every feed ordering.
//!
//! Nothing in this module touches storage. Services fetch candidate
//! rows and interaction edges, then hand them here; the original
//! system expressed these as database aggregation pipelines, which
//! made the scoring logic untestable in isolation.

use std::collections::{HashMap, HashSet};

use time::OffsetDateTime;
use uuid::Uuid;

use super::posts::PostRecord;

/// Time-decay constant for the hot score, in seconds (~12.5 h). An
/// order-of-magnitude jump in reactions offsets a comparable-magnitude
/// age difference.
pub const HOT_DECAY_SECONDS: f64 = 45_000.0;

/// z for a 95% confidence interval.
pub const WILSON_Z: f64 = 1.96;

/// Ranked feeds are capped at this many posts.
pub const FEED_CAP: usize = 100;

/// For-you considers at most this many overlap-ranked similar users.
pub const SIMILAR_USER_CAP: usize = 50;

/// For-you returns at most this many candidates.
pub const RECOMMENDATION_CAP: usize = 20;

/// Hot score: `log10(max(reactions, 1)) + age_term`. Posts with zero
/// reactions rank purely by recency, so hot degenerates gracefully
/// toward new in quiet categories.
pub fn hot_score(reaction_count: i64, created_at: OffsetDateTime) -> f64 {
    let reactions = reaction_count.max(1) as f64;
    reactions.log10() + created_at.unix_timestamp() as f64 / HOT_DECAY_SECONDS
}

/// Wilson score lower bound for a Bernoulli success rate, with
/// successes = reactions and trials n = reactions + reports.
///
/// n = 0 scores 0, so posts with no signal sort last and stay stable.
/// Negative counter values are clamped to zero before scoring.
pub fn wilson_lower_bound(reaction_count: i64, report_count: i64) -> f64 {
    let successes = reaction_count.max(0) as f64;
    let n = successes + report_count.max(0) as f64;
    if n <= 0.0 {
        return 0.0;
    }

    let z = WILSON_Z;
    let z2 = z * z;
    let p_hat = successes / n;

    let centre = p_hat + z2 / (2.0 * n);
    let spread = z * (p_hat * (1.0 - p_hat) / n + z2 / (4.0 * n * n)).sqrt();
    (centre - spread) / (1.0 + z2 / n)
}

/// `new`: strict descending creation time, ties broken by id. A
/// deterministic total order; this is the baseline and never fails.
pub fn rank_new(mut posts: Vec<PostRecord>) -> Vec<PostRecord> {
    posts.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    posts.truncate(FEED_CAP);
    posts
}

/// `hot`: hot score descending, ties by recency then id.
pub fn rank_hot(posts: Vec<PostRecord>) -> Vec<PostRecord> {
    rank_scored(posts, |post| hot_score(post.reaction_count, post.created_at))
}

/// `top`: Wilson lower bound descending, ties by recency then id.
pub fn rank_top(posts: Vec<PostRecord>) -> Vec<PostRecord> {
    rank_scored(posts, |post| {
        wilson_lower_bound(post.reaction_count, post.report_count)
    })
}

/// Score, drop anything unscorable, sort descending, cap. A post whose
/// score is not a finite number is skipped, never fatal.
fn rank_scored<F>(posts: Vec<PostRecord>, score: F) -> Vec<PostRecord>
where
    F: Fn(&PostRecord) -> f64,
{
    let mut scored: Vec<(f64, PostRecord)> = posts
        .into_iter()
        .filter_map(|post| {
            let value = score(&post);
            value.is_finite().then_some((value, post))
        })
        .collect();

    scored.sort_by(|(score_a, post_a), (score_b, post_b)| {
        score_b
            .total_cmp(score_a)
            .then_with(|| post_b.created_at.cmp(&post_a.created_at))
            .then_with(|| post_b.id.cmp(&post_a.id))
    });

    scored
        .into_iter()
        .take(FEED_CAP)
        .map(|(_, post)| post)
        .collect()
}

/// A (user, post) reaction edge, unique per pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionEdge {
    pub user_id: String,
    pub post_id: Uuid,
}

/// Rank other users by how many of the requesting user's liked posts
/// they also reacted to, descending, capped at [`SIMILAR_USER_CAP`].
///
/// `edges_on_liked` holds every reaction by other users on posts in
/// the like set; users absent from it have zero overlap and are never
/// similar. Ties are broken by user id for determinism.
pub fn similar_users(edges_on_liked: &[ReactionEdge], exclude_user: &str) -> Vec<String> {
    let mut overlap: HashMap<&str, usize> = HashMap::new();
    for edge in edges_on_liked {
        if edge.user_id == exclude_user {
            continue;
        }
        *overlap.entry(edge.user_id.as_str()).or_insert(0) += 1;
    }

    let mut ranked: Vec<(&str, usize)> = overlap.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    ranked
        .into_iter()
        .take(SIMILAR_USER_CAP)
        .map(|(user, _)| user.to_string())
        .collect()
}

/// Score candidate posts by the number of distinct similar users who
/// reacted to them, excluding posts already in the like set.
/// Descending, capped at [`RECOMMENDATION_CAP`]; ties by post id.
pub fn recommendation_scores(
    liked: &HashSet<Uuid>,
    similar_user_edges: &[ReactionEdge],
) -> Vec<(Uuid, usize)> {
    let mut reactors: HashMap<Uuid, HashSet<&str>> = HashMap::new();
    for edge in similar_user_edges {
        if liked.contains(&edge.post_id) {
            continue;
        }
        reactors
            .entry(edge.post_id)
            .or_default()
            .insert(edge.user_id.as_str());
    }

    let mut ranked: Vec<(Uuid, usize)> = reactors
        .into_iter()
        .map(|(post_id, users)| (post_id, users.len()))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(RECOMMENDATION_CAP);
    ranked
}
