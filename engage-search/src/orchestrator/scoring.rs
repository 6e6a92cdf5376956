//! Engagement scoring and ranking for result items.
//!
//! Formula:
//!
//! ```text
//! score = 2 * retweets + likes + 1.5 * quotes + replies + bookmarks
//! ```
//!
//! Accumulated in `f64`. Ranking is a stable descending sort, so items
//! with equal scores keep their retrieval order.

use crate::types::{EngagementMetrics, ResultItem};

/// Weight of a repost.
pub const RETWEET_WEIGHT: f64 = 2.0;
/// Weight of a like.
pub const LIKE_WEIGHT: f64 = 1.0;
/// Weight of a quote post.
pub const QUOTE_WEIGHT: f64 = 1.5;
/// Weight of a reply.
pub const REPLY_WEIGHT: f64 = 1.0;
/// Weight of a bookmark.
pub const BOOKMARK_WEIGHT: f64 = 1.0;

/// Calculate the engagement score for a set of metrics.
pub fn engagement_score(metrics: &EngagementMetrics) -> f64 {
    RETWEET_WEIGHT * metrics.retweet_count as f64
        + LIKE_WEIGHT * metrics.like_count as f64
        + QUOTE_WEIGHT * metrics.quote_count as f64
        + REPLY_WEIGHT * metrics.reply_count as f64
        + BOOKMARK_WEIGHT * metrics.bookmark_count as f64
}

/// Score every item and sort by score, highest first.
///
/// Any score already present on an item is overwritten.
pub fn rank(items: Vec<ResultItem>) -> Vec<ResultItem> {
    let mut scored: Vec<ResultItem> = items
        .into_iter()
        .map(|mut item| {
            item.score = Some(engagement_score(&item.engagement_metrics));
            item
        })
        .collect();

    // `sort_by` is stable: ties keep input order.
    scored.sort_by(|a, b| {
        let a = a.score.unwrap_or_default();
        let b = b.score.unwrap_or_default();
        b.total_cmp(&a)
    });
    scored
}
