/// Merge search hits with view counts into a trending ordering
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use super::scoring::DecayScorer;
use crate::db::TrendingCounts;
use crate::models::Post;

#[derive(Debug, Clone, Copy)]
pub struct ResultMerger {
    scorer: DecayScorer,
}

impl ResultMerger {
    pub fn new(scorer: DecayScorer) -> Self {
        Self { scorer }
    }

    /// Score every post and sort by score descending.
    ///
    /// The sort is stable, so equal scores keep backend order. Zero-score
    /// posts are kept.
    pub fn rank(
        &self,
        mut posts: Vec<Post>,
        counts: &TrendingCounts,
        now: DateTime<Utc>,
    ) -> Vec<Post> {
        for post in posts.iter_mut() {
            let views = counts.views_for(&post.post_id);
            post.score = self.scorer.score_at(views, post.post_pub_date, now);
        }

        posts.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        posts
    }
}
