/// View Count Repository
///
/// Windowed aggregation and retention over the `post_views` event log.
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{debug, error};

use crate::error::{AppError, Result};

const AGGREGATE_SQL: &str = r#"
    SELECT v.fk_post_id::TEXT AS post_id, COUNT(*) AS views
    FROM post_views v
    JOIN posts p ON p.pk_post_id = v.fk_post_id
    WHERE v.created >= $1 AND v.created <= $2
      AND ($3::TIMESTAMPTZ IS NULL OR p.pub_date >= $3)
    GROUP BY v.fk_post_id
    ORDER BY views DESC, v.fk_post_id::TEXT ASC
    LIMIT $4
"#;

const PRUNE_SQL: &str = "DELETE FROM post_views WHERE created < $1";

/// A post and its view count inside the trending window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendingCandidate {
    pub post_id: String,
    pub view_count: u64,
}

/// Aggregated counts for one request: candidate ids in count order plus a
/// lookup table for scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrendingCounts {
    ids: Vec<String>,
    counts: HashMap<String, u64>,
}

impl TrendingCounts {
    pub fn from_candidates(candidates: Vec<TrendingCandidate>) -> Self {
        let mut ids = Vec::with_capacity(candidates.len());
        let mut counts = HashMap::with_capacity(candidates.len());
        for candidate in candidates {
            if counts.contains_key(&candidate.post_id) {
                continue;
            }
            ids.push(candidate.post_id.clone());
            counts.insert(candidate.post_id, candidate.view_count);
        }
        Self { ids, counts }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Views for `post_id`; posts outside the window count 0.
    pub fn views_for(&self, post_id: &str) -> u64 {
        self.counts.get(post_id).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[async_trait]
pub trait ViewCountStore: Send + Sync {
    /// Delete view events older than `now - prune_window`; returns rows removed.
    async fn prune(&self, now: DateTime<Utc>, prune_window: Duration) -> Result<u64>;

    /// Count views per post within `[now - trend_window, now]`, most viewed
    /// first, truncated to `top_k`.
    async fn aggregate(
        &self,
        now: DateTime<Utc>,
        trend_window: Duration,
        top_k: usize,
    ) -> Result<TrendingCounts>;
}

/// Oldest `created` timestamp that survives pruning.
pub fn retention_cutoff(now: DateTime<Utc>, prune_window: Duration) -> DateTime<Utc> {
    now - prune_window
}

/// Inclusive `(from, to)` bounds of the trending window.
pub fn window_bounds(now: DateTime<Utc>, trend_window: Duration) -> (DateTime<Utc>, DateTime<Utc>) {
    (now - trend_window, now)
}

pub struct PgViewRepo {
    pool: PgPool,
    publish_recency: Option<Duration>,
}

impl PgViewRepo {
    /// `publish_recency` additionally restricts candidates to posts published
    /// within that span of `now`.
    pub fn new(pool: PgPool, publish_recency: Option<Duration>) -> Self {
        Self {
            pool,
            publish_recency,
        }
    }
}

#[async_trait]
impl ViewCountStore for PgViewRepo {
    async fn prune(&self, now: DateTime<Utc>, prune_window: Duration) -> Result<u64> {
        let cutoff = retention_cutoff(now, prune_window);

        let result = sqlx::query(PRUNE_SQL)
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to prune post views: {}", e);
                AppError::Database(e.to_string())
            })?;

        debug!(
            cutoff = %cutoff,
            deleted = result.rows_affected(),
            "Pruned post views"
        );
        Ok(result.rows_affected())
    }

    async fn aggregate(
        &self,
        now: DateTime<Utc>,
        trend_window: Duration,
        top_k: usize,
    ) -> Result<TrendingCounts> {
        let (from, to) = window_bounds(now, trend_window);
        let published_after = self.publish_recency.map(|recency| now - recency);
        let limit = i64::try_from(top_k).unwrap_or(i64::MAX);

        let rows = sqlx::query_as::<_, (String, i64)>(AGGREGATE_SQL)
            .bind(from)
            .bind(to)
            .bind(published_after)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to aggregate post views: {}", e);
                AppError::Database(e.to_string())
            })?;

        let candidates = rows
            .into_iter()
            .map(|(post_id, views)| TrendingCandidate {
                post_id,
                view_count: u64::try_from(views).unwrap_or(0),
            })
            .collect::<Vec<_>>();

        debug!(
            window_from = %from,
            candidates = candidates.len(),
            "Aggregated trending view counts"
        );
        Ok(TrendingCounts::from_candidates(candidates))
    }
}
