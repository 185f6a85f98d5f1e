//! Shared fixtures for posts-service integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use mockall::mock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use posts_service::config::{RankingConfig, TimeoutConfig};
use posts_service::db::{TrendingCandidate, TrendingCounts, ViewCountStore};
use posts_service::services::search::{SearchBackend, SearchError, SearchQuery, SearchResult, SolrDoc};
use posts_service::{PostsService, Result};

mock! {
    pub ViewStore {}

    #[async_trait::async_trait]
    impl ViewCountStore for ViewStore {
        async fn prune(&self, now: DateTime<Utc>, prune_window: ChronoDuration) -> Result<u64>;
        async fn aggregate(&self, now: DateTime<Utc>, trend_window: ChronoDuration, top_k: usize) -> Result<TrendingCounts>;
    }
}

mock! {
    pub Search {}

    #[async_trait::async_trait]
    impl SearchBackend for Search {
        async fn select(&self, query: &SearchQuery) -> std::result::Result<SearchResult, SearchError>;
    }
}

/// View store that answers after `delay` and counts prune calls.
pub struct SlowViewStore {
    pub delay: Duration,
    pub prunes: AtomicUsize,
    pub counts: TrendingCounts,
}

impl SlowViewStore {
    pub fn new(delay: Duration, counts: TrendingCounts) -> Self {
        Self {
            delay,
            prunes: AtomicUsize::new(0),
            counts,
        }
    }

    pub fn prune_calls(&self) -> usize {
        self.prunes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ViewCountStore for SlowViewStore {
    async fn prune(&self, _now: DateTime<Utc>, _prune_window: ChronoDuration) -> Result<u64> {
        tokio::time::sleep(self.delay).await;
        self.prunes.fetch_add(1, Ordering::SeqCst);
        Ok(0)
    }

    async fn aggregate(
        &self,
        _now: DateTime<Utc>,
        _trend_window: ChronoDuration,
        _top_k: usize,
    ) -> Result<TrendingCounts> {
        tokio::time::sleep(self.delay).await;
        Ok(self.counts.clone())
    }
}

/// Search backend that never answers in time.
pub struct StalledSearch;

#[async_trait]
impl SearchBackend for StalledSearch {
    async fn select(&self, _query: &SearchQuery) -> std::result::Result<SearchResult, SearchError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(SearchResult::default())
    }
}

pub fn doc(id: &str, published: Option<DateTime<Utc>>) -> SolrDoc {
    SolrDoc {
        id: id.to_string(),
        post_title: format!("Post {}", id),
        post_link: format!("https://example.org/posts/{}", id),
        post_pub_date_range_utc: published,
        site_id: 1,
        site_name: "Example".to_string(),
        site_type: "blog".to_string(),
        ..SolrDoc::default()
    }
}

pub fn result(num_found: u64, start: u64, docs: Vec<SolrDoc>) -> SearchResult {
    SearchResult {
        num_found,
        start,
        docs,
    }
}

pub fn counts(pairs: &[(&str, u64)]) -> TrendingCounts {
    TrendingCounts::from_candidates(
        pairs
            .iter()
            .map(|(id, views)| TrendingCandidate {
                post_id: id.to_string(),
                view_count: *views,
            })
            .collect(),
    )
}

/// Ranking with a clean half-life: weight halves every seven days.
pub fn ranking() -> RankingConfig {
    RankingConfig {
        target_fraction: 0.5,
        half_life_days: 7.0,
        ..RankingConfig::default()
    }
}

pub fn timeouts() -> TimeoutConfig {
    TimeoutConfig {
        database: Duration::from_millis(100),
        search: Duration::from_millis(200),
    }
}

pub fn service(
    views: Arc<dyn ViewCountStore>,
    search: Arc<dyn SearchBackend>,
    ranking: RankingConfig,
) -> PostsService {
    PostsService::new(views, search, ranking, timeouts()).expect("valid ranking config")
}

pub fn malformed_body_error() -> SearchError {
    SearchError::Decode(serde_json::from_str::<serde_json::Value>("{\"response\":").unwrap_err())
}
