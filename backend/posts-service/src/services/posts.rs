/// Posts service
///
/// Runs the latest, search and trending pipelines. Both external
/// dependencies are injected at construction and every call into them is
/// bounded by its configured timeout.
///
/// Failure policy:
/// - search backend unreachable or erroring: the request fails (502/504)
/// - malformed search response: empty result
/// - view-count store failing or slow: trending proceeds with zero counts
use chrono::{DateTime, Utc};
use resilience::{with_timeout, TimeoutError};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::merger::ResultMerger;
use super::scoring::ScoringError;
use super::search::{
    id_membership_filter, SearchBackend, SearchError, SearchQuery, SearchResult, SortExpr,
};
use crate::config::{RankingConfig, TimeoutConfig};
use crate::db::{TrendingCounts, ViewCountStore};
use crate::error::{AppError, Result};
use crate::models::{PageRequest, PostsResponse};

pub struct PostsService {
    views: Arc<dyn ViewCountStore>,
    search: Arc<dyn SearchBackend>,
    merger: ResultMerger,
    ranking: RankingConfig,
    timeouts: TimeoutConfig,
}

impl PostsService {
    pub fn new(
        views: Arc<dyn ViewCountStore>,
        search: Arc<dyn SearchBackend>,
        ranking: RankingConfig,
        timeouts: TimeoutConfig,
    ) -> std::result::Result<Self, ScoringError> {
        let merger = ResultMerger::new(ranking.scorer()?);
        Ok(Self {
            views,
            search,
            merger,
            ranking,
            timeouts,
        })
    }

    /// Resolve raw paging parameters against the configured page sizes.
    pub fn page(&self, start: Option<&str>, rows: Option<&str>) -> PageRequest {
        PageRequest::resolve(start, rows, self.ranking.default_rows, self.ranking.max_rows)
    }

    /// Newest posts first.
    pub async fn latest(&self, page: PageRequest) -> Result<PostsResponse> {
        let query = SearchQuery::latest(page.start, page.rows);
        let result = self.run_query(&query).await?;
        Ok(PostsResponse::assemble(result, |posts| posts))
    }

    /// Free-text search in backend relevance order unless `sort` is given.
    pub async fn search(
        &self,
        text: &str,
        sort: Option<SortExpr>,
        page: PageRequest,
    ) -> Result<PostsResponse> {
        let mut query = SearchQuery::new(text)
            .with_start(page.start)
            .with_rows(page.rows);
        if let Some(sort) = sort {
            query = query.with_sort(sort.as_str());
        }

        let result = self.run_query(&query).await?;
        Ok(PostsResponse::assemble(result, |posts| posts))
    }

    /// Most viewed recent posts, ranked by time-decayed view count.
    pub async fn trending(&self, now: DateTime<Utc>) -> Result<PostsResponse> {
        let started = Instant::now();
        if self.ranking.prune_on_request {
            self.spawn_prune(now);
        }

        let counts = self.trending_counts(now).await;
        let query = match id_membership_filter(counts.ids()) {
            Some(filter) => SearchQuery::match_all()
                .with_filter(filter)
                .with_rows(self.ranking.top_k),
            None => {
                info!("No trending candidates in window; falling back to latest ordering");
                SearchQuery::latest(0, self.ranking.top_k)
            }
        };

        let result = self.run_query(&query).await?;
        let response =
            PostsResponse::assemble(result, |posts| self.merger.rank(posts, &counts, now));

        debug!(
            ranking_version = %self.ranking.version,
            candidates = counts.len(),
            returned = response.posts.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Trending pipeline completed"
        );
        Ok(response)
    }

    async fn run_query(&self, query: &SearchQuery) -> Result<SearchResult> {
        match with_timeout(self.timeouts.search, self.search.select(query)).await {
            Ok(result) => Ok(result),
            Err(TimeoutError::Elapsed(after)) => {
                error!(timeout_ms = after.as_millis() as u64, "Search backend timed out");
                Err(AppError::SearchTimeout(after))
            }
            Err(TimeoutError::Inner(SearchError::Timeout(e))) => {
                error!(error = %e, "Search request timed out in the HTTP client");
                Err(AppError::SearchTimeout(self.timeouts.search))
            }
            Err(TimeoutError::Inner(SearchError::Decode(e))) => {
                warn!(error = %e, "Malformed search response; treating as empty result");
                Ok(SearchResult::empty(query.start))
            }
            Err(TimeoutError::Inner(e)) => {
                error!(error = %e, "Search backend request failed");
                Err(e.into())
            }
        }
    }

    async fn trending_counts(&self, now: DateTime<Utc>) -> TrendingCounts {
        let aggregate = self
            .views
            .aggregate(now, self.ranking.trend_window, self.ranking.top_k);

        match with_timeout(self.timeouts.database, aggregate).await {
            Ok(counts) => counts,
            Err(e) => {
                warn!(error = %e, "View count aggregation failed; ranking with zero counts");
                TrendingCounts::default()
            }
        }
    }

    fn spawn_prune(&self, now: DateTime<Utc>) {
        let views = Arc::clone(&self.views);
        let window = self.ranking.prune_window;
        let timeout = self.timeouts.database;

        tokio::spawn(async move {
            match with_timeout(timeout, views.prune(now, window)).await {
                Ok(deleted) => debug!(deleted, "Request-time prune completed"),
                Err(e) => warn!(error = %e, "Request-time prune failed"),
            }
        });
    }
}
