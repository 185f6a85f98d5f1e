use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::search::{mapping, SearchResult};

/// Syndicating site, denormalized onto every post
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub site_id: i64,
    pub site_name: String,
    pub site_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub post_id: String,
    pub post_title: String,
    pub post_link: String,
    pub post_description: String,
    pub post_pub_date: Option<DateTime<Utc>>,
    pub post_image: String,
    pub post_tags: Vec<String>,
    pub post_media: Vec<String>,
    pub site: Site,
    /// Recomputed on every request; never part of the wire format.
    #[serde(skip)]
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Total matches reported by the search backend.
    #[serde(rename = "ttl")]
    pub total: u64,
    pub start: u64,
    pub rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostsResponse {
    pub posts: Vec<Post>,
    pub pagination: Pagination,
}

impl PostsResponse {
    /// Package a search result, letting `rank` reorder the translated posts.
    ///
    /// Pagination is taken from the backend response before ranking runs, so
    /// `ttl`, `start` and `rows` always describe what the backend returned.
    pub fn assemble<F>(result: SearchResult, rank: F) -> Self
    where
        F: FnOnce(Vec<Post>) -> Vec<Post>,
    {
        let pagination = Pagination {
            total: result.num_found,
            start: result.start,
            rows: result.docs.len(),
        };
        let posts = rank(mapping::to_posts(result.docs));
        Self { posts, pagination }
    }
}

/// Resolved paging parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub start: u64,
    pub rows: usize,
}

impl PageRequest {
    /// Resolve raw query-string values; anything unparsable or out of range
    /// falls back to start 0 and the default page size.
    pub fn resolve(
        start: Option<&str>,
        rows: Option<&str>,
        default_rows: usize,
        max_rows: usize,
    ) -> Self {
        let start = start
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(0);
        let rows = rows
            .and_then(|r| r.trim().parse::<usize>().ok())
            .filter(|r| (1..=max_rows).contains(r))
            .unwrap_or(default_rows);
        Self { start, rows }
    }
}
