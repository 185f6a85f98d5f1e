//! Solr search backend
//!
//! `query` builds select requests, `schema` mirrors the JSON Solr returns,
//! `mapping` turns index documents into [`Post`](crate::models::Post)s and
//! `client` is the HTTP transport.

pub mod client;
pub mod mapping;
pub mod query;
pub mod schema;

use async_trait::async_trait;
use thiserror::Error;

pub use client::SolrClient;
pub use query::{id_membership_filter, SearchQuery, SortExpr};
pub use schema::{SolrDoc, SolrResponse};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid search backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("search transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("search request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("search backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed search response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl SearchError {
    /// Classify a reqwest failure, keeping client-side timeouts apart.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SearchError::Timeout(err)
        } else {
            SearchError::Transport(err)
        }
    }
}

/// A decoded select response: backend totals plus the page of documents.
#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    pub num_found: u64,
    pub start: u64,
    pub docs: Vec<SolrDoc>,
}

impl SearchResult {
    pub fn empty(start: u64) -> Self {
        Self {
            num_found: 0,
            start,
            docs: Vec::new(),
        }
    }
}

impl From<SolrResponse> for SearchResult {
    fn from(response: SolrResponse) -> Self {
        Self {
            num_found: response.response.num_found,
            start: response.response.start,
            docs: response.response.docs,
        }
    }
}

#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Issue one select request.
    async fn select(&self, query: &SearchQuery) -> Result<SearchResult, SearchError>;
}
