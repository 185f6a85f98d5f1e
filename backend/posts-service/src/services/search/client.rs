/// HTTP client for the Solr select handler
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use super::query::SearchQuery;
use super::schema::SolrResponse;
use super::{SearchBackend, SearchError, SearchResult};
use crate::config::SearchConfig;

/// Longest slice of an error body kept in [`SearchError::Status`].
const MAX_ERROR_BODY: usize = 512;

pub struct SolrClient {
    http: Client,
    select_url: Url,
    default_rows: usize,
}

impl SolrClient {
    pub fn new(config: &SearchConfig, default_rows: usize) -> Result<Self, SearchError> {
        let select_url = Url::parse(&format!(
            "{}/solr/{}/select",
            config.address.trim_end_matches('/'),
            config.core
        ))?;

        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(SearchError::Transport)?;

        Ok(Self {
            http,
            select_url,
            default_rows,
        })
    }

    pub fn select_url(&self) -> &Url {
        &self.select_url
    }
}

#[async_trait]
impl SearchBackend for SolrClient {
    async fn select(&self, query: &SearchQuery) -> Result<SearchResult, SearchError> {
        let params = query.to_params(self.default_rows);
        debug!(url = %self.select_url, ?params, "Issuing Solr select");

        let response = self
            .http
            .get(self.select_url.clone())
            .query(&params)
            .send()
            .await
            .map_err(SearchError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            warn!(status = status.as_u16(), "Solr select returned an error status");
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(SearchError::from_transport)?;
        let decoded: SolrResponse = serde_json::from_slice(&bytes).map_err(SearchError::Decode)?;

        debug!(
            num_found = decoded.response.num_found,
            docs = decoded.response.docs.len(),
            q_time_ms = decoded.response_header.q_time,
            "Solr select completed"
        );
        Ok(SearchResult::from(decoded))
    }
}

impl std::fmt::Debug for SolrClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolrClient")
            .field("select_url", &self.select_url.as_str())
            .field("default_rows", &self.default_rows)
            .finish()
    }
}
