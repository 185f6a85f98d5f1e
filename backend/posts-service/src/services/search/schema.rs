/// Solr select response schema for the `rss` core
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolrResponse {
    #[serde(default)]
    pub response_header: ResponseHeader,
    pub response: ResultSet,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseHeader {
    #[serde(default)]
    pub status: i32,
    #[serde(rename = "QTime", default)]
    pub q_time: i64,
    #[serde(default)]
    pub params: EchoedParams,
}

/// Request parameters as echoed back by Solr.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EchoedParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub indent: Option<String>,
    #[serde(rename = "q.op", default)]
    pub q_op: Option<String>,
    #[serde(default)]
    pub fq: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {
    pub num_found: u64,
    pub start: u64,
    #[serde(default)]
    pub num_found_exact: Option<bool>,
    #[serde(default)]
    pub docs: Vec<SolrDoc>,
}

/// One indexed post
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SolrDoc {
    pub id: String,
    #[serde(default)]
    pub post_title: String,
    #[serde(default)]
    pub post_pub_date_range_utc: Option<DateTime<Utc>>,
    #[serde(default)]
    pub site_id: i64,
    #[serde(default)]
    pub post_link: String,
    #[serde(default)]
    pub post_description: String,
    #[serde(default)]
    pub site_type: String,
    #[serde(default)]
    pub site_name: String,
    /// Index-side counter; trending uses live counts from the database instead.
    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub post_image: String,
    #[serde(default)]
    pub post_tags: Vec<String>,
    #[serde(default)]
    pub post_media: Vec<String>,
    #[serde(rename = "_version_", default)]
    pub version: i64,
    #[serde(default)]
    pub post_pub_date_sorter: Option<DateTime<Utc>>,
}
