//! SolrClient tests against a stand-in HTTP server

mod common;

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{counts, ranking, SlowViewStore};
use posts_service::config::{SearchConfig, TimeoutConfig};
use posts_service::models::PageRequest;
use posts_service::services::search::query::LATEST_SORT;
use posts_service::services::search::{SearchBackend, SearchError, SearchQuery, SolrClient};
use posts_service::{AppError, PostsService};

fn config(address: &str) -> SearchConfig {
    SearchConfig {
        address: address.to_string(),
        core: "rss".to_string(),
        connect_timeout: Duration::from_millis(500),
        request_timeout: Duration::from_secs(2),
    }
}

fn solr_body() -> serde_json::Value {
    json!({
        "responseHeader": {
            "status": 0,
            "QTime": 2,
            "params": {"q": "*", "indent": "true", "q.op": "OR"}
        },
        "response": {
            "numFound": 812,
            "start": 0,
            "numFoundExact": true,
            "docs": [
                {
                    "id": "1001",
                    "post_title": "Rust 2024 edition",
                    "post_pub_date_range_utc": "2024-10-17T08:30:00Z",
                    "site_id": 12,
                    "post_link": "https://blog.example.org/rust-2024",
                    "post_description": "What changes",
                    "site_type": "blog",
                    "site_name": "Example Blog",
                    "view_count": 3,
                    "post_image": "https://blog.example.org/rust.png",
                    "post_tags": ["rust", "release"],
                    "post_media": [],
                    "_version_": 1813000000000000000i64,
                    "post_pub_date_sorter": "2024-10-17T08:30:00Z"
                },
                {"id": "1002", "post_title": "Sparse document"}
            ]
        }
    })
}

#[tokio::test]
async fn test_latest_request_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/solr/rss/select"))
        .and(query_param("q", "*"))
        .and(query_param("sort", LATEST_SORT))
        .and(query_param("rows", "50"))
        .and(query_param("start", "0"))
        .and(query_param_is_missing("fq"))
        .respond_with(ResponseTemplate::new(200).set_body_json(solr_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = SolrClient::new(&config(&server.uri()), 50).unwrap();
    let result = client.select(&SearchQuery::latest(0, 0)).await.unwrap();

    assert_eq!(result.num_found, 812);
    assert_eq!(result.docs.len(), 2);
    assert_eq!(result.docs[0].id, "1001");
    assert_eq!(result.docs[0].post_tags, vec!["rust", "release"]);
    assert_eq!(result.docs[1].site_id, 0);
}

#[tokio::test]
async fn test_filter_and_text_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/solr/rss/select"))
        .and(query_param("q", "green energy"))
        .and(query_param("fq", r#"id:("1001" "1002")"#))
        .and(query_param("rows", "250"))
        .and(query_param_is_missing("sort"))
        .respond_with(ResponseTemplate::new(200).set_body_json(solr_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = SolrClient::new(&config(&server.uri()), 50).unwrap();
    let query = SearchQuery::new("green energy")
        .with_filter(r#"id:("1001" "1002")"#)
        .with_rows(250);

    assert!(client.select(&query).await.is_ok());
}

#[tokio::test]
async fn test_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/solr/rss/select"))
        .respond_with(ResponseTemplate::new(500).set_body_string("SolrCore is loading"))
        .mount(&server)
        .await;

    let client = SolrClient::new(&config(&server.uri()), 50).unwrap();
    let err = client.select(&SearchQuery::match_all()).await.unwrap_err();

    match err {
        SearchError::Status { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("loading"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/solr/rss/select"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let client = SolrClient::new(&config(&server.uri()), 50).unwrap();
    let err = client.select(&SearchQuery::match_all()).await.unwrap_err();

    assert!(matches!(err, SearchError::Decode(_)));
}

#[tokio::test]
async fn test_slow_backend_is_a_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/solr/rss/select"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(solr_body())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let mut cfg = config(&server.uri());
    cfg.request_timeout = Duration::from_millis(100);
    let client = SolrClient::new(&cfg, 50).unwrap();
    let err = client.select(&SearchQuery::match_all()).await.unwrap_err();

    match err {
        SearchError::Timeout(e) => assert!(e.is_timeout()),
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_client_timeout_surfaces_as_gateway_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/solr/rss/select"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(solr_body())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    // HTTP client gives up before the pipeline deadline
    let mut cfg = config(&server.uri());
    cfg.request_timeout = Duration::from_millis(100);
    let timeouts = TimeoutConfig {
        database: Duration::from_millis(100),
        search: Duration::from_secs(2),
    };
    let service = PostsService::new(
        Arc::new(SlowViewStore::new(Duration::ZERO, counts(&[]))),
        Arc::new(SolrClient::new(&cfg, 50).unwrap()),
        ranking(),
        timeouts,
    )
    .unwrap();

    let err = service
        .latest(PageRequest { start: 0, rows: 10 })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::SearchTimeout(d) if d == timeouts.search));
}

#[tokio::test]
async fn test_unreachable_backend() {
    let client = SolrClient::new(&config("http://127.0.0.1:1"), 50).unwrap();
    let err = client.select(&SearchQuery::match_all()).await.unwrap_err();

    assert!(matches!(err, SearchError::Transport(_)));
}
