/// Post listing API Handlers
///
/// Query parameters are decoded leniently from the raw query string: unknown
/// keys are ignored, a repeated key keeps its first value and malformed values
/// fall back to defaults instead of rejecting the request.
use actix_web::{get, web, HttpRequest, HttpResponse};
use chrono::Utc;
use tracing::debug;
use url::form_urlencoded;

use crate::error::Result;
use crate::services::search::SortExpr;
use crate::services::PostsService;

/// First value of `key` in a URL-encoded query string
fn first_param(query_string: &str, key: &str) -> Option<String> {
    form_urlencoded::parse(query_string.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Query parameters for GET /v1/posts/latest
#[derive(Debug, Default, PartialEq)]
pub struct LatestQuery {
    pub start: Option<String>,
    pub rows: Option<String>,
}

impl LatestQuery {
    pub fn parse(query_string: &str) -> Self {
        Self {
            start: first_param(query_string, "start"),
            rows: first_param(query_string, "rows"),
        }
    }
}

/// Query parameters for GET /v1/posts/search
#[derive(Debug, Default, PartialEq)]
pub struct SearchParams {
    pub query: Option<String>,
    pub start: Option<String>,
    /// Solr sort expression, e.g. `post_pub_date_sorter desc`
    pub sorter: Option<String>,
    pub rows: Option<String>,
}

impl SearchParams {
    pub fn parse(query_string: &str) -> Self {
        Self {
            query: first_param(query_string, "query"),
            start: first_param(query_string, "start"),
            sorter: first_param(query_string, "sorter"),
            rows: first_param(query_string, "rows"),
        }
    }
}

/// GET /v1/posts/latest
#[get("/latest")]
pub async fn latest_posts(
    req: HttpRequest,
    service: web::Data<PostsService>,
) -> Result<HttpResponse> {
    let params = LatestQuery::parse(req.query_string());
    let page = service.page(params.start.as_deref(), params.rows.as_deref());
    debug!(start = page.start, rows = page.rows, "GET /latest");

    let response = service.latest(page).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// GET /v1/posts/search
#[get("/search")]
pub async fn search_posts(
    req: HttpRequest,
    service: web::Data<PostsService>,
) -> Result<HttpResponse> {
    let params = SearchParams::parse(req.query_string());
    let page = service.page(params.start.as_deref(), params.rows.as_deref());
    let text = params.query.as_deref().unwrap_or_default();
    let sort = params.sorter.as_deref().and_then(SortExpr::parse);
    debug!(query = text, sorted = sort.is_some(), "GET /search");

    let response = service.search(text, sort, page).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// GET /v1/posts/trending
#[get("/trending")]
pub async fn trending_posts(service: web::Data<PostsService>) -> Result<HttpResponse> {
    let response = service.trending(Utc::now()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// GET /health
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check)).service(
        web::scope("/v1/posts")
            .service(latest_posts)
            .service(search_posts)
            .service(trending_posts),
    );
}
