use actix_web::{web, App, HttpServer};
use std::io;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use posts_service::config::Config;
use posts_service::db::{PgViewRepo, ViewCountStore};
use posts_service::handlers;
use posts_service::jobs::start_view_pruner;
use posts_service::services::search::{SearchBackend, SolrClient};
use posts_service::PostsService;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_file(true)
                .with_target(true),
        )
        .init();
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting posts-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);
    config.database.log_config();
    config.ranking.log_config();

    // DB down at startup: serve with a lazy pool, trending runs on zero counts
    let db_pool = match db_pool::create_pool(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!("Database unavailable at startup: {}", e);
            match db_pool::create_lazy_pool(&config.database) {
                Ok(pool) => pool,
                Err(e) => {
                    tracing::error!("Database pool creation failed: {}", e);
                    eprintln!("ERROR: Failed to create database pool: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let views: Arc<dyn ViewCountStore> =
        Arc::new(PgViewRepo::new(db_pool, config.ranking.publish_recency));

    let search: Arc<dyn SearchBackend> =
        match SolrClient::new(&config.search, config.ranking.default_rows) {
            Ok(client) => {
                tracing::info!(url = %client.select_url(), "Solr client initialized");
                Arc::new(client)
            }
            Err(e) => {
                tracing::error!("Solr client initialization failed: {}", e);
                eprintln!("ERROR: Failed to initialize Solr client: {}", e);
                std::process::exit(1);
            }
        };

    let service = match PostsService::new(
        Arc::clone(&views),
        search,
        config.ranking.clone(),
        config.timeouts,
    ) {
        Ok(service) => web::Data::new(service),
        Err(e) => {
            tracing::error!("Invalid ranking configuration: {}", e);
            eprintln!("ERROR: Invalid ranking configuration: {}", e);
            std::process::exit(1);
        }
    };

    tokio::spawn(start_view_pruner(
        views,
        config.ranking.prune_window,
        config.ranking.prune_interval,
        config.timeouts.database,
    ));

    let port = config.app.port;
    tracing::info!("Starting HTTP server on 0.0.0.0:{}", port);

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(service.clone())
            .configure(handlers::configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
