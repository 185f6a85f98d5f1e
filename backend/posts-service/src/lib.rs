//! Posts Service Library
//!
//! Latest, search and trending post listings over a Solr index of syndicated
//! posts and a PostgreSQL log of per-post view events.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
pub use services::PostsService;
