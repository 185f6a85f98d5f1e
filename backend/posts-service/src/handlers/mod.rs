pub mod posts;

pub use posts::{configure, health_check, latest_posts, search_posts, trending_posts};
