pub mod view_repo;

pub use view_repo::{PgViewRepo, TrendingCandidate, TrendingCounts, ViewCountStore};
