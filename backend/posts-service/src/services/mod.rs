pub mod merger;
pub mod posts;
pub mod scoring;
pub mod search;

pub use merger::ResultMerger;
pub use posts::PostsService;
pub use scoring::DecayScorer;
