pub mod view_pruner;

pub use view_pruner::{run_prune_cycle, start_view_pruner};
