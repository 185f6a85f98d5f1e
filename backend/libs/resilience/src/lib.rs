//! Resilience helpers for calls into external dependencies
//!
//! Every call the posts service makes to its view-count database or its
//! search backend is bounded by a deadline. Exceeding it surfaces as
//! [`TimeoutError::Elapsed`] so callers can pick a degradation path, while
//! the dependency's own error type is preserved in [`TimeoutError::Inner`].
//!
//! # Example: Database Query with Timeout
//!
//! ```rust,no_run
//! use resilience::timeout::with_timeout;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let result = with_timeout(Duration::from_secs(2), async {
//!         // Your database query
//!         Ok::<_, std::io::Error>(42)
//!     })
//!     .await;
//!
//!     if let Err(e) = result {
//!         eprintln!("query failed: {e}");
//!     }
//! }
//! ```

pub mod timeout;

pub use timeout::{with_timeout, TimeoutError};
