/// Deadline wrappers for fallible async operations
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Outcome of a bounded call that did not produce a value.
#[derive(Debug, thiserror::Error)]
pub enum TimeoutError<E> {
    /// The deadline passed before the operation completed.
    #[error("Operation timed out after {0:?}")]
    Elapsed(Duration),
    /// The operation completed in time but failed.
    #[error("Operation failed: {0}")]
    Inner(#[source] E),
}

impl<E> TimeoutError<E> {
    pub fn is_elapsed(&self) -> bool {
        matches!(self, TimeoutError::Elapsed(_))
    }

    /// Returns the operation's own error, if that is what happened.
    pub fn into_inner(self) -> Option<E> {
        match self {
            TimeoutError::Inner(e) => Some(e),
            TimeoutError::Elapsed(_) => None,
        }
    }
}

/// Execute a fallible future, giving up after `duration`
pub async fn with_timeout<F, T, E>(duration: Duration, future: F) -> Result<T, TimeoutError<E>>
where
    F: Future<Output = Result<T, E>>,
{
    match timeout(duration, future).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(TimeoutError::Inner(e)),
        Err(_) => {
            debug!(timeout_ms = duration.as_millis() as u64, "Operation deadline elapsed");
            Err(TimeoutError::Elapsed(duration))
        }
    }
}
