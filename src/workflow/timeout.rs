//! Per-attempt time limit

use std::future::Future;
use std::time::Duration;

use crate::error::{Error, Result};

/// Race `operation` against a timer of `timeout_ms` milliseconds.
///
/// The operation is not polled at all when `timeout_ms` is zero. On expiry
/// the operation future is dropped; any in-flight request it owned is
/// abandoned rather than cancelled at the transport level.
pub async fn race_with_timeout<F, T>(operation: F, timeout_ms: u64) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if timeout_ms == 0 {
        return Err(Error::InvalidTimeout { timeout_ms });
    }

    match tokio::time::timeout(Duration::from_millis(timeout_ms), operation).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout { timeout_ms }),
    }
}
