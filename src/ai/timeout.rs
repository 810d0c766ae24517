//! Per-Call Timeouts
//!
//! Every external call (text generation or search) runs under its own timeout.
//! A full-document deadline is left to the caller.
//!
//! ## Usage
//!
//! ```ignore
//! let content = with_timeout(
//!     Duration::from_secs(120),
//!     provider.generate(&request),
//!     "generation: research_synthesis",
//! )
//! .await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::types::{DeckError, Result};

/// Execute an async operation with a timeout
///
/// Returns `DeckError::Timeout` if the operation doesn't complete in time.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(DeckError::timeout(operation_name, timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_timeout_success() {
        let result = with_timeout(
            Duration::from_secs(1),
            async { Ok::<_, DeckError>(42) },
            "test operation",
        )
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result = with_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, DeckError>(42)
            },
            "slow operation",
        )
        .await;
        assert!(matches!(result.unwrap_err(), DeckError::Timeout { .. }));
    }
}
