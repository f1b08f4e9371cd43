//! Step executors: the collaborators that do the actual work for a step.
//!
//! The orchestrator only sees [`StepExecutor`]; the concrete executors wrap
//! a browser-automation sidecar and an LLM code-generation call. Retry policy
//! lives here, not in the orchestrator: a step that exhausts its executor's
//! retries is simply a failed step.

mod browser;
mod swe;

pub use browser::{BrowserExecutor, BrowserOutcome};
pub use swe::{CodeArtifact, CodeExecutor, CodeOutcome};

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

/// Runs one instruction and returns an opaque structured payload.
///
/// Implementations report work-level failure inside the payload
/// (`success: false`); an `Err` means the dispatch itself failed (transport,
/// exhausted retries) and fails the step.
#[async_trait]
pub trait StepExecutor: Send + Sync {
    async fn run(&self, instruction: &str) -> Result<Value>;
}

/// Retry `op` up to `attempts` times with exponential backoff (2s base,
/// 10s cap).
pub(crate) async fn retry_with_backoff<T, Fut>(
    attempts: u32,
    what: &str,
    mut op: impl FnMut() -> Fut,
) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    let mut delay = Duration::from_secs(2);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                warn!(what, attempt, error = %e, "call failed, retrying");
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(Duration::from_secs(10));
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_retry_succeeds_after_failures() {
        let calls = AtomicU32::new(0);

        let result: Result<u32> = retry_with_backoff(3, "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err(anyhow!("transient"))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_gives_up_after_attempts() {
        let calls = AtomicU32::new(0);

        let result: Result<u32> = retry_with_backoff(2, "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(anyhow!("persistent")) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
