use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::error::GenerationError;

/// Pause before the single retry of a transient failure.
pub const RETRY_BACKOFF: Duration = Duration::from_millis(750);

/// A hosted text-generation model: prompt in, free text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, GenerationError>;

    /// Model identifier, recorded alongside each estimate.
    fn model(&self) -> &str;
}

/// Run `op`, retrying up to `max_retries` times while the error is transient.
pub async fn with_retry<T, F, Fut>(
    max_retries: u8,
    backoff: Duration,
    mut op: F,
) -> Result<T, GenerationError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GenerationError>>,
{
    let mut attempt = 0u8;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < max_retries => {
                attempt += 1;
                warn!(error = %err, attempt, "transient generation failure, retrying");
                tokio::time::sleep(backoff).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn unavailable() -> GenerationError {
        GenerationError::Server {
            status: 503,
            body: "overloaded".into(),
        }
    }

    #[tokio::test]
    async fn retries_once_then_succeeds() {
        let calls = AtomicUsize::new(0);
        let result = with_retry(1, Duration::ZERO, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { if n == 0 { Err(unavailable()) } else { Ok("text") } }
        })
        .await;
        assert_eq!(result.unwrap(), "text");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), _> = with_retry(1, Duration::ZERO, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(GenerationError::Timeout) }
        })
        .await;
        assert!(matches!(result, Err(GenerationError::Timeout)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn zero_retries_fails_fast() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), _> = with_retry(0, Duration::ZERO, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(unavailable()) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn permanent_errors_not_retried() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), _> = with_retry(1, Duration::ZERO, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(GenerationError::Server {
                    status: 401,
                    body: "bad key".into(),
                })
            }
        })
        .await;
        assert!(matches!(result, Err(GenerationError::Server { status: 401, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
