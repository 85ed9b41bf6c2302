//! Plumbing shared by the HTTP model providers.

use reqwest::{Client, Response};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{AIError, CompletionResponse};

pub(super) fn build_client(timeout: Duration) -> Result<Client, AIError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AIError::InvalidRequest(format!("failed to create HTTP client: {}", e)))
}

pub(super) fn map_send_error(error: reqwest::Error, timeout: Duration) -> AIError {
    if error.is_timeout() {
        AIError::Timeout {
            timeout_secs: timeout.as_secs() as u32,
        }
    } else if error.is_connect() {
        AIError::network(format!("Connection failed: {}", error))
    } else {
        AIError::network(error.to_string())
    }
}

/// Maps a non-success status to an `AIError`.
///
/// `context_markers` are body fragments the provider uses for prompts that
/// exceed the context window.
pub(super) async fn check_status(
    response: Response,
    context_markers: &[&str],
    default_retry_secs: u32,
) -> Result<Response, AIError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    match status.as_u16() {
        401 | 403 => Err(AIError::AuthenticationFailed),
        429 => Err(AIError::rate_limited(retry_after_from_body(
            &body,
            default_retry_secs,
        ))),
        400 if context_markers.iter().any(|m| body.contains(m)) => {
            Err(AIError::context_too_long(0, 0))
        }
        400 => Err(AIError::InvalidRequest(body)),
        500..=599 => Err(AIError::unavailable(format!(
            "Server error {}: {}",
            status, body
        ))),
        _ => Err(AIError::network(format!(
            "Unexpected status {}: {}",
            status, body
        ))),
    }
}

/// Reads "try again in Ns" out of a provider error body.
pub(super) fn retry_after_from_body(body: &str, default_secs: u32) -> u32 {
    const MARKER: &str = "try again in ";

    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|parsed| {
            parsed
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .and_then(|message| {
            let rest = &message[message.find(MARKER)? + MARKER.len()..];
            let end = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            rest[..end].parse::<u32>().ok()
        })
        .unwrap_or(default_secs)
}

/// Runs `attempt` until it succeeds, fails permanently or runs out of
/// retries. Backoff doubles from one second.
pub(super) async fn with_retries<F, Fut>(
    provider: &'static str,
    max_retries: u32,
    mut attempt: F,
) -> Result<CompletionResponse, AIError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<CompletionResponse, AIError>>,
{
    let mut retry_count = 0;
    loop {
        match attempt().await {
            Ok(completion) => return Ok(completion),
            Err(err) if !err.is_retryable() || retry_count >= max_retries => return Err(err),
            Err(err) => {
                let delay = Duration::from_secs(1 << retry_count.min(5));
                tracing::warn!(
                    provider,
                    retry = retry_count + 1,
                    delay_secs = delay.as_secs(),
                    error = %err,
                    "retrying model request"
                );
                sleep(delay).await;
                retry_count += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{FinishReason, TokenUsage};
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn retry_after_parses_message() {
        let body = r#"{"error":{"message":"Rate limit exceeded. Please try again in 20 seconds."}}"#;
        assert_eq!(retry_after_from_body(body, 30), 20);
    }

    #[test]
    fn retry_after_falls_back_to_default() {
        assert_eq!(retry_after_from_body(r#"{"error":{"message":"busy"}}"#, 60), 60);
        assert_eq!(retry_after_from_body("not json", 30), 30);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result = with_retries("test", 3, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AIError::AuthenticationFailed) }
        })
        .await;
        assert!(matches!(result, Err(AIError::AuthenticationFailed)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn success_returns_immediately() {
        let result = with_retries("test", 0, || async {
            Ok(CompletionResponse {
                content: "ok".into(),
                usage: TokenUsage::zero(),
                model: "m".into(),
                finish_reason: FinishReason::Stop,
            })
        })
        .await
        .unwrap();
        assert_eq!(result.content, "ok");
    }

    #[tokio::test]
    async fn zero_retries_gives_up_on_transient_errors() {
        let result = with_retries("test", 0, || async { Err(AIError::network("reset")) }).await;
        assert!(matches!(result, Err(AIError::Network(_))));
    }
}
