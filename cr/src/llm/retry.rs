//! Retry policy shared by the HTTP backends
//!
//! Transient failures back off exponentially from one second. A rate limit
//! waits for the server's `retry-after` instead, capped at a minute.

use std::time::Duration;

use reqwest::header::HeaderMap;
use tracing::debug;

use super::LlmError;

/// Maximum number of retries for transient errors
pub const MAX_RETRIES: u32 = 3;

/// Initial backoff delay for retries
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Longest `retry-after` honored before retrying a rate limit
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Delay before retry number `attempt` (1-based), given the error that caused it
pub fn delay_for(attempt: u32, last_error: Option<&LlmError>) -> Duration {
    if let Some(wait) = last_error.and_then(LlmError::retry_after) {
        debug!(?wait, "delay_for: rate limited, honoring retry-after");
        return wait.min(MAX_RETRY_AFTER);
    }
    Duration::from_millis(INITIAL_BACKOFF_MS * 2u64.pow(attempt.saturating_sub(1)))
}

/// Build the rate limit error for a 429 seen on `attempt` (0-based)
///
/// A missing or non-numeric `retry-after` header falls back to the backoff
/// the next attempt would use anyway.
pub fn rate_limited(headers: &HeaderMap, attempt: u32) -> LlmError {
    let retry_after = headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| delay_for(attempt + 1, None));
    debug!(?retry_after, "rate_limited: called");
    LlmError::RateLimited { retry_after }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_backoff_doubles() {
        assert_eq!(delay_for(1, None), Duration::from_millis(1000));
        assert_eq!(delay_for(2, None), Duration::from_millis(2000));
        assert_eq!(delay_for(3, None), Duration::from_millis(4000));
    }

    #[test]
    fn test_server_error_uses_backoff() {
        let err = LlmError::ApiError {
            status: 503,
            message: "overloaded".to_string(),
        };
        assert_eq!(delay_for(2, Some(&err)), Duration::from_millis(2000));
    }

    #[test]
    fn test_rate_limit_waits_for_retry_after() {
        let err = LlmError::RateLimited {
            retry_after: Duration::from_secs(7),
        };
        assert_eq!(delay_for(1, Some(&err)), Duration::from_secs(7));
    }

    #[test]
    fn test_rate_limit_wait_is_capped() {
        let err = LlmError::RateLimited {
            retry_after: Duration::from_secs(3600),
        };
        assert_eq!(delay_for(1, Some(&err)), MAX_RETRY_AFTER);
    }

    #[test]
    fn test_rate_limited_reads_header() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("12"));

        let err = rate_limited(&headers, 0);
        assert!(err.is_retryable());
        assert_eq!(err.retry_after(), Some(Duration::from_secs(12)));
    }

    #[test]
    fn test_rate_limited_without_header_uses_backoff() {
        let err = rate_limited(&HeaderMap::new(), 1);
        assert_eq!(err.retry_after(), Some(Duration::from_millis(2000)));
    }
}
