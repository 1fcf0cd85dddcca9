//! Provider fault taxonomy and classification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Classified categories of provider faults.
///
/// Only [`RateLimited`](Self::RateLimited) and
/// [`Transient`](Self::Transient) are retried.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    RateLimited,
    ContextOverflow,
    AuthError,
    ModelError,
    Transient,
    Permanent,
}

impl ErrorCategory {
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Transient)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::RateLimited => "rate_limited",
            Self::ContextOverflow => "context_overflow",
            Self::AuthError => "auth_error",
            Self::ModelError => "model_error",
            Self::Transient => "transient",
            Self::Permanent => "permanent",
        };
        write!(f, "{label}")
    }
}

/// A fault reported by a provider call.
///
/// Carries an optional structured status code and an optional
/// provider-supplied retry-after hint; both influence classification and
/// retry scheduling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderFault {
    pub status: Option<u16>,
    pub message: String,
    pub retry_after: Option<Duration>,
}

impl ProviderFault {
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            retry_after: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = Some(retry_after);
        self
    }
}

impl fmt::Display for ProviderFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "[{status}] {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Classify a provider fault.
///
/// The structured status wins when present: 429 is rate limiting, 401/403
/// are auth failures, and any 5xx is transient. Without a conclusive status
/// the message text is matched against known patterns; anything
/// unrecognized is permanent.
pub fn classify(fault: &ProviderFault) -> ErrorCategory {
    match fault.status {
        Some(429) => return ErrorCategory::RateLimited,
        Some(401) | Some(403) => return ErrorCategory::AuthError,
        Some(status) if (500..600).contains(&status) => return ErrorCategory::Transient,
        _ => {}
    }

    let text = fault.message.to_lowercase();
    if text.contains("rate limit") || text.contains("too many requests") || text.contains("429")
    {
        ErrorCategory::RateLimited
    } else if text.contains("context length")
        || text.contains("context window")
        || text.contains("maximum context")
        || text.contains("token limit")
    {
        ErrorCategory::ContextOverflow
    } else if text.contains("unauthorized")
        || text.contains("forbidden")
        || text.contains("api key")
        || text.contains("invalid credential")
    {
        ErrorCategory::AuthError
    } else if text.contains("model not found")
        || text.contains("unknown model")
        || text.contains("unsupported model")
    {
        ErrorCategory::ModelError
    } else if text.contains("timeout")
        || text.contains("timed out")
        || text.contains("connection")
        || text.contains("unavailable")
        || text.contains("overloaded")
    {
        ErrorCategory::Transient
    } else {
        ErrorCategory::Permanent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_takes_precedence_over_text() {
        let fault = ProviderFault::msg("unauthorized").with_status(429);
        assert_eq!(classify(&fault), ErrorCategory::RateLimited);
    }

    #[test]
    fn five_hundreds_are_transient() {
        for status in [500, 502, 503, 599] {
            let fault = ProviderFault::msg("server error").with_status(status);
            assert_eq!(classify(&fault), ErrorCategory::Transient);
        }
    }

    #[test]
    fn text_patterns_cover_the_taxonomy() {
        assert_eq!(
            classify(&ProviderFault::msg("Rate limit exceeded")),
            ErrorCategory::RateLimited
        );
        assert_eq!(
            classify(&ProviderFault::msg("prompt exceeds maximum context")),
            ErrorCategory::ContextOverflow
        );
        assert_eq!(
            classify(&ProviderFault::msg("invalid API key")),
            ErrorCategory::AuthError
        );
        assert_eq!(
            classify(&ProviderFault::msg("unknown model gpt-0")),
            ErrorCategory::ModelError
        );
        assert_eq!(
            classify(&ProviderFault::msg("connection reset by peer")),
            ErrorCategory::Transient
        );
        assert_eq!(
            classify(&ProviderFault::msg("malformed request body")),
            ErrorCategory::Permanent
        );
    }

    #[test]
    fn only_rate_limited_and_transient_retry() {
        assert!(ErrorCategory::RateLimited.is_retryable());
        assert!(ErrorCategory::Transient.is_retryable());
        assert!(!ErrorCategory::AuthError.is_retryable());
        assert!(!ErrorCategory::ContextOverflow.is_retryable());
        assert!(!ErrorCategory::ModelError.is_retryable());
        assert!(!ErrorCategory::Permanent.is_retryable());
    }
}
