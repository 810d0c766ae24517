//! Unified Error Type System
//!
//! Centralized error types for the deck generation pipeline.
//! Provider failures carry an `ErrorCategory` so callers can decide between
//! retrying, falling back to deterministic content, or failing the run.
//!
//! ## Error Categories
//!
//! - **Transient**: Temporary server issues (retry)
//! - **RateLimit**: Quota or rate limiting (wait and retry)
//! - **Auth**: Authentication failures (fail fast)
//! - **Network**: Connectivity issues (retry with backoff)
//! - **Unavailable**: Endpoint or model missing (fail fast)
//!
//! ## Stage Taxonomy
//!
//! Stage components recover locally from `ServiceUnavailable` and `MalformedOutput`
//! using fallback builders. Only the mandatory classification stage escalates to
//! `DocumentGenerationFailed`.

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories for retry decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited or quota exhausted
    RateLimit,
    /// Context/token limit exceeded
    TokenLimit,
    /// Authentication failed - don't retry
    Auth,
    /// Network/connectivity issues - retry with backoff
    Network,
    /// Endpoint or model not available
    Unavailable,
    /// Invalid request - don't retry
    BadRequest,
    /// Temporary server issues - retry
    Transient,
    /// Unknown error - conservative retry
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::TokenLimit => write!(f, "TOKEN_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl ErrorCategory {
    /// Check if this category is worth another attempt against the same service
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimit | Self::Network | Self::Transient | Self::Unknown
        )
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// Structured provider error with category
#[derive(Debug, Clone)]
pub struct LlmError {
    pub category: ErrorCategory,
    pub message: String,
    pub provider: Option<String>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
        }
    }

    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.category.is_retryable()
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Classifies raw provider failures into categories
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an error message from any provider.
    /// Patterns are checked in order; the first match wins.
    pub fn classify(message: &str, provider: &str) -> LlmError {
        const PATTERNS: &[(ErrorCategory, &[&str])] = &[
            (
                ErrorCategory::RateLimit,
                &["rate limit", "429", "too many requests", "quota", "resource_exhausted"],
            ),
            (
                ErrorCategory::TokenLimit,
                &["context length", "token limit", "maximum tokens", "tokens exceed"],
            ),
            (
                ErrorCategory::Auth,
                &["401", "403", "api key", "unauthorized", "permission denied"],
            ),
            (
                ErrorCategory::Network,
                &["network", "connection", "dns", "timed out", "timeout", "unreachable"],
            ),
            (
                ErrorCategory::Transient,
                &["500", "502", "503", "service unavailable", "overloaded", "temporar"],
            ),
            (ErrorCategory::Unavailable, &["404", "not found"]),
            (ErrorCategory::BadRequest, &["400", "bad request", "invalid"]),
        ];

        let lower = message.to_lowercase();
        let category = PATTERNS
            .iter()
            .find(|(_, needles)| needles.iter().any(|n| lower.contains(n)))
            .map(|(category, _)| *category)
            .unwrap_or(ErrorCategory::Unknown);

        LlmError::with_provider(category, message, provider)
    }

    /// Classify an HTTP status code directly (more accurate than string matching)
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        match status {
            429 => LlmError::with_provider(ErrorCategory::RateLimit, message, provider),
            401 | 403 => LlmError::with_provider(ErrorCategory::Auth, message, provider),
            400 | 422 => LlmError::with_provider(ErrorCategory::BadRequest, message, provider),
            500 | 502 | 503 | 504 => {
                LlmError::with_provider(ErrorCategory::Transient, message, provider)
            }
            404 => LlmError::with_provider(ErrorCategory::Unavailable, message, provider),
            _ => LlmError::with_provider(ErrorCategory::Unknown, message, provider),
        }
    }

    /// Classify a transport-level reqwest failure
    pub fn classify_transport(err: &reqwest::Error, provider: &str) -> LlmError {
        if err.is_timeout() || err.is_connect() {
            LlmError::with_provider(ErrorCategory::Network, err.to_string(), provider)
        } else if let Some(status) = err.status() {
            Self::classify_http_status(status.as_u16(), &err.to_string(), provider)
        } else {
            Self::classify(&err.to_string(), provider)
        }
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum DeckError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // External Service Errors
    // -------------------------------------------------------------------------
    /// Raw provider failure, classified
    #[error("LLM error: {0}")]
    Llm(LlmError),

    /// Text-generation service down, unreachable or out of quota
    #[error("Generation service unavailable: {0}")]
    ServiceUnavailable(LlmError),

    /// Generation response could not be coerced into the expected schema
    #[error("Malformed output for {target}: {message}")]
    MalformedOutput { target: String, message: String },

    /// Search capability failed for one query
    #[error("Search failed for '{query}': {message}")]
    Search { query: String, message: String },

    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Render error: {0}")]
    Render(String),

    /// Fatal top-level failure surfaced to the caller
    #[error("Document generation failed: {reason}")]
    DocumentGenerationFailed {
        reason: String,
        #[source]
        source: Option<Box<DeckError>>,
    },
}

impl From<LlmError> for DeckError {
    fn from(err: LlmError) -> Self {
        DeckError::Llm(err)
    }
}

pub type Result<T> = std::result::Result<T, DeckError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl DeckError {
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    pub fn malformed(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedOutput {
            target: target.into(),
            message: message.into(),
        }
    }

    pub fn generation_failed(reason: impl Into<String>, source: DeckError) -> Self {
        Self::DocumentGenerationFailed {
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Check if a retry against the same service may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Llm(e) | Self::ServiceUnavailable(e) => e.is_retryable(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Stage-level failure kind, used when recording degradations
    pub fn is_service_failure(&self) -> bool {
        matches!(
            self,
            Self::Llm(_) | Self::ServiceUnavailable(_) | Self::Timeout { .. } | Self::Search { .. }
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
