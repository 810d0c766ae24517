//! AI Integration Layer
//!
//! Text-generation providers, the structured-generation client that turns
//! completions into typed records, and per-call timeouts and usage metrics.

pub mod metrics;
pub mod provider;
pub mod structured;
pub mod timeout;
pub mod validation;

pub use metrics::{
    MetricsCollector, MetricsSummary, SharedMetrics, StageMetrics, create_shared_metrics,
};
pub use provider::{
    ErrorCategory, ErrorClassifier, GenerationRequest, LlmError, LlmProvider, LlmResponse,
    ProviderConfig, ResponseMetadata, ResponseTiming, SharedProvider, TokenUsage,
    create_provider,
};
pub use structured::StructuredClient;
pub use timeout::with_timeout;
pub use validation::JsonRepairer;
