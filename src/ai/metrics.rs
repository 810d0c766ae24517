//! Generation Metrics Collection
//!
//! Thread-safe aggregation of text-generation usage across one pipeline run.
//! Content synthesis calls run concurrently, so counters are atomic and the
//! per-stage table sits behind an `RwLock`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use crate::ai::provider::LlmResponse;

// =============================================================================
// Metrics Collector
// =============================================================================

/// Thread-safe metrics collector for one engagement
pub struct MetricsCollector {
    start_time: Instant,
    api_calls: AtomicU32,
    failed_calls: AtomicU32,
    input_tokens: AtomicU64,
    output_tokens: AtomicU64,
    total_latency_ms: AtomicU64,
    stages: RwLock<BTreeMap<String, StageMetrics>>,
}

/// Call counts for one pipeline stage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageMetrics {
    pub calls: u32,
    pub failures: u32,
    pub output_tokens: u64,
}

/// Summary statistics for a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_duration_ms: u64,
    pub api_calls: u32,
    pub failed_calls: u32,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub avg_latency_ms: f64,
    pub stages: BTreeMap<String, StageMetrics>,
}

pub type SharedMetrics = Arc<MetricsCollector>;

pub fn create_shared_metrics() -> SharedMetrics {
    Arc::new(MetricsCollector::new())
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            api_calls: AtomicU32::new(0),
            failed_calls: AtomicU32::new(0),
            input_tokens: AtomicU64::new(0),
            output_tokens: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
            stages: RwLock::new(BTreeMap::new()),
        }
    }

    /// Record a successful generation call
    pub fn record_response(&self, stage: &str, response: &LlmResponse) {
        self.api_calls.fetch_add(1, Ordering::Relaxed);
        self.input_tokens
            .fetch_add(response.usage.input_tokens as u64, Ordering::Relaxed);
        self.output_tokens
            .fetch_add(response.usage.output_tokens as u64, Ordering::Relaxed);
        self.total_latency_ms
            .fetch_add(response.timing.total_ms, Ordering::Relaxed);

        self.with_stage(stage, |s| {
            s.calls += 1;
            s.output_tokens += response.usage.output_tokens as u64;
        });
    }

    /// Record a failed generation call
    pub fn record_failure(&self, stage: &str) {
        self.api_calls.fetch_add(1, Ordering::Relaxed);
        self.failed_calls.fetch_add(1, Ordering::Relaxed);
        self.with_stage(stage, |s| {
            s.calls += 1;
            s.failures += 1;
        });
    }

    fn with_stage(&self, stage: &str, update: impl FnOnce(&mut StageMetrics)) {
        let mut stages = self.stages.write().unwrap_or_else(|poisoned| {
            tracing::error!("Metrics stages RwLock poisoned, recovering");
            poisoned.into_inner()
        });
        update(stages.entry(stage.to_string()).or_default());
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSummary {
        let api_calls = self.api_calls.load(Ordering::Relaxed);
        let failed_calls = self.failed_calls.load(Ordering::Relaxed);
        let succeeded = api_calls.saturating_sub(failed_calls);
        let total_latency = self.total_latency_ms.load(Ordering::Relaxed);

        let avg_latency_ms = if succeeded > 0 {
            total_latency as f64 / succeeded as f64
        } else {
            0.0
        };

        let stages = self
            .stages
            .read()
            .unwrap_or_else(|poisoned| {
                tracing::error!("Metrics stages RwLock poisoned on read, recovering");
                poisoned.into_inner()
            })
            .clone();

        MetricsSummary {
            total_duration_ms: self.start_time.elapsed().as_millis() as u64,
            api_calls,
            failed_calls,
            input_tokens: self.input_tokens.load(Ordering::Relaxed),
            output_tokens: self.output_tokens.load(Ordering::Relaxed),
            avg_latency_ms,
            stages,
        }
    }
}

impl MetricsSummary {
    /// Format summary for display
    pub fn display(&self) -> String {
        format!(
            "Duration: {:.1}s\n\
             Generation calls: {} ({} failed)\n\
             Tokens: {} (input: {}, output: {})\n\
             Avg Latency: {:.0}ms",
            self.total_duration_ms as f64 / 1000.0,
            self.api_calls,
            self.failed_calls,
            self.input_tokens + self.output_tokens,
            self.input_tokens,
            self.output_tokens,
            self.avg_latency_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::{ResponseTiming, TokenUsage};

    fn response(input: u32, output: u32, ms: u64) -> LlmResponse {
        LlmResponse {
            usage: TokenUsage::new(input, output),
            timing: ResponseTiming { total_ms: ms },
            ..LlmResponse::content_only("{}")
        }
    }

    #[test]
    fn test_records_per_stage() {
        let metrics = MetricsCollector::new();
        metrics.record_response("analysis", &response(100, 20, 40));
        metrics.record_response("content", &response(300, 80, 60));
        metrics.record_failure("content");

        let summary = metrics.snapshot();
        assert_eq!(summary.api_calls, 3);
        assert_eq!(summary.failed_calls, 1);
        assert_eq!(summary.input_tokens, 400);
        assert_eq!(summary.output_tokens, 100);
        assert!((summary.avg_latency_ms - 50.0).abs() < f64::EPSILON);
        assert_eq!(summary.stages["content"].calls, 2);
        assert_eq!(summary.stages["content"].failures, 1);
    }

    #[test]
    fn test_display_mentions_failures() {
        let metrics = MetricsCollector::new();
        metrics.record_failure("research");
        assert!(metrics.snapshot().display().contains("1 failed"));
    }
}
