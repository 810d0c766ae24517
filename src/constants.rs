//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Blueprint sizing constants
pub mod blueprint {
    /// Minimum number of sections in a document
    pub const MIN_SECTIONS: usize = 8;

    /// Maximum number of sections in a document
    pub const MAX_SECTIONS: usize = 20;

    /// Section count used when classification falls back
    pub const FALLBACK_SECTIONS: usize = 10;

    /// Maximum focus areas carried into research
    pub const MAX_FOCUS_AREAS: usize = 6;
}

/// Research aggregation constants
pub mod research {
    /// Maximum queries generated per focus area
    pub const QUERIES_PER_AREA: usize = 3;

    /// Hard cap on total search queries per run
    pub const MAX_QUERIES: usize = 12;

    /// Results requested per search query
    pub const RESULTS_PER_QUERY: usize = 10;

    /// Ranked sources kept as primary sources
    pub const MAX_PRIMARY_SOURCES: usize = 15;

    /// Characters of each search hit forwarded to synthesis
    pub const EXCERPT_CHARS: usize = 600;

    /// Token ceiling for the pooled research context in the synthesis prompt
    pub const SYNTHESIS_CONTEXT_TOKENS: usize = 12_000;
}

/// Content synthesis constants
pub mod content {
    pub const MIN_SUPPORTING_POINTS: usize = 3;
    pub const MAX_SUPPORTING_POINTS: usize = 5;
    pub const MIN_NEXT_STEPS: usize = 2;
    pub const MAX_NEXT_STEPS: usize = 3;

    /// Default concurrent content-synthesis calls
    pub const DEFAULT_CONCURRENCY: usize = 4;
}

/// Sampling temperatures per stage
pub mod temperature {
    /// Classification and blueprint (schema-critical)
    pub const ANALYSIS: f32 = 0.2;

    /// Market data synthesis (schema-critical)
    pub const RESEARCH: f32 = 0.2;

    /// Search query brainstorming
    pub const QUERIES: f32 = 0.6;

    /// Section prose
    pub const CONTENT: f32 = 0.7;
}

/// Chart geometry
pub mod chart {
    pub const WIDTH: u32 = 800;
    pub const HEIGHT: u32 = 480;

    /// Number of periods in synthesized growth series
    pub const GROWTH_PERIODS: usize = 5;

    /// Index value of the first period
    pub const GROWTH_BASE: f64 = 100.0;

    /// Strategic scenario growth multiplier over baseline CAGR
    pub const STRATEGIC_MULTIPLIER: f64 = 1.5;
}

/// HTTP/Network constants
pub mod network {
    /// Default LLM request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Default search request timeout (seconds)
    pub const SEARCH_TIMEOUT_SECS: u64 = 30;

    /// Default maximum output tokens
    pub const DEFAULT_MAX_TOKENS: usize = 4000;
}

/// Retry constants for the mandatory classification stage
pub mod retry {
    pub const MAX_ATTEMPTS: usize = 3;
    pub const BASE_DELAY_MS: u64 = 500;
    pub const MAX_DELAY_SECS: u64 = 30;
}
