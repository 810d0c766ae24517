//! Configuration Types
//!
//! All configuration structures with sensible defaults. API keys are accepted
//! from config files and the environment but never serialized back out.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::ai::ProviderConfig;
use crate::constants::{blueprint, content, network, research, retry, temperature};
use crate::deck::{AnalysisOptions, ContentOptions, RetryPolicy, SectionBounds};
use crate::pipeline::PipelineOptions;
use crate::research::{ResearchOptions, SearchDepth, SearchProviderConfig};
use crate::types::{DeckError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Text-generation provider settings
    pub llm: LlmConfig,

    /// Web search settings
    pub search: SearchConfig,

    /// Stage tuning
    pub pipeline: PipelineConfig,

    /// Where and how decks are written
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: LlmConfig::default(),
            search: SearchConfig::default(),
            pipeline: PipelineConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns every problem found as one `DeckError::Config`.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.llm.timeout_secs == 0 {
            problems.push("llm.timeout_secs must be greater than 0".to_string());
        }
        if self.llm.max_tokens == 0 {
            problems.push("llm.max_tokens must be greater than 0".to_string());
        }
        if self.search.timeout_secs == 0 {
            problems.push("search.timeout_secs must be greater than 0".to_string());
        }
        if self.search.max_queries == 0 {
            problems.push("search.max_queries must be greater than 0".to_string());
        }
        if !(1..=50).contains(&self.search.max_sources) {
            problems.push(format!(
                "search.max_sources must be between 1 and 50, got {}",
                self.search.max_sources
            ));
        }

        let p = &self.pipeline;
        if p.min_sections < 2 || p.min_sections > p.max_sections {
            problems.push(format!(
                "pipeline section bounds must satisfy 2 <= min_sections <= max_sections, got {}..{}",
                p.min_sections, p.max_sections
            ));
        }
        if p.concurrency == 0 {
            problems.push("pipeline.concurrency must be greater than 0".to_string());
        }
        if p.retry_attempts == 0 {
            problems.push("pipeline.retry_attempts must be greater than 0".to_string());
        }
        for (name, value) in [
            ("analysis", p.temperatures.analysis),
            ("research", p.temperatures.research),
            ("queries", p.temperatures.queries),
            ("content", p.temperatures.content),
        ] {
            if !(0.0..=2.0).contains(&value) {
                problems.push(format!(
                    "pipeline.temperatures.{} must be between 0.0 and 2.0, got {}",
                    name, value
                ));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(DeckError::Config(problems.join("; ")))
        }
    }

    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            provider: self.llm.provider.clone(),
            model: self.llm.model.clone(),
            timeout_secs: self.llm.timeout_secs,
            api_key: self.llm.api_key.clone(),
            api_base: self.llm.api_base.clone(),
        }
    }

    pub fn search_config(&self) -> SearchProviderConfig {
        SearchProviderConfig {
            provider: self.search.provider.clone(),
            timeout_secs: self.search.timeout_secs,
            api_key: self.search.api_key.clone(),
            api_base: self.search.api_base.clone(),
        }
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        let p = &self.pipeline;
        PipelineOptions {
            analysis: AnalysisOptions {
                bounds: SectionBounds {
                    min: p.min_sections,
                    max: p.max_sections,
                },
                temperature: p.temperatures.analysis,
                retry: RetryPolicy {
                    max_attempts: p.retry_attempts,
                    base_delay: Duration::from_millis(p.retry_base_delay_ms),
                    max_delay: Duration::from_secs(p.retry_max_delay_secs),
                },
            },
            research: ResearchOptions {
                max_queries: self.search.max_queries,
                max_sources: self.search.max_sources,
                results_per_query: self.search.results_per_query,
                depth: self.search.depth,
                search_timeout: Duration::from_secs(self.search.timeout_secs),
                query_temperature: p.temperatures.queries,
                synthesis_temperature: p.temperatures.research,
            },
            content: ContentOptions {
                concurrency: p.concurrency,
                temperature: p.temperatures.content,
            },
            llm_timeout: Duration::from_secs(self.llm.timeout_secs),
            max_tokens: self.llm.max_tokens,
        }
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name: "gemini", "openai", "ollama"
    pub provider: String,

    /// Model name (provider default when unset)
    pub model: Option<String>,

    /// Per-call timeout in seconds
    pub timeout_secs: u64,

    /// Output token ceiling per call
    pub max_tokens: usize,

    pub api_base: Option<String>,

    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            max_tokens: network::DEFAULT_MAX_TOKENS,
            api_base: None,
            api_key: None,
        }
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_tokens", &self.max_tokens)
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// =============================================================================
// Search Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search provider name: "tavily"
    pub provider: String,

    pub timeout_secs: u64,

    pub depth: SearchDepth,

    pub results_per_query: usize,

    /// Cap on total queries per run
    pub max_queries: usize,

    /// Ranked sources kept as primary sources
    pub max_sources: usize,

    pub api_base: Option<String>,

    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: "tavily".to_string(),
            timeout_secs: network::SEARCH_TIMEOUT_SECS,
            depth: SearchDepth::Advanced,
            results_per_query: research::RESULTS_PER_QUERY,
            max_queries: research::MAX_QUERIES,
            max_sources: research::MAX_PRIMARY_SOURCES,
            api_base: None,
            api_key: None,
        }
    }
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("provider", &self.provider)
            .field("timeout_secs", &self.timeout_secs)
            .field("depth", &self.depth)
            .field("results_per_query", &self.results_per_query)
            .field("max_queries", &self.max_queries)
            .field("max_sources", &self.max_sources)
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// =============================================================================
// Pipeline Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub min_sections: usize,
    pub max_sections: usize,

    /// Concurrent content-synthesis calls
    pub concurrency: usize,

    /// Classification attempts including the first
    pub retry_attempts: usize,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_secs: u64,

    pub temperatures: TemperatureConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_sections: blueprint::MIN_SECTIONS,
            max_sections: blueprint::MAX_SECTIONS,
            concurrency: content::DEFAULT_CONCURRENCY,
            retry_attempts: retry::MAX_ATTEMPTS,
            retry_base_delay_ms: retry::BASE_DELAY_MS,
            retry_max_delay_secs: retry::MAX_DELAY_SECS,
            temperatures: TemperatureConfig::default(),
        }
    }
}

/// Sampling temperature per stage
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TemperatureConfig {
    pub analysis: f32,
    pub research: f32,
    pub queries: f32,
    pub content: f32,
}

impl Default for TemperatureConfig {
    fn default() -> Self {
        Self {
            analysis: temperature::ANALYSIS,
            research: temperature::RESEARCH,
            queries: temperature::QUERIES,
            content: temperature::CONTENT,
        }
    }
}

// =============================================================================
// Output Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory; each deck lands in `<dir>/<engagement_id>/`
    pub dir: PathBuf,

    /// What `generate` prints to stdout
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("decks"),
            format: OutputFormat::Markdown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!(
                "Unknown output format: {}. Valid values: md, json",
                s
            )),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.version, "1.0");
        assert!(config.validate().is_ok());
        assert_eq!(config.pipeline.min_sections, 8);
        assert_eq!(config.pipeline.max_sections, 20);
        assert_eq!(config.search.max_queries, 12);
    }

    #[test]
    fn test_validation_collects_problems() {
        let mut config = Config::default();
        config.pipeline.min_sections = 12;
        config.pipeline.max_sections = 10;
        config.pipeline.concurrency = 0;
        config.pipeline.temperatures.content = 3.5;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("min_sections"));
        assert!(err.contains("concurrency"));
        assert!(err.contains("temperatures.content"));
    }

    #[test]
    fn test_api_keys_never_serialized() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-llm".to_string());
        config.search.api_key = Some("tvly-search".to_string());

        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(!toml.contains("sk-llm"));
        assert!(!toml.contains("tvly-search"));
        assert!(!format!("{:?}", config).contains("sk-llm"));
    }

    #[test]
    fn test_pipeline_options_mapping() {
        let mut config = Config::default();
        config.pipeline.concurrency = 2;
        config.pipeline.retry_base_delay_ms = 10;
        config.search.depth = SearchDepth::Basic;

        let options = config.pipeline_options();
        assert_eq!(options.content.concurrency, 2);
        assert_eq!(options.analysis.retry.base_delay, Duration::from_millis(10));
        assert_eq!(options.analysis.bounds.max, 20);
        assert_eq!(options.research.depth, SearchDepth::Basic);
        assert_eq!(options.llm_timeout.as_secs(), network::DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("pdf".parse::<OutputFormat>().is_err());
    }
}
