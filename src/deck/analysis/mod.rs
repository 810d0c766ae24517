//! Problem Analysis
//!
//! Two steps, each one schema-generation call:
//!
//! 1. **Classify** the problem statement into a `ProblemAnalysis`
//! 2. **Expand** the classification into an ordered `DocumentBlueprint`
//!
//! Classification is the one mandatory stage of a run. Service failures are
//! retried with exponential backoff and, once exhausted, fail the run. A
//! malformed classification falls back to a fixed analysis. Expansion never
//! fails: it falls back to a deterministic blueprint.

mod blueprint;
mod prompts;

pub use blueprint::{SectionBounds, fallback_blueprint, section_id};

use backon::{ExponentialBuilder, Retryable};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::ai::StructuredClient;
use crate::constants::{blueprint as bp_constants, retry, temperature};
use crate::deck::types::{
    DocumentBlueprint, ProblemAnalysis, ProblemType, StakeholderComplexity,
};
use crate::types::{
    DeckError, Degradation, ParseWithDefault, Provenance, Result, StageOutput, lenient_string,
    lenient_string_vec,
};
use blueprint::BlueprintPayload;

const STAGE: &str = "analysis";

pub const DEFAULT_FOCUS_AREAS: [&str; 3] = [
    "Market analysis",
    "Competitive landscape",
    "Financial implications",
];

// =============================================================================
// Options
// =============================================================================

/// Backoff for the classification call
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts including the first
    pub max_attempts: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: retry::MAX_ATTEMPTS,
            base_delay: Duration::from_millis(retry::BASE_DELAY_MS),
            max_delay: Duration::from_secs(retry::MAX_DELAY_SECS),
        }
    }
}

impl RetryPolicy {
    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.base_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_attempts.saturating_sub(1))
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub bounds: SectionBounds,
    pub temperature: f32,
    pub retry: RetryPolicy,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            bounds: SectionBounds::default(),
            temperature: temperature::ANALYSIS,
            retry: RetryPolicy::default(),
        }
    }
}

// =============================================================================
// Classification
// =============================================================================

#[derive(Debug, Deserialize)]
struct ClassificationPayload {
    #[serde(deserialize_with = "lenient_string")]
    problem_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    complexity_score: String,
    #[serde(default, deserialize_with = "lenient_string")]
    stakeholder_complexity: String,
    #[serde(
        default,
        alias = "recommended_slide_count",
        deserialize_with = "lenient_string"
    )]
    recommended_section_count: String,
    #[serde(
        default,
        alias = "research_focus_areas",
        deserialize_with = "lenient_string_vec"
    )]
    focus_areas: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_vec")]
    key_business_questions: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    industry_context: String,
    #[serde(default, deserialize_with = "lenient_string")]
    time_horizon: String,
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

impl ClassificationPayload {
    fn into_analysis(self, bounds: SectionBounds) -> Result<ProblemAnalysis> {
        if self.problem_type.trim().is_empty() {
            return Err(DeckError::malformed(STAGE, "empty problem_type"));
        }

        let complexity_score = parse_number(&self.complexity_score)
            .map(|n| n.round().clamp(1.0, 10.0) as u8)
            .unwrap_or(5);

        let recommended_section_count = parse_number(&self.recommended_section_count)
            .map(|n| n.round().max(0.0) as usize)
            .unwrap_or(bp_constants::FALLBACK_SECTIONS);

        let mut focus_areas: Vec<String> = Vec::new();
        for area in self.focus_areas {
            if !focus_areas.iter().any(|a| a.eq_ignore_ascii_case(&area)) {
                focus_areas.push(area);
            }
        }
        focus_areas.truncate(bp_constants::MAX_FOCUS_AREAS);
        if focus_areas.is_empty() {
            focus_areas = default_focus_areas();
        }

        Ok(ProblemAnalysis {
            problem_type: ProblemType::parse_or_default(&self.problem_type),
            complexity_score,
            stakeholder_complexity: if self.stakeholder_complexity.is_empty() {
                StakeholderComplexity::Medium
            } else {
                StakeholderComplexity::parse_or_default(&self.stakeholder_complexity)
            },
            recommended_section_count: bounds.clamp(recommended_section_count),
            focus_areas,
            key_business_questions: self.key_business_questions,
            industry_context: self.industry_context,
            time_horizon: self.time_horizon,
            provenance: Provenance::Generated,
        })
    }
}

fn default_focus_areas() -> Vec<String> {
    DEFAULT_FOCUS_AREAS.iter().map(|s| s.to_string()).collect()
}

/// Fixed classification used when the generated one is unusable
pub fn fallback_analysis() -> ProblemAnalysis {
    ProblemAnalysis {
        problem_type: ProblemType::GrowthStrategy,
        complexity_score: 5,
        stakeholder_complexity: StakeholderComplexity::Medium,
        recommended_section_count: bp_constants::FALLBACK_SECTIONS,
        focus_areas: default_focus_areas(),
        key_business_questions: vec![
            "How to grow?".to_string(),
            "What's the market potential?".to_string(),
            "How to execute?".to_string(),
        ],
        industry_context: "General business".to_string(),
        time_horizon: "medium_term".to_string(),
        provenance: Provenance::Fallback,
    }
}

// =============================================================================
// Analyzer
// =============================================================================

pub struct ProblemAnalyzer {
    client: StructuredClient,
    options: AnalysisOptions,
}

impl ProblemAnalyzer {
    pub fn new(client: StructuredClient) -> Self {
        Self {
            client,
            options: AnalysisOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AnalysisOptions) -> Self {
        self.options = options;
        self
    }

    /// One classification attempt, errors returned as-is
    pub async fn classify(&self, problem: &str) -> Result<ProblemAnalysis> {
        let payload: ClassificationPayload = self
            .client
            .generate_structured(
                STAGE,
                &prompts::classification_prompt(problem),
                self.options.temperature,
            )
            .await?;
        payload.into_analysis(self.options.bounds)
    }

    /// Classification with retry and fallback.
    ///
    /// Fails with `DocumentGenerationFailed` only when the service stays
    /// unreachable.
    pub async fn classify_with_retry(&self, problem: &str) -> Result<StageOutput<ProblemAnalysis>> {
        let result = (|| self.classify(problem))
            .retry(self.options.retry.backoff())
            .when(|e: &DeckError| e.is_service_failure() && e.is_retryable())
            .notify(|e: &DeckError, delay: Duration| {
                warn!("Classification failed, retrying in {:?}: {}", delay, e);
            })
            .await;

        match result {
            Ok(analysis) => {
                info!(
                    "Classified as {} (complexity {}, {} sections)",
                    analysis.problem_type.as_str(),
                    analysis.complexity_score,
                    analysis.recommended_section_count
                );
                Ok(StageOutput::clean(analysis))
            }
            Err(e) if e.is_service_failure() => Err(DeckError::generation_failed(
                "problem classification could not reach the text-generation service",
                e,
            )),
            Err(e) => {
                warn!("Classification output unusable, using fallback analysis: {}", e);
                Ok(StageOutput::degraded(
                    fallback_analysis(),
                    Degradation::from_error(STAGE, "classification", &e),
                ))
            }
        }
    }

    /// Expand a classification into a normalized blueprint
    pub async fn expand(
        &self,
        problem: &str,
        analysis: &ProblemAnalysis,
    ) -> StageOutput<DocumentBlueprint> {
        let bounds = self.options.bounds;
        let prompt = prompts::blueprint_prompt(problem, analysis, bounds.min, bounds.max);

        let result = self
            .client
            .generate_structured::<BlueprintPayload>(STAGE, &prompt, self.options.temperature)
            .await
            .and_then(|payload| {
                blueprint::normalize(payload, analysis, bounds)
                    .ok_or_else(|| DeckError::malformed(STAGE, "blueprint has no usable entries"))
            });

        match result {
            Ok(blueprint) => {
                debug!("Blueprint has {} sections", blueprint.len());
                StageOutput::clean(blueprint)
            }
            Err(e) => {
                warn!("Blueprint generation failed, using fallback structure: {}", e);
                StageOutput::degraded(
                    fallback_blueprint(analysis, bounds),
                    Degradation::from_error(STAGE, "blueprint", &e),
                )
            }
        }
    }
}
