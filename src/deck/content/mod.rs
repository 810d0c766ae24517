//! Content Synthesis
//!
//! One schema call per blueprint entry, run concurrently on a bounded pool.
//! Every entry gets exactly one `ContentUnit`: a failed or unusable call is
//! replaced by the fallback unit for that entry.

mod prompts;

use futures::stream::{self, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::ai::StructuredClient;
use crate::constants::{content as limits, temperature};
use crate::deck::types::{BlueprintEntry, ContentUnit, DocumentBlueprint, ProblemAnalysis};
use crate::research::ResearchRecord;
use crate::types::{
    DeckError, Degradation, Provenance, StageOutput, lenient_string, lenient_string_vec,
};

const STAGE: &str = "content";
const SOURCES_PER_UNIT: usize = 3;

const FALLBACK_POINT: &str = "Analysis based on market research";
const FALLBACK_CHART_INSIGHT: &str = "Data supports strategic direction";
const FALLBACK_TAKEAWAY: &str = "Recommendation drives growth";
const FALLBACK_NEXT_STEPS: [&str; 2] = ["Validate findings with stakeholders", "Execute strategic plan"];
const FALLBACK_SOURCE: &str = "Market research data";
const FALLBACK_NOTES: &str = "Key insights for executive audience";
const GENERIC_POINT: &str = "Further validation recommended with primary research";

#[derive(Debug, Clone)]
pub struct ContentOptions {
    pub concurrency: usize,
    pub temperature: f32,
}

impl Default for ContentOptions {
    fn default() -> Self {
        Self {
            concurrency: limits::DEFAULT_CONCURRENCY,
            temperature: temperature::CONTENT,
        }
    }
}

// =============================================================================
// Wire Shape
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct ContentPayload {
    #[serde(default, alias = "pyramid_lead", deserialize_with = "lenient_string")]
    lead_insight: String,
    #[serde(default, deserialize_with = "lenient_string_vec")]
    supporting_points: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    chart_insight: String,
    #[serde(default, alias = "so_what_takeaway", deserialize_with = "lenient_string")]
    takeaway: String,
    #[serde(default, deserialize_with = "lenient_string_vec")]
    next_steps: Vec<String>,
    #[serde(default, alias = "evidence_sources", deserialize_with = "lenient_string_vec")]
    sources: Vec<String>,
    #[serde(default, alias = "presentation_notes", deserialize_with = "lenient_string")]
    presenter_notes: String,
}

impl ContentPayload {
    fn is_empty(&self) -> bool {
        self.lead_insight.is_empty() && self.supporting_points.is_empty() && self.takeaway.is_empty()
    }
}

// =============================================================================
// Builders
// =============================================================================

fn research_sources(research: &ResearchRecord) -> Vec<String> {
    let titles: Vec<String> = research
        .primary_sources
        .iter()
        .take(SOURCES_PER_UNIT)
        .map(|s| s.title.clone())
        .collect();
    if titles.is_empty() {
        vec![FALLBACK_SOURCE.to_string()]
    } else {
        titles
    }
}

fn or_default(value: String, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value
    }
}

/// Minimal unit for an entry whose generation failed
pub fn fallback_unit(entry: &BlueprintEntry, research: &ResearchRecord) -> ContentUnit {
    ContentUnit {
        entry_id: entry.id.clone(),
        lead_insight: entry.key_message.clone(),
        supporting_points: vec![FALLBACK_POINT.to_string()],
        chart_insight: FALLBACK_CHART_INSIGHT.to_string(),
        takeaway: FALLBACK_TAKEAWAY.to_string(),
        next_steps: FALLBACK_NEXT_STEPS.iter().map(|s| s.to_string()).collect(),
        sources: research_sources(research),
        presenter_notes: Some(FALLBACK_NOTES.to_string()),
        provenance: Provenance::Fallback,
    }
}

/// Bring a generated unit within list bounds and fill empty fields
fn normalize_unit(
    payload: ContentPayload,
    entry: &BlueprintEntry,
    research: &ResearchRecord,
) -> ContentUnit {
    let mut points = payload.supporting_points;
    points.truncate(limits::MAX_SUPPORTING_POINTS);
    let padding = research.trends.iter().chain(research.risks.iter());
    for candidate in padding {
        if points.len() >= limits::MIN_SUPPORTING_POINTS {
            break;
        }
        if !points.contains(candidate) {
            points.push(candidate.clone());
        }
    }
    while points.len() < limits::MIN_SUPPORTING_POINTS {
        points.push(GENERIC_POINT.to_string());
    }

    let mut next_steps = payload.next_steps;
    next_steps.truncate(limits::MAX_NEXT_STEPS);
    for step in FALLBACK_NEXT_STEPS {
        if next_steps.len() >= limits::MIN_NEXT_STEPS {
            break;
        }
        if !next_steps.iter().any(|s| s == step) {
            next_steps.push(step.to_string());
        }
    }

    let sources = if payload.sources.is_empty() {
        research_sources(research)
    } else {
        payload.sources
    };

    ContentUnit {
        entry_id: entry.id.clone(),
        lead_insight: or_default(payload.lead_insight, &entry.key_message),
        supporting_points: points,
        chart_insight: or_default(payload.chart_insight, FALLBACK_CHART_INSIGHT),
        takeaway: or_default(payload.takeaway, FALLBACK_TAKEAWAY),
        next_steps,
        sources,
        presenter_notes: Some(payload.presenter_notes).filter(|n| !n.trim().is_empty()),
        provenance: Provenance::Generated,
    }
}

// =============================================================================
// Synthesizer
// =============================================================================

pub struct ContentSynthesizer {
    client: StructuredClient,
    options: ContentOptions,
}

impl ContentSynthesizer {
    pub fn new(client: StructuredClient) -> Self {
        Self {
            client,
            options: ContentOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ContentOptions) -> Self {
        self.options = options;
        self
    }

    /// Content for one entry. Never fails.
    pub async fn synthesize(
        &self,
        entry: &BlueprintEntry,
        research: &ResearchRecord,
        analysis: &ProblemAnalysis,
    ) -> StageOutput<ContentUnit> {
        let prompt = prompts::content_prompt(entry, research, analysis);
        let result = self
            .client
            .generate_structured::<ContentPayload>(STAGE, &prompt, self.options.temperature)
            .await;

        match result {
            Ok(payload) if !payload.is_empty() => {
                StageOutput::clean(normalize_unit(payload, entry, research))
            }
            Ok(_) => {
                warn!("Content for '{}' was empty, using fallback", entry.id);
                StageOutput::degraded(
                    fallback_unit(entry, research),
                    Degradation::from_error(
                        STAGE,
                        entry.id.as_str(),
                        &DeckError::malformed(STAGE, "empty content"),
                    ),
                )
            }
            Err(e) => {
                warn!("Content generation failed for '{}': {}", entry.id, e);
                StageOutput::degraded(
                    fallback_unit(entry, research),
                    Degradation::from_error(STAGE, entry.id.as_str(), &e),
                )
            }
        }
    }

    /// Content for every entry, returned in blueprint position order
    pub async fn synthesize_all(
        &self,
        blueprint: &DocumentBlueprint,
        research: Arc<ResearchRecord>,
        analysis: &ProblemAnalysis,
    ) -> StageOutput<Vec<ContentUnit>> {
        let concurrency = self.options.concurrency.max(1);
        info!(
            "Synthesizing content for {} sections (concurrency {})",
            blueprint.len(),
            concurrency
        );

        let mut results: Vec<(u32, StageOutput<ContentUnit>)> = stream::iter(&blueprint.entries)
            .map(|entry| {
                let research = Arc::clone(&research);
                async move {
                    let output = self.synthesize(entry, &research, analysis).await;
                    debug!("Content ready for '{}'", entry.id);
                    (entry.position, output)
                }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        results.sort_by_key(|(position, _)| *position);

        let mut degradations = Vec::new();
        let units = results
            .into_iter()
            .map(|(_, output)| output.drain_into(&mut degradations))
            .collect();

        StageOutput {
            value: units,
            degradations,
        }
    }
}
