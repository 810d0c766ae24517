//! Deck Generation Pipeline
//!
//! ## Phases
//!
//! ```text
//! problem ─▶ classify ─▶ blueprint ─▶ research ─▶ content (per entry) ─▶ visuals ─▶ render
//! ```
//!
//! 1. **Classification**: mandatory; a service that stays unreachable fails the run
//! 2. **Blueprint**: section plan, normalized or replaced by the default outline
//! 3. **Research**: search + synthesis into a fully populated record
//! 4. **Content**: one unit per entry on a bounded concurrent pool
//! 5. **Visuals**: charts from research figures, plus appendix exhibits
//! 6. **Render**: Markdown document
//!
//! Every recovered failure is recorded on the artifact as a `Degradation`.

mod artifact;
mod sink;

pub use artifact::{ArtifactMetadata, GeneratedArtifact};
pub use sink::{ARTIFACT_FILE, CHARTS_DIR, DOCUMENT_FILE, DocumentSink, FileSink};

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

use crate::ai::{SharedProvider, StructuredClient, create_shared_metrics};
use crate::constants::network;
use crate::deck::{AnalysisOptions, ContentOptions, ContentSynthesizer, ProblemAnalyzer};
use crate::render::{RenderInput, Section, TemplateRenderer};
use crate::research::{ResearchAggregator, ResearchOptions, SharedSearch};
use crate::types::{DeckError, EngagementId, Result};
use crate::visual;

/// Tunables for a pipeline instance
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub analysis: AnalysisOptions,
    pub research: ResearchOptions,
    pub content: ContentOptions,
    /// Per-call timeout for text generation
    pub llm_timeout: Duration,
    pub max_tokens: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            analysis: AnalysisOptions::default(),
            research: ResearchOptions::default(),
            content: ContentOptions::default(),
            llm_timeout: Duration::from_secs(network::DEFAULT_TIMEOUT_SECS),
            max_tokens: network::DEFAULT_MAX_TOKENS,
        }
    }
}

/// Orchestrates one document per `generate_document` call
pub struct DeckPipeline {
    provider: SharedProvider,
    search: SharedSearch,
    options: PipelineOptions,
    renderer: TemplateRenderer,
}

impl DeckPipeline {
    pub fn new(provider: SharedProvider, search: SharedSearch) -> Self {
        Self {
            provider,
            search,
            options: PipelineOptions::default(),
            renderer: TemplateRenderer::new(),
        }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_renderer(mut self, renderer: TemplateRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Generate a complete deck for a problem statement.
    ///
    /// Returns an error only for blank input, an unreachable classification
    /// service, or a blueprint that fails validation at render time.
    #[instrument(skip_all, fields(client = %client_name))]
    pub async fn generate_document(
        &self,
        problem_statement: &str,
        client_name: &str,
    ) -> Result<GeneratedArtifact> {
        let problem = problem_statement.trim();
        let client_name = client_name.trim();
        let mut invalid = Vec::new();
        if problem.is_empty() {
            invalid.push("problem statement is empty".to_string());
        }
        if client_name.is_empty() {
            invalid.push("client name is empty".to_string());
        }
        if !invalid.is_empty() {
            return Err(DeckError::Validation(invalid));
        }

        let start = Instant::now();
        let engagement_id = EngagementId::new();
        let generated_at = chrono::Utc::now();
        let metrics = create_shared_metrics();
        let client = StructuredClient::new(Arc::clone(&self.provider))
            .with_timeout(self.options.llm_timeout)
            .with_max_tokens(self.options.max_tokens)
            .with_metrics(Arc::clone(&metrics));
        let mut degradations = Vec::new();

        info!(
            "Engagement {}: generating deck for {} via {}",
            engagement_id.short(),
            client_name,
            client.provider_name()
        );

        // Phase 1
        info!("Phase 1: Classifying problem");
        let analyzer = ProblemAnalyzer::new(client.clone()).with_options(self.options.analysis.clone());
        let analysis = analyzer
            .classify_with_retry(problem)
            .await?
            .drain_into(&mut degradations);

        // Phase 2
        info!("Phase 2: Building blueprint");
        let blueprint = analyzer
            .expand(problem, &analysis)
            .await
            .drain_into(&mut degradations);
        info!("Blueprint: {} sections", blueprint.len());

        // Phase 3
        info!("Phase 3: Aggregating research ({} focus areas)", analysis.focus_areas.len());
        let research = ResearchAggregator::new(client.clone(), Arc::clone(&self.search))
            .with_options(self.options.research.clone())
            .aggregate(problem, &analysis.focus_areas)
            .await
            .drain_into(&mut degradations);
        let research = Arc::new(research);

        // Phase 4
        info!("Phase 4: Synthesizing section content");
        let units = ContentSynthesizer::new(client.clone())
            .with_options(self.options.content.clone())
            .synthesize_all(&blueprint, Arc::clone(&research), &analysis)
            .await
            .drain_into(&mut degradations);

        // Phase 5
        info!("Phase 5: Building visualizations");
        let visualizations = visual::build_all(&blueprint.entries, &research);
        let exhibits = visual::exhibits(&analysis);

        let sections: Vec<Section> = blueprint
            .entries
            .iter()
            .cloned()
            .zip(units)
            .zip(visualizations)
            .map(|((entry, content), visualization)| Section {
                entry,
                content,
                visualization,
            })
            .collect();

        // Phase 6
        info!("Phase 6: Rendering document");
        let rendered = self.renderer.render(&RenderInput {
            client_name,
            generated_at,
            analysis: &analysis,
            blueprint: &blueprint,
            sections: &sections,
            research: &research,
            exhibits: &exhibits,
        })?;

        let research = Arc::try_unwrap(research).unwrap_or_else(|shared| (*shared).clone());
        let mut metadata = ArtifactMetadata::summarize(&sections, &research, &exhibits);
        metadata.provider = client.provider_name().to_string();
        metadata.duration_ms = start.elapsed().as_millis() as u64;
        metadata.usage = metrics.snapshot();

        if degradations.is_empty() {
            info!(
                "Engagement {} complete: {} sections, {} charts in {}ms",
                engagement_id.short(),
                metadata.section_count,
                metadata.chart_count,
                metadata.duration_ms
            );
        } else {
            warn!(
                "Engagement {} complete with {} degradations ({} fallback sections)",
                engagement_id.short(),
                degradations.len(),
                metadata.fallback_sections
            );
        }

        Ok(GeneratedArtifact {
            engagement_id,
            generated_at,
            source_problem_statement: problem.to_string(),
            client_name: client_name.to_string(),
            analysis,
            hypothesis: blueprint.hypothesis,
            core_question: blueprint.core_question,
            sections,
            research,
            exhibits,
            rendered,
            degradations,
            metadata,
        })
    }
}
