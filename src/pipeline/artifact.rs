//! The finished deck and its run metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ai::MetricsSummary;
use crate::deck::ProblemAnalysis;
use crate::render::Section;
use crate::research::ResearchRecord;
use crate::types::{Degradation, EngagementId};
use crate::visual::Exhibit;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    pub engagement_id: EngagementId,
    pub generated_at: DateTime<Utc>,
    pub source_problem_statement: String,
    pub client_name: String,
    pub analysis: ProblemAnalysis,
    pub hypothesis: String,
    pub core_question: String,
    /// Position order
    pub sections: Vec<Section>,
    pub research: ResearchRecord,
    pub exhibits: Vec<Exhibit>,
    /// Markdown document
    pub rendered: String,
    pub degradations: Vec<Degradation>,
    pub metadata: ArtifactMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub section_count: usize,
    /// Section charts plus exhibits
    pub chart_count: usize,
    /// Sections whose content came from the fallback builder
    pub fallback_sections: usize,
    pub research_fallback: bool,
    pub source_count: usize,
    pub provider: String,
    pub duration_ms: u64,
    pub usage: MetricsSummary,
}

impl GeneratedArtifact {
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }

    /// `(file stem, svg text)` for every chart in the deck
    pub fn charts(&self) -> Vec<(String, String)> {
        let sections = self.sections.iter().filter_map(|s| {
            let viz = s.visualization.as_ref()?;
            Some((format!("{}_{}", s.entry.id, viz.kind.as_str()), viz.svg()?))
        });
        let exhibits = self
            .exhibits
            .iter()
            .filter_map(|e| Some((e.id.clone(), e.svg()?)));
        sections.chain(exhibits).collect()
    }
}

impl ArtifactMetadata {
    pub fn summarize(sections: &[Section], research: &ResearchRecord, exhibits: &[Exhibit]) -> Self {
        let section_charts = sections
            .iter()
            .filter(|s| {
                s.visualization
                    .as_ref()
                    .is_some_and(|v| v.encoded_image.is_some())
            })
            .count();

        Self {
            section_count: sections.len(),
            chart_count: section_charts + exhibits.len(),
            fallback_sections: sections
                .iter()
                .filter(|s| s.content.provenance.is_fallback())
                .count(),
            research_fallback: research.is_fallback(),
            source_count: research.primary_sources.len(),
            ..Default::default()
        }
    }
}
