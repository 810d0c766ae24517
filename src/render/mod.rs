//! Template Renderer
//!
//! Renders an assembled deck to Markdown. Output is deterministic for a given
//! input: sections in position order, the first as the cover, then the
//! appendix and footer.

mod markdown;
mod templates;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::deck::{BlueprintEntry, ContentUnit, DocumentBlueprint, ProblemAnalysis};
use crate::research::ResearchRecord;
use crate::types::{DeckError, Result};
use crate::visual::{Exhibit, Visualization};

pub const CONFIDENTIAL_FOOTER: &str = "Proprietary & Confidential";
pub const FALLBACK_TAG: &str = "*[Placeholder content]*";

/// One rendered unit of the deck
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub entry: BlueprintEntry,
    pub content: ContentUnit,
    pub visualization: Option<Visualization>,
}

/// Everything the renderer reads
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub client_name: &'a str,
    pub generated_at: DateTime<Utc>,
    pub analysis: &'a ProblemAnalysis,
    pub blueprint: &'a DocumentBlueprint,
    pub sections: &'a [Section],
    pub research: &'a ResearchRecord,
    pub exhibits: &'a [Exhibit],
}

#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    date_format: String,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self {
            date_format: "%B %d, %Y".to_string(),
        }
    }
}

impl TemplateRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_format(mut self, format: &str) -> Self {
        self.date_format = format.to_string();
        self
    }

    /// Render the deck to Markdown.
    ///
    /// Fails with `DeckError::Validation` when positions are not contiguous
    /// from 1 or the sections do not line up with the blueprint.
    pub fn render(&self, input: &RenderInput<'_>) -> Result<String> {
        validate(input)?;

        let date = input.generated_at.format(&self.date_format).to_string();
        let mut output = String::new();

        let Some((cover, body)) = input.sections.split_first() else {
            return Err(DeckError::Validation(vec!["deck has no sections".to_string()]));
        };
        output.push_str(&templates::cover(cover, input.blueprint, input.client_name, &date));

        if input.research.is_fallback() || input.research.note.is_some() {
            output.push_str(&research_notice(input.research));
        }

        for section in body {
            output.push_str("\n---\n\n");
            output.push_str(&templates::section(section, input.research));
        }

        output.push_str("\n---\n\n");
        output.push_str(&appendix(input));

        output.push_str("\n---\n\n");
        output.push_str(&format!(
            "*{} | Prepared for {} | {}*\n",
            CONFIDENTIAL_FOOTER, input.client_name, date
        ));

        debug!(
            "Rendered {} sections ({} bytes)",
            input.sections.len(),
            output.len()
        );
        Ok(output)
    }
}

fn validate(input: &RenderInput<'_>) -> Result<()> {
    let mut problems = input.blueprint.validate().err().unwrap_or_default();

    if input.sections.len() != input.blueprint.len() {
        problems.push(format!(
            "{} sections for {} blueprint entries",
            input.sections.len(),
            input.blueprint.len()
        ));
    }
    for (index, (section, entry)) in input
        .sections
        .iter()
        .zip(&input.blueprint.entries)
        .enumerate()
    {
        if section.entry.id != entry.id || section.entry.position != index as u32 + 1 {
            problems.push(format!(
                "section {} is '{}' at position {} (expected '{}' at {})",
                index + 1,
                section.entry.id,
                section.entry.position,
                entry.id,
                index + 1
            ));
        }
        if section.content.entry_id != section.entry.id {
            problems.push(format!(
                "content for '{}' attached to section '{}'",
                section.content.entry_id, section.entry.id
            ));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(DeckError::Validation(problems))
    }
}

fn research_notice(research: &ResearchRecord) -> String {
    let note = research
        .note
        .as_deref()
        .unwrap_or("Market figures are industry-generic estimates.");
    format!("\n> **Research notice:** {}\n", note)
}

fn appendix(input: &RenderInput<'_>) -> String {
    let mut output = String::from("## Appendix\n\n");

    for (i, exhibit) in input.exhibits.iter().enumerate() {
        output.push_str(&format!(
            "### Exhibit {}: {}\n\n",
            markdown::exhibit_letter(i),
            exhibit.title
        ));
        output.push_str(&markdown::image(&exhibit.title, &exhibit.encoded_image));
        output.push_str(&format!("\n*{}*\n\n", exhibit.caption));
    }

    output.push_str("### Sources\n\n");
    if input.research.primary_sources.is_empty() {
        output.push_str("- No external sources were retrieved for this engagement\n");
    } else {
        for (n, source) in input.research.primary_sources.iter().enumerate() {
            output.push_str(&format!(
                "{}. [{}]({}) (relevance {:.2})\n",
                n + 1,
                source.title.replace(['[', ']'], ""),
                source.url,
                source.relevance_score
            ));
        }
    }

    let analysis = input.analysis;
    output.push_str("\n### Methodology\n\n");
    output.push_str(&format!(
        "- Problem type: {}\n",
        analysis.problem_type.label()
    ));
    output.push_str(&format!(
        "- Complexity: {}/10 with {} stakeholder complexity\n",
        analysis.complexity_score,
        crate::types::enum_to_str(&analysis.stakeholder_complexity)
    ));
    output.push_str(&format!(
        "- Research focus: {}\n",
        analysis.focus_areas.join(", ")
    ));
    output.push_str(&format!(
        "- Search queries executed: {}\n",
        input.research.queries_used.len()
    ));
    output.push_str(&format!(
        "- Market data: {}\n",
        if input.research.is_fallback() {
            "industry-generic estimates"
        } else {
            "synthesized from retrieved sources"
        }
    ));
    if analysis.provenance.is_fallback() || input.blueprint.provenance.is_fallback() {
        output.push_str("- Structure: default engagement outline\n");
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{SectionBounds, fallback_analysis, fallback_blueprint, fallback_unit};
    use crate::types::Provenance;
    use crate::visual;
    use chrono::TimeZone;

    struct Fixture {
        analysis: ProblemAnalysis,
        blueprint: DocumentBlueprint,
        sections: Vec<Section>,
        research: ResearchRecord,
        exhibits: Vec<Exhibit>,
    }

    impl Fixture {
        fn new() -> Self {
            let analysis = fallback_analysis();
            let blueprint = fallback_blueprint(&analysis, SectionBounds::default());
            let research = ResearchRecord::fallback();
            let sections = blueprint
                .entries
                .iter()
                .map(|entry| Section {
                    entry: entry.clone(),
                    content: fallback_unit(entry, &research),
                    visualization: visual::build(entry, &research),
                })
                .collect();
            let exhibits = visual::exhibits(&analysis);
            Self {
                analysis,
                blueprint,
                sections,
                research,
                exhibits,
            }
        }

        fn input(&self) -> RenderInput<'_> {
            RenderInput {
                client_name: "Acme",
                generated_at: Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap(),
                analysis: &self.analysis,
                blueprint: &self.blueprint,
                sections: &self.sections,
                research: &self.research,
                exhibits: &self.exhibits,
            }
        }
    }

    #[test]
    fn test_cover_and_footer() {
        let fixture = Fixture::new();
        let md = TemplateRenderer::new().render(&fixture.input()).unwrap();

        assert!(md.starts_with("# Capture Strategic Opportunity"));
        assert!(md.contains(&fixture.blueprint.hypothesis));
        assert!(md.contains("**Prepared for:** Acme"));
        assert!(md.contains("March 14, 2025"));
        assert!(
            md.trim_end()
                .ends_with("*Proprietary & Confidential | Prepared for Acme | March 14, 2025*")
        );
    }

    #[test]
    fn test_custom_date_format() {
        let fixture = Fixture::new();
        let md = TemplateRenderer::new()
            .with_date_format("%Y-%m-%d")
            .render(&fixture.input())
            .unwrap();

        assert!(md.contains("**Date:** 2025-03-14"));
        assert!(!md.contains("March 14, 2025"));
    }

    #[test]
    fn test_sections_in_position_order() {
        let fixture = Fixture::new();
        let md = TemplateRenderer::new().render(&fixture.input()).unwrap();

        let offsets: Vec<usize> = fixture.sections[1..]
            .iter()
            .map(|s| md.find(&format!("## {}. {}", s.entry.position, s.entry.title)).unwrap())
            .collect();
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_fallback_content_is_tagged() {
        let fixture = Fixture::new();
        let md = TemplateRenderer::new().render(&fixture.input()).unwrap();

        assert!(md.contains(FALLBACK_TAG));
        assert!(md.contains("> **Research notice:**"));
        assert!(md.contains("industry-generic estimates"));
    }

    #[test]
    fn test_generated_content_is_not_tagged() {
        let mut fixture = Fixture::new();
        fixture.research.provenance = Provenance::Generated;
        fixture.research.note = None;
        for section in &mut fixture.sections {
            section.content.provenance = Provenance::Generated;
        }
        let md = TemplateRenderer::new().render(&fixture.input()).unwrap();

        assert!(!md.contains(FALLBACK_TAG));
        assert!(!md.contains("Research notice"));
    }

    #[test]
    fn test_appendix_lists_exhibits() {
        let fixture = Fixture::new();
        let md = TemplateRenderer::new().render(&fixture.input()).unwrap();

        assert!(md.contains("## Appendix"));
        assert!(md.contains("### Exhibit A: Financial Impact Projection"));
        assert!(md.contains("### Exhibit B: Risk Assessment Matrix"));
        assert!(md.contains("### Methodology"));
        assert!(md.contains("- Problem type: Growth Strategy"));
    }

    #[test]
    fn test_position_gap_is_validation_error() {
        let mut fixture = Fixture::new();
        fixture.blueprint.entries[3].position = 7;
        let err = TemplateRenderer::new().render(&fixture.input()).unwrap_err();

        match err {
            DeckError::Validation(problems) => {
                assert!(problems.iter().any(|p| p.contains("position 7")));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_misaligned_sections_rejected() {
        let mut fixture = Fixture::new();
        fixture.sections.swap(2, 3);
        assert!(matches!(
            TemplateRenderer::new().render(&fixture.input()),
            Err(DeckError::Validation(_))
        ));

        let mut fixture = Fixture::new();
        fixture.sections.pop();
        assert!(matches!(
            TemplateRenderer::new().render(&fixture.input()),
            Err(DeckError::Validation(_))
        ));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let fixture = Fixture::new();
        let renderer = TemplateRenderer::new();
        assert_eq!(
            renderer.render(&fixture.input()).unwrap(),
            renderer.render(&fixture.input()).unwrap()
        );
    }
}
