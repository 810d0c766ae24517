//! Content prompts

use serde_json::{Value, json};

use crate::ai::provider::build_schema_prompt;
use crate::deck::types::{BlueprintEntry, ProblemAnalysis};
use crate::research::ResearchRecord;

const SOURCES_IN_PROMPT: usize = 8;

fn content_shape() -> Value {
    json!({
        "lead_insight": "Single most important insight, stated as a conclusion",
        "supporting_points": [
            "Data-driven supporting point with a metric",
            "Evidence-based supporting point with a source",
            "Strategic supporting point with business impact"
        ],
        "chart_insight": "What the visual proves, with data backing",
        "takeaway": "Strategic business implication (so what?)",
        "next_steps": ["Specific next step 1", "Specific next step 2"],
        "sources": ["Source 1", "Source 2"],
        "presenter_notes": "Key talking points for the presenter"
    })
}

/// Research view sent to the model: every field except source excerpts
fn research_view(research: &ResearchRecord) -> Value {
    json!({
        "market_size": research.market_size,
        "competitors": research.competitors,
        "growth_metrics": research.growth_metrics,
        "trends": research.trends,
        "risks": research.risks,
        "financial_projections": research.financial_projections,
        "sources": research
            .primary_sources
            .iter()
            .take(SOURCES_IN_PROMPT)
            .map(|s| s.title.as_str())
            .collect::<Vec<_>>(),
    })
}

pub fn content_prompt(
    entry: &BlueprintEntry,
    research: &ResearchRecord,
    analysis: &ProblemAnalysis,
) -> String {
    let entry_json = serde_json::to_string_pretty(entry).unwrap_or_default();
    let research_json = serde_json::to_string_pretty(&research_view(research)).unwrap_or_default();

    let prompt = format!(
        "Write executive-ready content for one section of a strategy document.\n\n\
         SECTION:\n{}\n\n\
         MARKET RESEARCH:\n{}\n\n\
         PROBLEM TYPE: {}\n\
         COMPLEXITY: {}/10\n\
         INDUSTRY: {}\n\n\
         Style:\n\
         - Lead with the most important insight (pyramid principle)\n\
         - Action-oriented language throughout\n\
         - Quantify impact wherever possible using the research figures\n\
         - Answer the section's business question directly\n\
         - 3 to 5 supporting points, 2 to 3 next steps",
        entry_json,
        research_json,
        analysis.problem_type.as_str(),
        analysis.complexity_score,
        if analysis.industry_context.is_empty() {
            "Not specified"
        } else {
            analysis.industry_context.as_str()
        },
    );
    build_schema_prompt(&prompt, &content_shape())
}
