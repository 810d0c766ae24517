//! Analysis prompts

use serde_json::{Value, json};

use crate::ai::provider::build_schema_prompt;
use crate::deck::types::ProblemAnalysis;

fn classification_shape() -> Value {
    json!({
        "problem_type": "growth_strategy | operational_efficiency | market_entry | digital_transformation | cost_optimization | competitive_analysis | new_product_launch",
        "complexity_score": "integer 1-10 (1 = simple, 10 = highly complex)",
        "stakeholder_complexity": "low | medium | high",
        "recommended_section_count": "integer 8-20 based on complexity",
        "focus_areas": ["Research focus area 1", "Research focus area 2", "Research focus area 3"],
        "key_business_questions": ["Question 1", "Question 2", "Question 3"],
        "industry_context": "Industry this problem belongs to",
        "time_horizon": "short_term | medium_term | long_term"
    })
}

fn blueprint_shape() -> Value {
    json!({
        "hypothesis": "Clear, testable hypothesis for the problem",
        "core_question": "Primary strategic question the document must answer",
        "entries": [{
            "position": 1,
            "title": "Action-oriented section title",
            "purpose": "executive_summary | hypothesis | analysis | implementation | risk",
            "visual_type": "bar | line | pie | framework | table | none",
            "content_template": "title_only | two_column | chart_main | framework",
            "key_message": "Single core insight for this section",
            "business_question": "What this section answers"
        }]
    })
}

pub fn classification_prompt(problem: &str) -> String {
    let prompt = format!(
        "Analyze this business problem and determine the best structure for a strategy document.\n\n\
         PROBLEM: {}\n\n\
         Consider:\n\
         - How many business units or functions are involved?\n\
         - What geographic scope is implied?\n\
         - What time horizon applies to results?\n\
         - What level of executive audience is expected?\n\
         - How much uncertainty or risk is present?\n\n\
         Pick 1-6 research focus areas, most important first.",
        problem.trim()
    );
    build_schema_prompt(&prompt, &classification_shape())
}

pub fn blueprint_prompt(problem: &str, analysis: &ProblemAnalysis, min: usize, max: usize) -> String {
    let analysis_json = serde_json::to_string_pretty(analysis).unwrap_or_default();
    let prompt = format!(
        "Create the section plan for a strategy document.\n\n\
         PROBLEM: {problem}\n\n\
         ANALYSIS:\n{analysis_json}\n\n\
         Requirements:\n\
         - Produce exactly {count} entries (never fewer than {min} or more than {max})\n\
         - Entry 1 is the executive summary and uses the title_only template\n\
         - Entry 2 states the hypothesis\n\
         - Sections flow logically to answer the core question\n\
         - Include analytical, implementation and risk sections\n\
         - Positions start at 1 and increase by 1",
        problem = problem.trim(),
        analysis_json = analysis_json,
        count = analysis.recommended_section_count,
        min = min,
        max = max,
    );
    build_schema_prompt(&prompt, &blueprint_shape())
}
