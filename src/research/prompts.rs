//! Research prompts

use serde_json::{Value, json};

use crate::ai::provider::build_schema_prompt;
use crate::constants::research;
use crate::types::{estimate_tokens, truncate_chars};

use super::search::SearchResponse;

/// Prose prompt asking for search queries for one focus area
pub fn query_prompt(problem: &str, area: &str) -> String {
    format!(
        r#"Business problem: "{problem}"
Focus area: "{area}"

Write 2-3 specific web search queries that will surface actionable business intelligence for this focus area.
Each query should:
- Be specific and targeted
- Return a different kind of data (market size, financials, competitors, trends)
- Use business terminology

Return ONLY the queries, one per line, with no numbering or explanation."#
    )
}

/// JSON shape the synthesis call must follow
fn synthesis_shape() -> Value {
    json!({
        "market_size": {
            "total_addressable_market": "Market size with units, e.g. $5.2B",
            "serviceable_addressable_market": "Realistic SAM with units",
            "target_segment_size": "Target segment size with units",
            "growth_rate": "Annual growth rate, e.g. 12.5%",
            "market_segments": ["Segment 1", "Segment 2", "Segment 3"]
        },
        "competitors": [{
            "name": "Competitor name",
            "market_share": "Share with %, e.g. 35%",
            "strengths": ["Strength 1", "Strength 2"],
            "weaknesses": ["Weakness 1", "Weakness 2"],
            "revenue_estimate": "Revenue with units"
        }],
        "growth_metrics": {
            "cagr_3yr": "3-year CAGR with %",
            "market_potential": "Total opportunity with units",
            "adoption_rate": "Adoption rate with %",
            "time_to_breakeven": "Months to break-even"
        },
        "trends": ["Trend with supporting data"],
        "risks": ["Risk with probability and impact"],
        "financial_projections": {
            "average_margin": "Industry margin with %",
            "customer_acquisition_cost": "CAC with currency",
            "lifetime_value": "LTV with currency",
            "payback_period": "Payback period"
        }
    })
}

/// Schema prompt turning pooled search results into a research record.
///
/// The research context is trimmed to a token budget: answers first in query
/// order, then hits from every query by descending score.
pub fn synthesis_prompt(
    problem: &str,
    focus_areas: &[String],
    responses: &[(String, SearchResponse)],
) -> String {
    let mut context = String::new();
    let mut budget = research::SYNTHESIS_CONTEXT_TOKENS;

    let mut push = |block: String, context: &mut String| -> bool {
        let cost = estimate_tokens(&block);
        if cost > budget {
            return false;
        }
        budget -= cost;
        context.push_str(&block);
        true
    };

    for (query, response) in responses {
        if let Some(answer) = response.answer.as_deref().filter(|a| !a.trim().is_empty()) {
            if !push(format!("Q: {}\nA: {}\n\n", query, answer.trim()), &mut context) {
                break;
            }
        }
    }

    let mut hits: Vec<_> = responses
        .iter()
        .flat_map(|(query, response)| response.results.iter().map(move |hit| (query, hit)))
        .collect();
    hits.sort_by(|a, b| b.1.score.total_cmp(&a.1.score));

    for (query, hit) in hits {
        let block = format!(
            "[{}] {} ({})\n{}\n\n",
            query,
            hit.title,
            hit.url,
            truncate_chars(hit.content.trim(), research::EXCERPT_CHARS)
        );
        if !push(block, &mut context) {
            break;
        }
    }

    if context.is_empty() {
        context.push_str("(no search results were available)\n");
    }

    let prompt = format!(
        "Analyze this market research and extract key business intelligence.\n\n\
         BUSINESS PROBLEM: {}\n\
         FOCUS AREAS: {}\n\n\
         RESEARCH DATA:\n{}\n\
         Base every figure on the research data. Where a figure is not available, use a realistic \
         industry estimate and keep units ($, B, M, K, %) in the value.",
        problem,
        focus_areas.join(", "),
        context
    );
    build_schema_prompt(&prompt, &synthesis_shape())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::SearchHit;

    fn response(n: usize, content_len: usize) -> SearchResponse {
        SearchResponse {
            answer: Some("Short answer".to_string()),
            results: (0..n)
                .map(|i| SearchHit {
                    title: format!("Title {}", i),
                    url: format!("https://example.com/{}", i),
                    content: "x".repeat(content_len),
                    score: 0.5,
                })
                .collect(),
        }
    }

    #[test]
    fn test_query_prompt_mentions_inputs() {
        let prompt = query_prompt("enter the European SaaS market", "pricing");
        assert!(prompt.contains("European SaaS"));
        assert!(prompt.contains("\"pricing\""));
        assert!(prompt.contains("one per line"));
    }

    #[test]
    fn test_synthesis_prompt_has_schema_and_data() {
        let responses = vec![("saas europe".to_string(), response(2, 50))];
        let prompt = synthesis_prompt("enter Europe", &["pricing".to_string()], &responses);
        assert!(prompt.contains("Short answer"));
        assert!(prompt.contains("https://example.com/1"));
        assert!(prompt.contains("\"financial_projections\""));
    }

    #[test]
    fn test_synthesis_prompt_respects_budget() {
        let responses: Vec<_> = (0..50)
            .map(|i| (format!("q{}", i), response(10, 2000)))
            .collect();
        let prompt = synthesis_prompt("p", &[], &responses);
        let context_tokens = estimate_tokens(&prompt);
        assert!(context_tokens < research::SYNTHESIS_CONTEXT_TOKENS + 1000);
    }

    #[test]
    fn test_synthesis_prompt_prefers_high_score_hits() {
        let mut responses: Vec<_> = (0..50)
            .map(|i| (format!("q{}", i), response(10, 2000)))
            .collect();
        responses.push((
            "late query".to_string(),
            SearchResponse {
                answer: None,
                results: vec![SearchHit {
                    title: "Key report".to_string(),
                    url: "https://example.com/key-report".to_string(),
                    content: "Market grew 18%".to_string(),
                    score: 0.99,
                }],
            },
        ));

        let prompt = synthesis_prompt("p", &[], &responses);
        assert!(prompt.contains("https://example.com/key-report"));
        assert!(prompt.find("key-report") < prompt.find("https://example.com/0"));
    }

    #[test]
    fn test_synthesis_prompt_without_results() {
        let prompt = synthesis_prompt("p", &[], &[]);
        assert!(prompt.contains("no search results"));
    }
}
