//! Research Aggregation
//!
//! Turns a problem statement and its focus areas into a fully populated
//! `ResearchRecord`.
//!
//! ```text
//! focus areas ──▶ query planning ──▶ search (per query) ──▶ rank + dedupe
//!                                                               │
//!                       ResearchRecord ◀── synthesis ◀──────────┘
//! ```
//!
//! Every step degrades instead of failing: a failed query is skipped, a failed
//! synthesis swaps in the placeholder record while keeping the real sources.

mod prompts;
mod queries;
mod search;
mod types;

pub use queries::{QueryPlan, fallback_query, parse_query_lines};
pub use search::{
    SearchDepth, SearchHit, SearchProvider, SearchProviderConfig, SearchRequest, SearchResponse,
    SharedSearch, TavilyClient, create_search_provider,
};
pub use types::{
    Competitor, FALLBACK_NOTE, FinancialProjections, GrowthMetrics, MarketSize, ResearchRecord,
    SourceRef,
};

use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::ai::StructuredClient;
use crate::ai::timeout::with_timeout;
use crate::constants::{network, research, temperature};
use crate::types::{Degradation, Result, StageOutput, truncate_chars};
use types::SynthesisPayload;

const STAGE: &str = "research";
const SEARCH_CONCURRENCY: usize = 4;

/// Tunables for one aggregation run
#[derive(Debug, Clone)]
pub struct ResearchOptions {
    pub max_queries: usize,
    pub max_sources: usize,
    pub results_per_query: usize,
    pub depth: SearchDepth,
    pub search_timeout: Duration,
    pub query_temperature: f32,
    pub synthesis_temperature: f32,
}

impl Default for ResearchOptions {
    fn default() -> Self {
        Self {
            max_queries: research::MAX_QUERIES,
            max_sources: research::MAX_PRIMARY_SOURCES,
            results_per_query: research::RESULTS_PER_QUERY,
            depth: SearchDepth::Advanced,
            search_timeout: Duration::from_secs(network::SEARCH_TIMEOUT_SECS),
            query_temperature: temperature::QUERIES,
            synthesis_temperature: temperature::RESEARCH,
        }
    }
}

pub struct ResearchAggregator {
    client: StructuredClient,
    search: SharedSearch,
    options: ResearchOptions,
}

impl ResearchAggregator {
    pub fn new(client: StructuredClient, search: SharedSearch) -> Self {
        Self {
            client,
            search,
            options: ResearchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ResearchOptions) -> Self {
        self.options = options;
        self
    }

    /// Gather, rank and synthesize research for the given focus areas
    pub async fn aggregate(
        &self,
        problem: &str,
        focus_areas: &[String],
    ) -> StageOutput<ResearchRecord> {
        let mut degradations = Vec::new();

        let queries = self.plan_queries(problem, focus_areas, &mut degradations).await;
        info!("Research: running {} search queries", queries.len());

        let responses = self.run_searches(&queries, &mut degradations).await;
        let sources = rank_sources(&responses, self.options.max_sources);
        debug!(
            "Research: {} of {} queries answered, {} primary sources",
            responses.len(),
            queries.len(),
            sources.len()
        );

        if !has_material(&responses) {
            warn!("Research: no search results available, using placeholder record");
            degradations.push(Degradation::partial(
                STAGE,
                "synthesis",
                "no search results to synthesize; industry-generic estimates used",
            ));
            return StageOutput {
                value: ResearchRecord {
                    queries_used: queries,
                    ..ResearchRecord::fallback()
                },
                degradations,
            };
        }

        let record = match self.synthesize(problem, focus_areas, &responses).await {
            Ok(payload) => {
                let mut record = payload.into_record(sources, queries);
                let filled = record.fill_gaps_from(&ResearchRecord::fallback());
                if filled > 0 {
                    warn!("Research: {} blank field(s) filled with estimates", filled);
                    degradations.push(Degradation::partial(
                        STAGE,
                        "synthesis",
                        format!("{} field(s) filled with industry-generic estimates", filled),
                    ));
                }
                record
            }
            Err(e) => {
                warn!("Research synthesis failed, using placeholder record: {}", e);
                degradations.push(Degradation::from_error(STAGE, "synthesis", &e));
                ResearchRecord {
                    primary_sources: sources,
                    queries_used: queries,
                    ..ResearchRecord::fallback()
                }
            }
        };

        StageOutput {
            value: record,
            degradations,
        }
    }

    async fn plan_queries(
        &self,
        problem: &str,
        focus_areas: &[String],
        degradations: &mut Vec<Degradation>,
    ) -> Vec<String> {
        let mut plan = QueryPlan::new(self.options.max_queries);

        for area in focus_areas {
            if plan.is_full() {
                break;
            }
            let generated = self
                .client
                .generate_text(
                    STAGE,
                    &prompts::query_prompt(problem, area),
                    self.options.query_temperature,
                )
                .await
                .map(|text| parse_query_lines(&text));

            let area_queries = match generated {
                Ok(queries) if !queries.is_empty() => queries,
                Ok(_) => {
                    warn!("No usable queries for focus area '{}', using default", area);
                    vec![fallback_query(problem, area)]
                }
                Err(e) => {
                    warn!("Query generation failed for '{}': {}", area, e);
                    degradations.push(Degradation::from_error(STAGE, area.as_str(), &e));
                    vec![fallback_query(problem, area)]
                }
            };
            plan.extend(area_queries);
        }

        plan.into_queries()
    }

    /// Run all queries; results keep query order, failed queries are dropped
    async fn run_searches(
        &self,
        queries: &[String],
        degradations: &mut Vec<Degradation>,
    ) -> Vec<(String, SearchResponse)> {
        let outcomes: Vec<_> = stream::iter(queries.iter().cloned())
            .map(|query| async move {
                let request = SearchRequest::new(query.clone())
                    .with_depth(self.options.depth)
                    .with_max_results(self.options.results_per_query);
                let result = with_timeout(
                    self.options.search_timeout,
                    self.search.search(&request),
                    "search",
                )
                .await;
                (query, result)
            })
            .buffered(SEARCH_CONCURRENCY)
            .collect()
            .await;

        let mut responses = Vec::with_capacity(outcomes.len());
        for (query, result) in outcomes {
            match result {
                Ok(response) => responses.push((query, response)),
                Err(e) => {
                    warn!("Search failed for query '{}': {}", query, e);
                    degradations.push(Degradation::partial(STAGE, query, e.to_string()));
                }
            }
        }
        responses
    }

    async fn synthesize(
        &self,
        problem: &str,
        focus_areas: &[String],
        responses: &[(String, SearchResponse)],
    ) -> Result<SynthesisPayload> {
        let prompt = prompts::synthesis_prompt(problem, focus_areas, responses);
        self.client
            .generate_structured::<SynthesisPayload>(
                STAGE,
                &prompt,
                self.options.synthesis_temperature,
            )
            .await
    }
}

/// Whether any search returned a hit or an answer worth synthesizing
fn has_material(responses: &[(String, SearchResponse)]) -> bool {
    responses.iter().any(|(_, response)| {
        !response.results.is_empty()
            || response
                .answer
                .as_deref()
                .is_some_and(|a| !a.trim().is_empty())
    })
}

/// Pool every hit, dedupe by URL, order by score and keep the top `limit`
pub fn rank_sources(responses: &[(String, SearchResponse)], limit: usize) -> Vec<SourceRef> {
    let mut hits: Vec<_> = responses
        .iter()
        .flat_map(|(_, response)| response.results.iter())
        .filter(|hit| !hit.url.trim().is_empty())
        .collect();
    hits.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut seen = HashSet::new();
    hits.into_iter()
        .filter(|hit| seen.insert(hit.url.trim_end_matches('/').to_string()))
        .take(limit)
        .map(|hit| SourceRef {
            title: if hit.title.trim().is_empty() {
                hit.url.clone()
            } else {
                hit.title.trim().to_string()
            },
            url: hit.url.clone(),
            excerpt: truncate_chars(hit.content.trim(), 280),
            relevance_score: hit.score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedProvider, ScriptedSearch};
    use crate::types::DegradationKind;
    use std::sync::Arc;

    const SYNTHESIS_JSON: &str = r#"{
        "market_size": {"total_addressable_market": "$40B", "serviceable_addressable_market": "$12B",
                        "target_segment_size": "$3B", "growth_rate": "14%", "market_segments": ["SMB"]},
        "competitors": [{"name": "Globex", "market_share": "22%", "strengths": ["Innovation"],
                         "weaknesses": ["Support"], "revenue_estimate": "$2B"}],
        "growth_metrics": {"cagr_3yr": "14%", "market_potential": "$55B", "adoption_rate": "31%",
                           "time_to_breakeven": "20 months"},
        "trends": ["Vertical SaaS growth"],
        "risks": ["Data residency rules"],
        "financial_projections": {"average_margin": "72%", "customer_acquisition_cost": "$1,100",
                                  "lifetime_value": "$9,000", "payback_period": "15 months"}
    }"#;

    fn areas() -> Vec<String> {
        vec!["market size".to_string(), "competition".to_string()]
    }

    fn scripted_provider() -> ScriptedProvider {
        ScriptedProvider::new(|request| {
            if request.json_mode {
                Ok(SYNTHESIS_JSON.to_string())
            } else if request.prompt.contains("\"market size\"") {
                Ok("1. saas market size europe\n2. saas spend growth".to_string())
            } else {
                Ok("- saas competitors europe".to_string())
            }
        })
    }

    #[tokio::test]
    async fn test_aggregate_happy_path() {
        let search = Arc::new(ScriptedSearch::hits(10));
        let aggregator =
            ResearchAggregator::new(StructuredClient::new(Arc::new(scripted_provider())), search.clone());

        let output = aggregator.aggregate("enter the European SaaS market", &areas()).await;
        let record = output.value;

        assert!(!output.degradations.iter().any(|d| d.subject == "synthesis"));
        assert!(!record.is_fallback());
        assert_eq!(record.queries_used.len(), 3);
        assert_eq!(search.calls(), 3);
        assert_eq!(record.primary_sources.len(), research::MAX_PRIMARY_SOURCES);
        assert_eq!(record.market_size.total_addressable_market, "$40B");
        assert!(
            record
                .primary_sources
                .windows(2)
                .all(|w| w[0].relevance_score >= w[1].relevance_score)
        );
    }

    #[tokio::test]
    async fn test_total_search_failure_still_full_record() {
        let provider = ScriptedProvider::failing(crate::types::ErrorCategory::Network);
        let aggregator = ResearchAggregator::new(
            StructuredClient::new(Arc::new(provider)),
            Arc::new(ScriptedSearch::failing()),
        );

        let output = aggregator.aggregate("enter the European SaaS market", &areas()).await;
        let record = &output.value;

        assert!(record.is_fallback());
        assert!(record.primary_sources.is_empty());
        assert_eq!(record.queries_used.len(), 2);
        assert!(record.queries_used[0].contains("market size analysis"));
        assert!(!record.trends.is_empty());
        assert!(!record.market_size.total_addressable_market.is_empty());
        assert!(
            output
                .degradations
                .iter()
                .any(|d| d.kind == DegradationKind::PartialDataLoss)
        );
        assert!(
            output
                .degradations
                .iter()
                .any(|d| d.subject == "market size" && d.kind == DegradationKind::ServiceUnavailable)
        );
        assert!(
            output
                .degradations
                .iter()
                .any(|d| d.subject == "synthesis" && d.kind == DegradationKind::PartialDataLoss)
        );
    }

    #[tokio::test]
    async fn test_search_outage_with_reachable_llm_uses_placeholder() {
        let provider = Arc::new(scripted_provider());
        let aggregator = ResearchAggregator::new(
            StructuredClient::new(provider.clone()),
            Arc::new(ScriptedSearch::failing()),
        );

        let output = aggregator.aggregate("enter the European SaaS market", &areas()).await;
        let record = &output.value;

        assert!(record.is_fallback());
        assert_eq!(record.note.as_deref(), Some(FALLBACK_NOTE));
        assert!(record.primary_sources.is_empty());
        assert_eq!(record.queries_used.len(), 3);
        assert_ne!(record.market_size.total_addressable_market, "$40B");
        // query planning only; synthesis is never attempted
        assert_eq!(provider.calls(), 2);
        assert!(
            output
                .degradations
                .iter()
                .any(|d| d.subject == "synthesis" && d.kind == DegradationKind::PartialDataLoss)
        );
    }

    #[tokio::test]
    async fn test_malformed_synthesis_keeps_sources() {
        let provider = ScriptedProvider::new(|request| {
            if request.json_mode {
                Ok("I could not find enough data.".to_string())
            } else {
                Ok("saas pricing benchmarks".to_string())
            }
        });
        let aggregator = ResearchAggregator::new(
            StructuredClient::new(Arc::new(provider)),
            Arc::new(ScriptedSearch::hits(3)),
        );

        let output = aggregator.aggregate("p", &["pricing".to_string()]).await;
        assert!(output.value.is_fallback());
        assert_eq!(output.value.primary_sources.len(), 3);
        assert!(
            output
                .degradations
                .iter()
                .any(|d| d.kind == DegradationKind::MalformedOutput)
        );
    }

    #[tokio::test]
    async fn test_query_cap() {
        let counter = std::sync::atomic::AtomicUsize::new(0);
        let provider = ScriptedProvider::new(move |request| {
            if request.json_mode {
                return Ok(SYNTHESIS_JSON.to_string());
            }
            let n = counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(format!("query {n} a\nquery {n} b\nquery {n} c"))
        });
        let options = ResearchOptions {
            max_queries: 4,
            ..Default::default()
        };
        let aggregator = ResearchAggregator::new(
            StructuredClient::new(Arc::new(provider)),
            Arc::new(ScriptedSearch::hits(1)),
        )
        .with_options(options);

        let areas: Vec<String> = (0..6).map(|i| format!("area number {}", i)).collect();
        let output = aggregator.aggregate("p", &areas).await;
        assert_eq!(output.value.queries_used.len(), 4);
    }

    #[test]
    fn test_rank_sources_dedupes_urls() {
        let hit = |url: &str, score: f64| SearchHit {
            title: String::new(),
            url: url.to_string(),
            content: "c".to_string(),
            score,
        };
        let responses = vec![
            (
                "q1".to_string(),
                SearchResponse {
                    answer: None,
                    results: vec![hit("https://a.example/", 0.4), hit("https://b.example", 0.9)],
                },
            ),
            (
                "q2".to_string(),
                SearchResponse {
                    answer: None,
                    results: vec![hit("https://a.example", 0.7), hit("", 1.0)],
                },
            ),
        ];

        let ranked = rank_sources(&responses, 10);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].url, "https://b.example");
        assert_eq!(ranked[1].relevance_score, 0.7);
        assert_eq!(ranked[1].title, "https://a.example");
    }
}
