//! Research Record Types
//!
//! Market data synthesized from search results. Numeric-looking fields stay
//! strings so that `"$5.2B"` or `"12.5%"` keep the units the chart builder reads.

use serde::{Deserialize, Serialize};

use crate::types::{Provenance, lenient_string, lenient_string_vec};

// =============================================================================
// Record Sections
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSize {
    #[serde(default, deserialize_with = "lenient_string")]
    pub total_addressable_market: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub serviceable_addressable_market: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub target_segment_size: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub growth_rate: String,
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub market_segments: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub market_share: String,
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub strengths: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub weaknesses: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub revenue_estimate: String,
}

impl Competitor {
    /// Market share as a number, ignoring any `%` suffix
    pub fn share_percent(&self) -> Option<f64> {
        self.market_share
            .trim()
            .trim_end_matches('%')
            .trim()
            .parse::<f64>()
            .ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthMetrics {
    #[serde(default, deserialize_with = "lenient_string")]
    pub cagr_3yr: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub market_potential: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub adoption_rate: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub time_to_breakeven: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialProjections {
    #[serde(default, deserialize_with = "lenient_string")]
    pub average_margin: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub customer_acquisition_cost: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub lifetime_value: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub payback_period: String,
}

impl FinancialProjections {
    /// Labeled rows in display order
    pub fn rows(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("Average margin", self.average_margin.as_str()),
            ("Customer acquisition cost", self.customer_acquisition_cost.as_str()),
            ("Customer lifetime value", self.lifetime_value.as_str()),
            ("Payback period", self.payback_period.as_str()),
        ]
    }
}

/// One search hit kept as a citation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub title: String,
    pub url: String,
    pub excerpt: String,
    pub relevance_score: f64,
}

// =============================================================================
// Research Record
// =============================================================================

/// Market research backing every section of a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchRecord {
    pub market_size: MarketSize,
    pub competitors: Vec<Competitor>,
    pub growth_metrics: GrowthMetrics,
    pub trends: Vec<String>,
    pub risks: Vec<String>,
    pub financial_projections: FinancialProjections,
    pub primary_sources: Vec<SourceRef>,
    pub provenance: Provenance,
    pub queries_used: Vec<String>,
    /// Set when any figure is a placeholder estimate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

pub const FALLBACK_NOTE: &str =
    "Market figures are industry-generic estimates; live research was unavailable.";

impl ResearchRecord {
    /// Fixed placeholder record used when synthesis fails
    pub fn fallback() -> Self {
        Self {
            market_size: MarketSize {
                total_addressable_market: "$5.2B".to_string(),
                serviceable_addressable_market: "$2.1B".to_string(),
                target_segment_size: "$800M".to_string(),
                growth_rate: "12.5%".to_string(),
                market_segments: strings(&["Enterprise", "Mid-market", "SMB"]),
            },
            competitors: vec![Competitor {
                name: "Market Leader Inc".to_string(),
                market_share: "35%".to_string(),
                strengths: strings(&["Brand recognition", "Distribution network"]),
                weaknesses: strings(&["Slow innovation", "High costs"]),
                revenue_estimate: "$1.8B".to_string(),
            }],
            growth_metrics: GrowthMetrics {
                cagr_3yr: "15.2%".to_string(),
                market_potential: "$8.7B".to_string(),
                adoption_rate: "23%".to_string(),
                time_to_breakeven: "18 months".to_string(),
            },
            trends: strings(&[
                "Digital transformation accelerating in target segments",
                "AI-driven solutions becoming standard across the industry",
                "Customer preference shifting to integrated platforms",
            ]),
            risks: strings(&[
                "Regulatory changes could impact 15% of revenue",
                "New entrants with innovative technology disrupting traditional models",
            ]),
            financial_projections: FinancialProjections {
                average_margin: "28%".to_string(),
                customer_acquisition_cost: "$250".to_string(),
                lifetime_value: "$1,200".to_string(),
                payback_period: "14 months".to_string(),
            },
            primary_sources: Vec::new(),
            provenance: Provenance::Fallback,
            queries_used: Vec::new(),
            note: Some(FALLBACK_NOTE.to_string()),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.provenance.is_fallback()
    }

    /// Fill blank fields from `fallback`, returning how many were filled
    pub fn fill_gaps_from(&mut self, fallback: &ResearchRecord) -> usize {
        let mut filled = 0;
        let mut fill = |target: &mut String, source: &str| {
            if target.trim().is_empty() {
                *target = source.to_string();
                filled += 1;
            }
        };

        let (m, fm) = (&mut self.market_size, &fallback.market_size);
        fill(&mut m.total_addressable_market, &fm.total_addressable_market);
        fill(&mut m.serviceable_addressable_market, &fm.serviceable_addressable_market);
        fill(&mut m.target_segment_size, &fm.target_segment_size);
        fill(&mut m.growth_rate, &fm.growth_rate);

        let (g, fg) = (&mut self.growth_metrics, &fallback.growth_metrics);
        fill(&mut g.cagr_3yr, &fg.cagr_3yr);
        fill(&mut g.market_potential, &fg.market_potential);
        fill(&mut g.adoption_rate, &fg.adoption_rate);
        fill(&mut g.time_to_breakeven, &fg.time_to_breakeven);

        let (f, ff) = (&mut self.financial_projections, &fallback.financial_projections);
        fill(&mut f.average_margin, &ff.average_margin);
        fill(&mut f.customer_acquisition_cost, &ff.customer_acquisition_cost);
        fill(&mut f.lifetime_value, &ff.lifetime_value);
        fill(&mut f.payback_period, &ff.payback_period);

        self.competitors.retain(|c| !c.name.trim().is_empty());

        let lists: [(&mut Vec<String>, &Vec<String>); 3] = [
            (&mut self.market_size.market_segments, &fallback.market_size.market_segments),
            (&mut self.trends, &fallback.trends),
            (&mut self.risks, &fallback.risks),
        ];
        for (target, source) in lists {
            if target.is_empty() {
                target.clone_from(source);
                filled += 1;
            }
        }
        if self.competitors.is_empty() {
            self.competitors.clone_from(&fallback.competitors);
            filled += 1;
        }

        if filled > 0 && self.note.is_none() {
            self.note = Some(format!(
                "{} field(s) were missing from synthesis and use industry-generic estimates.",
                filled
            ));
        }
        filled
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// Synthesis Payload (wire shape)
// =============================================================================

/// Shape the synthesis call must return. All six sections are required.
#[derive(Debug, Deserialize)]
pub(crate) struct SynthesisPayload {
    #[serde(alias = "market_size_data")]
    pub market_size: MarketSize,
    #[serde(alias = "competitor_data")]
    pub competitors: Vec<Competitor>,
    pub growth_metrics: GrowthMetrics,
    #[serde(alias = "industry_trends", deserialize_with = "lenient_string_vec")]
    pub trends: Vec<String>,
    #[serde(alias = "risk_factors", deserialize_with = "lenient_string_vec")]
    pub risks: Vec<String>,
    pub financial_projections: FinancialProjections,
}

impl SynthesisPayload {
    pub fn into_record(self, sources: Vec<SourceRef>, queries: Vec<String>) -> ResearchRecord {
        ResearchRecord {
            market_size: self.market_size,
            competitors: self.competitors,
            growth_metrics: self.growth_metrics,
            trends: self.trends,
            risks: self.risks,
            financial_projections: self.financial_projections,
            primary_sources: sources,
            provenance: Provenance::Generated,
            queries_used: queries,
            note: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_is_fully_populated() {
        let record = ResearchRecord::fallback();
        assert!(record.is_fallback());
        assert!(record.note.is_some());
        assert!(!record.competitors.is_empty());
        assert_eq!(record.trends.len(), 3);
        assert_eq!(record.risks.len(), 2);
        assert!(
            record
                .financial_projections
                .rows()
                .iter()
                .all(|(_, v)| !v.is_empty())
        );
    }

    #[test]
    fn test_fill_gaps_only_touches_blanks() {
        let mut record = ResearchRecord {
            market_size: MarketSize {
                total_addressable_market: "$40B".to_string(),
                ..Default::default()
            },
            competitors: vec![],
            growth_metrics: GrowthMetrics::default(),
            trends: vec!["Usage-based pricing".to_string()],
            risks: vec![],
            financial_projections: FinancialProjections::default(),
            primary_sources: vec![],
            provenance: Provenance::Generated,
            queries_used: vec![],
            note: None,
        };

        let filled = record.fill_gaps_from(&ResearchRecord::fallback());
        assert!(filled > 0);
        assert_eq!(record.market_size.total_addressable_market, "$40B");
        assert_eq!(record.market_size.serviceable_addressable_market, "$2.1B");
        assert_eq!(record.trends, vec!["Usage-based pricing"]);
        assert_eq!(record.risks.len(), 2);
        assert_eq!(record.competitors[0].name, "Market Leader Inc");
        assert!(record.note.is_some());
        assert_eq!(record.provenance, Provenance::Generated);
    }

    #[test]
    fn test_payload_accepts_legacy_keys_and_numbers() {
        let raw = serde_json::json!({
            "market_size_data": {"total_addressable_market": 12, "growth_rate": "9%"},
            "competitor_data": [{"name": "Globex", "market_share": 22}],
            "growth_metrics": {"cagr_3yr": "11%"},
            "industry_trends": "Consolidation",
            "risk_factors": ["Pricing pressure"],
            "financial_projections": {}
        });
        let payload: SynthesisPayload = serde_json::from_value(raw).unwrap();
        assert_eq!(payload.market_size.total_addressable_market, "12");
        assert_eq!(payload.competitors[0].share_percent(), Some(22.0));
        assert_eq!(payload.trends, vec!["Consolidation"]);
    }

    #[test]
    fn test_payload_requires_sections() {
        let raw = serde_json::json!({"market_size": {}});
        assert!(serde_json::from_value::<SynthesisPayload>(raw).is_err());
    }
}
