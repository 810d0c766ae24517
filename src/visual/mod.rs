//! Visualization Builder
//!
//! Turns research figures into self-contained SVG charts, one per blueprint
//! entry, plus the supplementary exhibits shown in the appendix. Missing or
//! unparsable data yields no visualization rather than an error.

mod charts;
pub mod svg;
pub mod units;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::constants::chart;
use crate::deck::{BlueprintEntry, ProblemAnalysis, ProblemType, StakeholderComplexity, VisualType};
use crate::research::ResearchRecord;
use charts::{MatrixPoint, Series};
use svg::palette;
use units::{ValueUnit, compound_series, format_number, parse_as, to_percent};

/// Chart or table attached to one blueprint entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visualization {
    pub entry_id: String,
    pub kind: VisualType,
    /// `data:image/svg+xml;base64,...`; absent for tables
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoded_image: Option<String>,
    pub title: String,
    pub caption: String,
    /// The numbers the chart was drawn from
    pub data_snapshot: serde_json::Value,
    /// Header row first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Vec<Vec<String>>>,
}

impl Visualization {
    pub fn svg(&self) -> Option<String> {
        self.encoded_image.as_deref().and_then(svg::from_data_uri)
    }
}

/// Supplementary chart not tied to a section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exhibit {
    pub id: String,
    pub title: String,
    pub caption: String,
    pub encoded_image: String,
    pub data_snapshot: serde_json::Value,
}

impl Exhibit {
    pub fn svg(&self) -> Option<String> {
        svg::from_data_uri(&self.encoded_image)
    }
}

// =============================================================================
// Per-entry visualizations
// =============================================================================

/// Build the visualization for an entry's visual type
pub fn build(entry: &BlueprintEntry, research: &ResearchRecord) -> Option<Visualization> {
    let built = match entry.visual_type {
        VisualType::Bar => market_sizing(research),
        VisualType::Line => growth_projection(research),
        VisualType::Pie => competitor_share(research),
        VisualType::Framework => competitive_matrix(research),
        VisualType::Table => financial_table(research),
        VisualType::None => None,
    };

    if built.is_none() && entry.visual_type != VisualType::None {
        debug!(
            "No {} visualization for {}: research data not chartable",
            entry.visual_type.as_str(),
            entry.id
        );
    }

    built.map(|mut v| {
        v.entry_id = entry.id.clone();
        v
    })
}

/// Visualizations for every entry, in entry order
pub fn build_all(entries: &[BlueprintEntry], research: &ResearchRecord) -> Vec<Option<Visualization>> {
    entries.iter().map(|e| build(e, research)).collect()
}

fn image_visual(kind: VisualType, title: String, caption: String, svg_text: &str, data: serde_json::Value) -> Visualization {
    Visualization {
        entry_id: String::new(),
        kind,
        encoded_image: Some(svg::to_data_uri(svg_text)),
        title,
        caption,
        data_snapshot: data,
        table: None,
    }
}

fn market_sizing(research: &ResearchRecord) -> Option<Visualization> {
    let market = &research.market_size;
    let literals = [
        ("TAM", market.total_addressable_market.as_str()),
        ("SAM", market.serviceable_addressable_market.as_str()),
        ("Target segment", market.target_segment_size.as_str()),
    ];

    let unit = ValueUnit::detect(literals[0].1);
    let (labels, values): (Vec<String>, Vec<f64>) = literals
        .iter()
        .filter_map(|(label, raw)| parse_as(unit, raw).map(|v| (label.to_string(), v)))
        .unzip();
    if values.is_empty() {
        return None;
    }

    let title = "Market Opportunity Sizing".to_string();
    let svg_text = charts::bar_chart(&title, &labels, &values, unit.axis_label());
    Some(image_visual(
        VisualType::Bar,
        title,
        format!(
            "Addressable market of {} with {} serviceable",
            market.total_addressable_market, market.serviceable_addressable_market
        ),
        &svg_text,
        json!({ "labels": labels, "values": values, "axis_label": unit.axis_label() }),
    ))
}

fn growth_projection(research: &ResearchRecord) -> Option<Visualization> {
    let cagr = &research.growth_metrics.cagr_3yr;
    let rate = to_percent(cagr)? / 100.0;

    let baseline = compound_series(chart::GROWTH_BASE, rate, chart::GROWTH_PERIODS);
    let strategic = compound_series(
        chart::GROWTH_BASE,
        rate * chart::STRATEGIC_MULTIPLIER,
        chart::GROWTH_PERIODS,
    );
    let start_year = chrono::Utc::now().year();
    let years: Vec<String> = (0..chart::GROWTH_PERIODS)
        .map(|i| (start_year + i as i32).to_string())
        .collect();

    let title = format!("Growth Analysis at {} CAGR", cagr.trim());
    let svg_text = charts::line_chart(
        &title,
        &years,
        &[
            Series {
                label: "Current Performance",
                color: palette::GRAY,
                values: &baseline,
            },
            Series {
                label: "Strategic Scenario",
                color: palette::ACCENT,
                values: &strategic,
            },
        ],
        "Growth Index",
    );

    let uplift = strategic.last().copied().unwrap_or(chart::GROWTH_BASE)
        - baseline.last().copied().unwrap_or(chart::GROWTH_BASE);
    Some(image_visual(
        VisualType::Line,
        title,
        format!(
            "Strategic scenario adds {} index points over baseline by {}",
            format_number(uplift),
            years.last().cloned().unwrap_or_default()
        ),
        &svg_text,
        json!({
            "periods": years,
            "series": [
                { "label": "Current Performance", "color": palette::GRAY, "values": baseline },
                { "label": "Strategic Scenario", "color": palette::ACCENT, "values": strategic }
            ]
        }),
    ))
}

fn competitor_share(research: &ResearchRecord) -> Option<Visualization> {
    let (mut labels, mut shares): (Vec<String>, Vec<f64>) = research
        .competitors
        .iter()
        .filter_map(|c| c.share_percent().map(|s| (c.name.clone(), s)))
        .unzip();
    if shares.is_empty() {
        return None;
    }

    let others = 100.0 - shares.iter().sum::<f64>();
    if others > 0.0 {
        labels.push("Others".to_string());
        shares.push(others);
    }

    let title = "Competitive Market Share".to_string();
    let svg_text = charts::pie_chart(&title, &labels, &shares);
    Some(image_visual(
        VisualType::Pie,
        title,
        format!("{} holds {}% of the market", labels[0], format_number(shares[0])),
        &svg_text,
        json!({ "labels": labels, "shares": shares }),
    ))
}

/// Quadrant coordinates for a competitor
pub fn matrix_position(share: Option<f64>, strengths: &[String]) -> (f64, f64) {
    let share = share.unwrap_or(10.0);
    let x = if share > 30.0 {
        0.75
    } else if share > 15.0 {
        0.5
    } else {
        0.25
    };

    let strengths = strengths.join(" ").to_lowercase();
    let y = if strengths.contains("innovation") {
        0.75
    } else if strengths.contains("brand") {
        0.5
    } else {
        0.25
    };
    (x, y)
}

fn competitive_matrix(research: &ResearchRecord) -> Option<Visualization> {
    if research.competitors.is_empty() {
        return None;
    }

    let placed: Vec<(&str, f64, f64, f64)> = research
        .competitors
        .iter()
        .map(|c| {
            let share = c.share_percent();
            let (x, y) = matrix_position(share, &c.strengths);
            (c.name.as_str(), x, y, share.unwrap_or(10.0))
        })
        .collect();
    let points: Vec<MatrixPoint<'_>> = placed
        .iter()
        .map(|(label, x, y, weight)| MatrixPoint {
            label: *label,
            x: *x,
            y: *y,
            weight: *weight,
        })
        .collect();

    let title = "Competitive Landscape Analysis".to_string();
    let svg_text =
        charts::matrix_chart(&title, "Market Presence", "Innovation Capability", &points);
    Some(image_visual(
        VisualType::Framework,
        title,
        "Competitors positioned by market presence and innovation capability".to_string(),
        &svg_text,
        json!({
            "points": placed
                .iter()
                .map(|(name, x, y, share)| json!({ "name": name, "x": x, "y": y, "share": share }))
                .collect::<Vec<_>>()
        }),
    ))
}

fn financial_table(research: &ResearchRecord) -> Option<Visualization> {
    let rows = research.financial_projections.rows();
    if rows.iter().all(|(_, value)| value.trim().is_empty()) {
        return None;
    }

    let mut table = vec![vec!["Metric".to_string(), "Value".to_string()]];
    table.extend(
        rows.iter()
            .map(|(metric, value)| vec![metric.to_string(), value.to_string()]),
    );

    Some(Visualization {
        entry_id: String::new(),
        kind: VisualType::Table,
        encoded_image: None,
        title: "Financial Projections".to_string(),
        caption: "Unit economics from market research".to_string(),
        data_snapshot: json!(
            rows.iter()
                .map(|(metric, value)| json!({ "metric": metric, "value": value }))
                .collect::<Vec<_>>()
        ),
        table: Some(table),
    })
}

// =============================================================================
// Supplementary exhibits
// =============================================================================

/// Waterfall and risk heat map for the appendix
pub fn exhibits(analysis: &ProblemAnalysis) -> Vec<Exhibit> {
    vec![financial_impact(analysis.problem_type), risk_matrix(analysis.stakeholder_complexity)]
}

fn financial_impact(problem_type: ProblemType) -> Exhibit {
    let (categories, values): (&[&str], &[f64]) = match problem_type {
        ProblemType::GrowthStrategy => (
            &[
                "Current Revenue",
                "Market Expansion",
                "New Product Launch",
                "Operational Efficiency",
                "Target Revenue",
            ],
            &[100.0, 45.0, 25.0, 15.0, 185.0],
        ),
        ProblemType::CostOptimization => (
            &[
                "Current Costs",
                "Process Automation",
                "Supply Chain Optimization",
                "Technology Implementation",
                "Target Costs",
            ],
            &[100.0, -20.0, -15.0, -10.0, 55.0],
        ),
        _ => (
            &[
                "Current Revenue",
                "Strategic Initiatives",
                "Cost Reduction",
                "Market Expansion",
                "Target Revenue",
            ],
            &[100.0, 30.0, -10.0, 25.0, 145.0],
        ),
    };

    let title = "Financial Impact Projection";
    let svg_text = charts::waterfall_chart(title, categories, values, "Financial Impact (%)");
    Exhibit {
        id: "financial_impact".to_string(),
        title: title.to_string(),
        caption: format!(
            "Indicative impact bridge for a {} initiative",
            problem_type.label().to_lowercase()
        ),
        encoded_image: svg::to_data_uri(&svg_text),
        data_snapshot: json!({ "categories": categories, "values": values }),
    }
}

fn risk_matrix(complexity: StakeholderComplexity) -> Exhibit {
    let matrix: [[u8; 3]; 3] = match complexity {
        StakeholderComplexity::High => [[2, 3, 1], [3, 4, 2], [1, 3, 4]],
        StakeholderComplexity::Medium => [[1, 2, 1], [2, 3, 2], [1, 2, 3]],
        StakeholderComplexity::Low => [[1, 1, 0], [1, 2, 1], [0, 1, 2]],
    };
    let labels = ["High", "Medium", "Low"];

    let title = "Risk Assessment Matrix";
    let svg_text = charts::heatmap_chart(title, "Probability", "Impact", &labels, &matrix);
    Exhibit {
        id: "risk_matrix".to_string(),
        title: title.to_string(),
        caption: format!(
            "Risk exposure for {} stakeholder complexity",
            crate::types::enum_to_str(&complexity)
        ),
        encoded_image: svg::to_data_uri(&svg_text),
        data_snapshot: json!({ "labels": labels, "matrix": matrix }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{ContentTemplate, SectionPurpose, fallback_analysis};
    use crate::research::Competitor;

    fn entry(visual_type: VisualType) -> BlueprintEntry {
        BlueprintEntry {
            id: "section_03".to_string(),
            title: "Market".to_string(),
            purpose: SectionPurpose::Analysis,
            visual_type,
            content_template: ContentTemplate::ChartMain,
            position: 3,
            key_message: "Large market".to_string(),
            business_question: String::new(),
        }
    }

    #[test]
    fn test_bar_from_fallback_research() {
        let research = ResearchRecord::fallback();
        let viz = build(&entry(VisualType::Bar), &research).unwrap();

        assert_eq!(viz.entry_id, "section_03");
        assert_eq!(viz.data_snapshot["axis_label"], "Market Size ($ Billions)");
        let values = viz.data_snapshot["values"].as_array().unwrap();
        assert_eq!(values.len(), 3);
        assert!((values[2].as_f64().unwrap() - 0.8).abs() < 1e-9);

        let svg_text = viz.svg().unwrap();
        assert!(svg_text.contains("Market Size ($ Billions)"));
    }

    #[test]
    fn test_bar_percent_axis() {
        let mut research = ResearchRecord::fallback();
        research.market_size.total_addressable_market = "45%".to_string();
        research.market_size.serviceable_addressable_market = "30%".to_string();
        research.market_size.target_segment_size = "12%".to_string();

        let viz = build(&entry(VisualType::Bar), &research).unwrap();
        assert_eq!(viz.data_snapshot["axis_label"], "Percentage (%)");
    }

    #[test]
    fn test_bar_without_numbers_is_none() {
        let mut research = ResearchRecord::fallback();
        research.market_size.total_addressable_market = "unknown".to_string();
        research.market_size.serviceable_addressable_market = "unknown".to_string();
        research.market_size.target_segment_size = "unknown".to_string();

        assert!(build(&entry(VisualType::Bar), &research).is_none());
    }

    #[test]
    fn test_line_series_at_ten_percent() {
        let mut research = ResearchRecord::fallback();
        research.growth_metrics.cagr_3yr = "10%".to_string();

        let viz = build(&entry(VisualType::Line), &research).unwrap();
        let series = viz.data_snapshot["series"].as_array().unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0]["label"], "Current Performance");
        assert_eq!(series[1]["color"], palette::ACCENT);

        let baseline: Vec<f64> = series[0]["values"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_f64().unwrap())
            .collect();
        for (got, want) in baseline.iter().zip([100.0, 110.0, 121.0, 133.1, 146.41]) {
            assert!((got - want).abs() < 1e-9);
        }
        assert_eq!(viz.title, "Growth Analysis at 10% CAGR");
    }

    #[test]
    fn test_pie_adds_others() {
        let research = ResearchRecord::fallback();
        let viz = build(&entry(VisualType::Pie), &research).unwrap();

        let labels = viz.data_snapshot["labels"].as_array().unwrap();
        assert_eq!(labels.last().unwrap(), "Others");
        let shares: f64 = viz.data_snapshot["shares"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_f64().unwrap())
            .sum();
        assert!((shares - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_matrix_buckets() {
        let innovative = vec!["Product innovation".to_string()];
        let brand = vec!["Strong Brand".to_string()];
        assert_eq!(matrix_position(Some(35.0), &innovative), (0.75, 0.75));
        assert_eq!(matrix_position(Some(20.0), &brand), (0.5, 0.5));
        assert_eq!(matrix_position(Some(15.0), &[]), (0.25, 0.25));
        assert_eq!(matrix_position(None, &[]), (0.25, 0.25));
    }

    #[test]
    fn test_framework_places_competitors() {
        let mut research = ResearchRecord::fallback();
        research.competitors.push(Competitor {
            name: "Challenger".to_string(),
            market_share: "18%".to_string(),
            strengths: vec!["Brand recognition".to_string()],
            ..Default::default()
        });

        let viz = build(&entry(VisualType::Framework), &research).unwrap();
        let points = viz.data_snapshot["points"].as_array().unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1]["x"], 0.5);
        assert_eq!(points[1]["y"], 0.5);
    }

    #[test]
    fn test_table_has_no_image() {
        let research = ResearchRecord::fallback();
        let viz = build(&entry(VisualType::Table), &research).unwrap();

        assert!(viz.encoded_image.is_none());
        let table = viz.table.unwrap();
        assert_eq!(table[0], vec!["Metric", "Value"]);
        assert_eq!(table.len(), 5);
    }

    #[test]
    fn test_none_and_empty_data() {
        let research = ResearchRecord::fallback();
        assert!(build(&entry(VisualType::None), &research).is_none());

        let mut empty = ResearchRecord::fallback();
        empty.competitors.clear();
        assert!(build(&entry(VisualType::Pie), &empty).is_none());
        assert!(build(&entry(VisualType::Framework), &empty).is_none());
    }

    #[test]
    fn test_exhibits_follow_analysis() {
        let mut analysis = fallback_analysis();
        analysis.problem_type = ProblemType::CostOptimization;
        analysis.stakeholder_complexity = StakeholderComplexity::High;

        let exhibits = exhibits(&analysis);
        assert_eq!(exhibits.len(), 2);
        assert_eq!(exhibits[0].data_snapshot["categories"][0], "Current Costs");
        assert_eq!(exhibits[1].data_snapshot["matrix"][1][1], 4);
        assert!(exhibits.iter().all(|e| e.svg().is_some()));
    }
}
