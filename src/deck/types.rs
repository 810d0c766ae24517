//! Deck Data Model
//!
//! Typed records for the analysis, the blueprint and per-section content.
//! Generated output arrives through loose wire structs (see `analysis` and
//! `content`) and is normalized into these types at the boundary.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::types::{ParseWithDefault, Provenance};

// =============================================================================
// Enumerations
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemType {
    #[default]
    GrowthStrategy,
    OperationalEfficiency,
    MarketEntry,
    DigitalTransformation,
    CostOptimization,
    CompetitiveAnalysis,
    NewProductLaunch,
}

impl ProblemType {
    pub const ALL: [ProblemType; 7] = [
        Self::GrowthStrategy,
        Self::OperationalEfficiency,
        Self::MarketEntry,
        Self::DigitalTransformation,
        Self::CostOptimization,
        Self::CompetitiveAnalysis,
        Self::NewProductLaunch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GrowthStrategy => "growth_strategy",
            Self::OperationalEfficiency => "operational_efficiency",
            Self::MarketEntry => "market_entry",
            Self::DigitalTransformation => "digital_transformation",
            Self::CostOptimization => "cost_optimization",
            Self::CompetitiveAnalysis => "competitive_analysis",
            Self::NewProductLaunch => "new_product_launch",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::GrowthStrategy => "Growth Strategy",
            Self::OperationalEfficiency => "Operational Efficiency",
            Self::MarketEntry => "Market Entry",
            Self::DigitalTransformation => "Digital Transformation",
            Self::CostOptimization => "Cost Optimization",
            Self::CompetitiveAnalysis => "Competitive Analysis",
            Self::NewProductLaunch => "New Product Launch",
        }
    }
}

impl ParseWithDefault for ProblemType {
    fn type_name() -> &'static str {
        "ProblemType"
    }

    fn default_value() -> Self {
        Self::GrowthStrategy
    }

    fn try_parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StakeholderComplexity {
    Low,
    #[default]
    Medium,
    High,
}

impl ParseWithDefault for StakeholderComplexity {
    fn type_name() -> &'static str {
        "StakeholderComplexity"
    }

    fn default_value() -> Self {
        Self::Medium
    }

    fn try_parse(s: &str) -> Option<Self> {
        match s {
            "low" | "simple" => Some(Self::Low),
            "medium" | "moderate" => Some(Self::Medium),
            "high" | "complex" | "highly_complex" => Some(Self::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionPurpose {
    ExecutiveSummary,
    Hypothesis,
    #[default]
    Analysis,
    Implementation,
    Risk,
}

impl ParseWithDefault for SectionPurpose {
    fn type_name() -> &'static str {
        "SectionPurpose"
    }

    fn default_value() -> Self {
        Self::Analysis
    }

    fn try_parse(s: &str) -> Option<Self> {
        match s {
            "executive_summary" | "strategic" | "summary" => Some(Self::ExecutiveSummary),
            "hypothesis" => Some(Self::Hypothesis),
            "analysis" | "analytical" | "financial" => Some(Self::Analysis),
            "implementation" | "recommendations" | "roadmap" => Some(Self::Implementation),
            "risk" | "risks" => Some(Self::Risk),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualType {
    #[default]
    Bar,
    Line,
    Pie,
    Framework,
    Table,
    None,
}

impl VisualType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Pie => "pie",
            Self::Framework => "framework",
            Self::Table => "table",
            Self::None => "none",
        }
    }

    /// Template used when the blueprint omits one
    pub fn default_template(&self) -> ContentTemplate {
        match self {
            Self::Framework => ContentTemplate::Framework,
            Self::None => ContentTemplate::TwoColumn,
            _ => ContentTemplate::ChartMain,
        }
    }
}

impl ParseWithDefault for VisualType {
    fn type_name() -> &'static str {
        "VisualType"
    }

    fn default_value() -> Self {
        Self::Bar
    }

    fn try_parse(s: &str) -> Option<Self> {
        match s {
            "bar" | "bar_chart" => Some(Self::Bar),
            "line" | "line_chart" => Some(Self::Line),
            "pie" | "pie_chart" => Some(Self::Pie),
            "framework" | "matrix" | "process_flow" => Some(Self::Framework),
            "table" => Some(Self::Table),
            "none" | "text" => Some(Self::None),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentTemplate {
    TitleOnly,
    #[default]
    TwoColumn,
    ChartMain,
    Framework,
}

impl ParseWithDefault for ContentTemplate {
    fn type_name() -> &'static str {
        "ContentTemplate"
    }

    fn default_value() -> Self {
        Self::TwoColumn
    }

    fn try_parse(s: &str) -> Option<Self> {
        match s {
            "title_only" | "title" => Some(Self::TitleOnly),
            "two_column" => Some(Self::TwoColumn),
            "chart_main" | "chart" => Some(Self::ChartMain),
            "framework" => Some(Self::Framework),
            _ => None,
        }
    }
}

// =============================================================================
// Problem Analysis
// =============================================================================

/// Classification of the problem statement. Drives blueprint size and
/// research scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemAnalysis {
    pub problem_type: ProblemType,
    /// 1 (simple) to 10 (highly complex)
    pub complexity_score: u8,
    pub stakeholder_complexity: StakeholderComplexity,
    /// Always within the blueprint section bounds
    pub recommended_section_count: usize,
    /// Ordered, 1 to 6 entries
    pub focus_areas: Vec<String>,
    pub key_business_questions: Vec<String>,
    pub industry_context: String,
    pub time_horizon: String,
    pub provenance: Provenance,
}

// =============================================================================
// Blueprint
// =============================================================================

/// One planned section of the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintEntry {
    pub id: String,
    pub title: String,
    pub purpose: SectionPurpose,
    pub visual_type: VisualType,
    pub content_template: ContentTemplate,
    /// Render order, contiguous from 1
    pub position: u32,
    pub key_message: String,
    #[serde(default)]
    pub business_question: String,
}

/// Ordered section plan plus the document-level framing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentBlueprint {
    pub hypothesis: String,
    pub core_question: String,
    pub entries: Vec<BlueprintEntry>,
    pub provenance: Provenance,
}

impl DocumentBlueprint {
    /// Check the structural invariants the renderer relies on.
    ///
    /// Positions must be contiguous from 1 and strictly increasing, ids unique.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();

        if self.entries.is_empty() {
            problems.push("blueprint has no entries".to_string());
        }

        for (index, entry) in self.entries.iter().enumerate() {
            let expected = index as u32 + 1;
            if entry.position != expected {
                problems.push(format!(
                    "entry '{}' has position {} (expected {})",
                    entry.id, entry.position, expected
                ));
            }
        }

        let mut seen = HashSet::new();
        for entry in &self.entries {
            if entry.id.trim().is_empty() {
                problems.push(format!("entry at position {} has an empty id", entry.position));
            } else if !seen.insert(entry.id.as_str()) {
                problems.push(format!("duplicate entry id '{}'", entry.id));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Content Unit
// =============================================================================

/// Narrative content for one blueprint entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentUnit {
    pub entry_id: String,
    pub lead_insight: String,
    /// 3 to 5 when generated; the fallback carries one
    pub supporting_points: Vec<String>,
    pub chart_insight: String,
    pub takeaway: String,
    /// 2 to 3
    pub next_steps: Vec<String>,
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presenter_notes: Option<String>,
    pub provenance: Provenance,
}
