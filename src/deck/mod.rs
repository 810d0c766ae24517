//! Deck planning and writing: problem analysis, blueprint and section content.

pub mod analysis;
pub mod content;
pub mod types;

pub use analysis::{
    AnalysisOptions, ProblemAnalyzer, RetryPolicy, SectionBounds, fallback_analysis,
    fallback_blueprint,
};
pub use content::{ContentOptions, ContentSynthesizer, fallback_unit};
pub use types::{
    BlueprintEntry, ContentTemplate, ContentUnit, DocumentBlueprint, ProblemAnalysis, ProblemType,
    SectionPurpose, StakeholderComplexity, VisualType,
};
