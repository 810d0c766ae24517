//! Blueprint normalization and the deterministic fallback blueprint.

use serde::Deserialize;
use tracing::warn;

use crate::constants::blueprint;
use crate::deck::types::{
    BlueprintEntry, ContentTemplate, DocumentBlueprint, ProblemAnalysis, SectionPurpose,
    VisualType,
};
use crate::types::{ParseWithDefault, Provenance, lenient_string};

/// Visual rotation for generic analysis sections
const ANALYSIS_VISUALS: [VisualType; 5] = [
    VisualType::Bar,
    VisualType::Line,
    VisualType::Pie,
    VisualType::Framework,
    VisualType::Table,
];

const FALLBACK_CORE_QUESTION: &str = "How can we optimize for maximum market impact?";

/// Inclusive section-count bounds
#[derive(Debug, Clone, Copy)]
pub struct SectionBounds {
    pub min: usize,
    pub max: usize,
}

impl Default for SectionBounds {
    fn default() -> Self {
        Self {
            min: blueprint::MIN_SECTIONS,
            max: blueprint::MAX_SECTIONS,
        }
    }
}

impl SectionBounds {
    pub fn clamp(&self, count: usize) -> usize {
        count.clamp(self.min, self.max)
    }
}

// =============================================================================
// Wire Shape
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct BlueprintPayload {
    #[serde(default, deserialize_with = "lenient_string")]
    pub hypothesis: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub core_question: String,
    #[serde(alias = "slide_blueprint", alias = "sections")]
    pub entries: Vec<EntryPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct EntryPayload {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub purpose: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub visual_type: String,
    #[serde(default, alias = "template", deserialize_with = "lenient_string")]
    pub content_template: String,
    #[serde(default, alias = "slide_number", deserialize_with = "lenient_string")]
    pub position: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub key_message: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub business_question: String,
}

impl EntryPayload {
    fn sort_key(&self) -> i64 {
        self.position
            .trim()
            .parse::<f64>()
            .map(|p| p as i64)
            .unwrap_or(i64::MAX)
    }
}

// =============================================================================
// Normalization
// =============================================================================

/// Turn a generated blueprint into one that satisfies every structural
/// invariant. Returns `None` when nothing usable was generated.
pub(crate) fn normalize(
    payload: BlueprintPayload,
    analysis: &ProblemAnalysis,
    bounds: SectionBounds,
) -> Option<DocumentBlueprint> {
    let mut raw: Vec<EntryPayload> = payload
        .entries
        .into_iter()
        .filter(|e| !e.title.trim().is_empty() || !e.key_message.trim().is_empty())
        .collect();
    if raw.is_empty() {
        return None;
    }

    // Stable: entries without a usable position keep their relative order at the end
    raw.sort_by_key(EntryPayload::sort_key);

    if raw.len() > bounds.max {
        warn!(
            "Blueprint has {} entries, truncating to {}",
            raw.len(),
            bounds.max
        );
        raw.truncate(bounds.max);
    }

    let mut entries: Vec<BlueprintEntry> = raw
        .into_iter()
        .enumerate()
        .map(|(index, e)| entry_from_payload(e, index + 1))
        .collect();

    if entries.len() < bounds.min {
        warn!(
            "Blueprint has {} entries, padding to {}",
            entries.len(),
            bounds.min
        );
        while entries.len() < bounds.min {
            let position = entries.len() + 1;
            entries.push(analysis_entry(position));
        }
    }

    if let Some(first) = entries.first_mut() {
        first.content_template = ContentTemplate::TitleOnly;
    }

    Some(DocumentBlueprint {
        hypothesis: non_empty_or(payload.hypothesis, || fallback_hypothesis(analysis)),
        core_question: non_empty_or(payload.core_question, || FALLBACK_CORE_QUESTION.to_string()),
        entries,
        provenance: Provenance::Generated,
    })
}

fn entry_from_payload(e: EntryPayload, position: usize) -> BlueprintEntry {
    let visual_type = if e.visual_type.trim().is_empty() {
        VisualType::Bar
    } else {
        VisualType::parse_or_default(&e.visual_type)
    };
    let content_template = if e.content_template.trim().is_empty() {
        visual_type.default_template()
    } else {
        ContentTemplate::parse_or_default(&e.content_template)
    };
    let purpose = if e.purpose.trim().is_empty() {
        SectionPurpose::Analysis
    } else {
        SectionPurpose::parse_or_default(&e.purpose)
    };
    let title = non_empty_or(e.title, || format!("Section {}", position));
    let key_message = non_empty_or(e.key_message, || title.clone());

    BlueprintEntry {
        id: section_id(position),
        title,
        purpose,
        visual_type,
        content_template,
        position: position as u32,
        key_message,
        business_question: e.business_question,
    }
}

fn non_empty_or(value: String, default: impl FnOnce() -> String) -> String {
    if value.trim().is_empty() {
        default()
    } else {
        value.trim().to_string()
    }
}

pub fn section_id(position: usize) -> String {
    format!("section_{:02}", position)
}

// =============================================================================
// Fallback
// =============================================================================

fn fallback_hypothesis(analysis: &ProblemAnalysis) -> String {
    format!(
        "Strategic initiative will drive {}% business improvement",
        analysis.complexity_score as u32 * 5
    )
}

/// Generic analysis section used by the fallback and for padding
fn analysis_entry(position: usize) -> BlueprintEntry {
    let component = position.saturating_sub(2).max(1);
    let visual_type = ANALYSIS_VISUALS[(position + ANALYSIS_VISUALS.len() - 3) % ANALYSIS_VISUALS.len()];
    BlueprintEntry {
        id: section_id(position),
        title: format!("Strategic Analysis Component {}", component),
        purpose: SectionPurpose::Analysis,
        visual_type,
        content_template: visual_type.default_template(),
        position: position as u32,
        key_message: format!("Key insight for component {}", component),
        business_question: "What does this analysis reveal?".to_string(),
    }
}

/// Deterministic blueprint: executive summary, hypothesis, then
/// `recommended_section_count - 2` generic analysis sections
pub fn fallback_blueprint(analysis: &ProblemAnalysis, bounds: SectionBounds) -> DocumentBlueprint {
    let count = bounds.clamp(analysis.recommended_section_count);

    let mut entries = vec![
        BlueprintEntry {
            id: section_id(1),
            title: "Capture Strategic Opportunity".to_string(),
            purpose: SectionPurpose::ExecutiveSummary,
            visual_type: VisualType::None,
            content_template: ContentTemplate::TitleOnly,
            position: 1,
            key_message: "Clear articulation of market potential".to_string(),
            business_question: "What is the strategic opportunity?".to_string(),
        },
        BlueprintEntry {
            id: section_id(2),
            title: "Define Core Hypothesis".to_string(),
            purpose: SectionPurpose::Hypothesis,
            visual_type: VisualType::Framework,
            content_template: ContentTemplate::Framework,
            position: 2,
            key_message: "Testable strategic premise".to_string(),
            business_question: "What do we believe to be true?".to_string(),
        },
    ];
    entries.extend((3..=count).map(analysis_entry));

    DocumentBlueprint {
        hypothesis: fallback_hypothesis(analysis),
        core_question: FALLBACK_CORE_QUESTION.to_string(),
        entries,
        provenance: Provenance::Fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::analysis::fallback_analysis;
    use proptest::prelude::*;

    const BOUNDS: SectionBounds = SectionBounds { min: 8, max: 20 };

    fn payload(positions: &[&str]) -> BlueprintPayload {
        BlueprintPayload {
            hypothesis: String::new(),
            core_question: "Where do we win?".to_string(),
            entries: positions
                .iter()
                .map(|p| EntryPayload {
                    title: format!("Entry at {}", p),
                    position: p.to_string(),
                    visual_type: "pie_chart".to_string(),
                    ..Default::default()
                })
                .collect(),
        }
    }

    #[test]
    fn test_fallback_shape() {
        let bp = fallback_blueprint(&fallback_analysis(), BOUNDS);
        assert_eq!(bp.len(), 10);
        assert!(bp.validate().is_ok());
        assert_eq!(bp.entries[0].content_template, ContentTemplate::TitleOnly);
        assert_eq!(bp.entries[0].purpose, SectionPurpose::ExecutiveSummary);
        assert_eq!(bp.entries[1].purpose, SectionPurpose::Hypothesis);
        assert_eq!(bp.entries[2].visual_type, VisualType::Bar);
        assert_eq!(bp.entries[3].visual_type, VisualType::Line);
        assert_eq!(bp.entries[2].title, "Strategic Analysis Component 1");
        assert!(bp.provenance.is_fallback());
        assert_eq!(bp.hypothesis, "Strategic initiative will drive 25% business improvement");
    }

    #[test]
    fn test_fallback_clamps_count() {
        let mut analysis = fallback_analysis();
        analysis.recommended_section_count = 40;
        assert_eq!(fallback_blueprint(&analysis, BOUNDS).len(), 20);
        analysis.recommended_section_count = 2;
        assert_eq!(fallback_blueprint(&analysis, BOUNDS).len(), 8);
    }

    #[test]
    fn test_normalize_sorts_and_renumbers() {
        let positions = ["3", "1", "2", "9", "5", "6", "7", "8", "10"];
        let bp = normalize(payload(&positions), &fallback_analysis(), BOUNDS).unwrap();

        assert_eq!(bp.len(), 9);
        assert!(bp.validate().is_ok());
        assert_eq!(bp.entries[0].title, "Entry at 1");
        assert_eq!(bp.entries[2].title, "Entry at 3");
        assert_eq!(bp.entries[3].title, "Entry at 5");
        assert_eq!(bp.entries[0].content_template, ContentTemplate::TitleOnly);
        assert_eq!(bp.entries[1].content_template, ContentTemplate::ChartMain);
        assert_eq!(bp.entries[1].visual_type, VisualType::Pie);
        assert_eq!(bp.core_question, "Where do we win?");
        assert!(bp.hypothesis.contains("25%"));
    }

    #[test]
    fn test_normalize_pads_short_blueprint() {
        let bp = normalize(payload(&["1", "2"]), &fallback_analysis(), BOUNDS).unwrap();
        assert_eq!(bp.len(), 8);
        assert!(bp.validate().is_ok());
        assert_eq!(bp.entries[2].purpose, SectionPurpose::Analysis);
    }

    #[test]
    fn test_normalize_truncates_long_blueprint() {
        let positions: Vec<String> = (1..=30).map(|i| i.to_string()).collect();
        let refs: Vec<&str> = positions.iter().map(String::as_str).collect();
        let bp = normalize(payload(&refs), &fallback_analysis(), BOUNDS).unwrap();
        assert_eq!(bp.len(), 20);
        assert_eq!(bp.entries[19].title, "Entry at 20");
    }

    #[test]
    fn test_normalize_rejects_empty() {
        assert!(normalize(payload(&[]), &fallback_analysis(), BOUNDS).is_none());
    }

    proptest! {
        #[test]
        fn prop_normalized_positions_are_contiguous(
            positions in proptest::collection::vec(
                prop_oneof![
                    (-5i64..50).prop_map(|p| p.to_string()),
                    Just(String::new()),
                    Just("n/a".to_string()),
                ],
                1..40,
            )
        ) {
            let refs: Vec<&str> = positions.iter().map(String::as_str).collect();
            let bp = normalize(payload(&refs), &fallback_analysis(), BOUNDS).unwrap();

            prop_assert!(bp.validate().is_ok());
            prop_assert!(bp.len() >= BOUNDS.min && bp.len() <= BOUNDS.max);
            prop_assert_eq!(bp.entries[0].content_template, ContentTemplate::TitleOnly);
            for (i, entry) in bp.entries.iter().enumerate() {
                prop_assert_eq!(entry.position as usize, i + 1);
            }
        }

        #[test]
        fn prop_fallback_always_valid(count in 0usize..60) {
            let mut analysis = fallback_analysis();
            analysis.recommended_section_count = count;
            let bp = fallback_blueprint(&analysis, BOUNDS);
            prop_assert!(bp.validate().is_ok());
            prop_assert_eq!(bp.len(), BOUNDS.clamp(count));
        }
    }
}
