//! Stage outcomes: provenance tags and recorded degradations.
//!
//! Stages never propagate recoverable failures. They return a value (generated
//! or fallback) and append a `Degradation` describing what was substituted.

use serde::{Deserialize, Serialize};

use super::error::DeckError;

/// Where a stage value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    #[default]
    Generated,
    Fallback,
}

impl Provenance {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback)
    }
}

/// Failure taxonomy for recovered stage failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradationKind {
    ServiceUnavailable,
    MalformedOutput,
    PartialDataLoss,
}

impl std::fmt::Display for DegradationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
            Self::MalformedOutput => write!(f, "malformed_output"),
            Self::PartialDataLoss => write!(f, "partial_data_loss"),
        }
    }
}

/// One recovered failure, kept on the artifact for the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Degradation {
    pub stage: String,
    /// What was affected (a query, an entry id, a record name)
    pub subject: String,
    pub kind: DegradationKind,
    pub detail: String,
}

impl Degradation {
    /// Record a stage failure that was replaced by fallback data
    pub fn from_error(stage: &str, subject: impl Into<String>, err: &DeckError) -> Self {
        let kind = match err {
            DeckError::MalformedOutput { .. } | DeckError::Json(_) => {
                DegradationKind::MalformedOutput
            }
            DeckError::Search { .. } => DegradationKind::PartialDataLoss,
            e if e.is_service_failure() => DegradationKind::ServiceUnavailable,
            _ => DegradationKind::PartialDataLoss,
        };
        Self {
            stage: stage.to_string(),
            subject: subject.into(),
            kind,
            detail: err.to_string(),
        }
    }

    /// Record data dropped while the run continued
    pub fn partial(stage: &str, subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            stage: stage.to_string(),
            subject: subject.into(),
            kind: DegradationKind::PartialDataLoss,
            detail: detail.into(),
        }
    }
}

/// A stage value plus the degradations recorded while producing it
#[derive(Debug, Clone)]
pub struct StageOutput<T> {
    pub value: T,
    pub degradations: Vec<Degradation>,
}

impl<T> StageOutput<T> {
    pub fn clean(value: T) -> Self {
        Self {
            value,
            degradations: Vec::new(),
        }
    }

    pub fn degraded(value: T, degradation: Degradation) -> Self {
        Self {
            value,
            degradations: vec![degradation],
        }
    }

    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }

    /// Move the degradations into a run-level log and return the value
    pub fn drain_into(self, log: &mut Vec<Degradation>) -> T {
        log.extend(self.degradations);
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ErrorCategory, LlmError};

    #[test]
    fn test_kind_from_error() {
        let malformed = DeckError::malformed("analysis", "no json");
        assert_eq!(
            Degradation::from_error("analysis", "classification", &malformed).kind,
            DegradationKind::MalformedOutput
        );

        let down = DeckError::ServiceUnavailable(LlmError::new(ErrorCategory::Network, "down"));
        assert_eq!(
            Degradation::from_error("content", "section_03", &down).kind,
            DegradationKind::ServiceUnavailable
        );

        let search = DeckError::Search {
            query: "q".into(),
            message: "502".into(),
        };
        assert_eq!(
            Degradation::from_error("research", "q", &search).kind,
            DegradationKind::PartialDataLoss
        );
    }

    #[test]
    fn test_drain_into_collects() {
        let mut log = Vec::new();
        let output = StageOutput::degraded(5, Degradation::partial("research", "q1", "timeout"));
        assert!(output.is_degraded());
        assert_eq!(output.drain_into(&mut log), 5);
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].kind.to_string(), "partial_data_loss");
    }
}
