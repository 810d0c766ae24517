pub mod error;
pub mod outcome;
pub mod utils;

pub use error::{DeckError, ErrorCategory, ErrorClassifier, LlmError, Result};
pub use outcome::{Degradation, DegradationKind, Provenance, StageOutput};
pub use utils::{
    ParseWithDefault, enum_to_str, estimate_tokens, lenient_string, lenient_string_vec,
    truncate_chars,
};

// =============================================================================
// Domain Newtypes
// =============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Type-safe wrapper for engagement IDs
///
/// One engagement is one `generate_document` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngagementId(Uuid);

impl EngagementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Short form used in file names and log lines
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for EngagementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EngagementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for EngagementId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod newtype_tests {
    use super::*;

    #[test]
    fn test_engagement_ids_are_unique() {
        let a = EngagementId::new();
        let b = EngagementId::new();
        assert_ne!(a, b);
        assert_eq!(a.as_uuid().get_version_num(), 4);
    }

    #[test]
    fn test_engagement_id_short() {
        let id = EngagementId::new();
        assert_eq!(id.short().len(), 8);
        assert!(id.to_string().starts_with(&id.short()));
    }

    #[test]
    fn test_engagement_id_serializes_as_plain_uuid() {
        let id = EngagementId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }
}
