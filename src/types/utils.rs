//! Shared utility functions for serialization and string handling.
//!
//! ## Lenient Deserializers
//!
//! Generation output is loosely typed: a market share may come back as `35`,
//! `"35%"` or `null`. `lenient_string` and `lenient_string_vec` accept all of
//! those and keep the literal formatting so downstream stages can read units.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// =============================================================================
// Lenient Deserializers
// =============================================================================

/// Render a scalar JSON value as its literal text, or empty for null/containers.
fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Deserialize a string that the model may have emitted as a number or null.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_text(Value::deserialize(deserializer)?))
}

/// Deserialize a list of strings, accepting a single string or mixed scalars.
pub fn lenient_string_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(arr) => arr.into_iter().map(value_to_text).collect(),
        Value::Null => Vec::new(),
        single => vec![value_to_text(single)],
    };
    Ok(items.into_iter().filter(|s| !s.is_empty()).collect())
}

// =============================================================================
// String Utilities
// =============================================================================

/// Truncate to at most `max_chars` characters on a char boundary, appending `...`.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let cut: String = s.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

/// Rough token estimate (4 ASCII chars or 1.5 non-ASCII chars per token).
pub fn estimate_tokens(content: &str) -> usize {
    let (ascii, other) = content
        .chars()
        .fold((0usize, 0usize), |(a, o), c| if c.is_ascii() { (a + 1, o) } else { (a, o + 1) });
    (ascii as f32 / 4.0) as usize + (other as f32 / 1.5) as usize
}

// =============================================================================
// Type Parsing
// =============================================================================

/// Trait for parsing strings into enum types with a default fallback.
/// Used for generation output where an unknown tag should degrade, not fail.
/// Logs a warning when an invalid value is encountered.
pub trait ParseWithDefault: Sized {
    /// The name of this type for logging purposes.
    fn type_name() -> &'static str;

    /// The default value to use when parsing fails.
    fn default_value() -> Self;

    /// Try to parse the string, returning None if invalid.
    fn try_parse(s: &str) -> Option<Self>;

    /// Parse a string into this type, returning a default value if parsing fails.
    fn parse_or_default(s: &str) -> Self {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        match Self::try_parse(&normalized) {
            Some(v) => v,
            None => {
                tracing::warn!("Invalid {} value '{}', using default", Self::type_name(), s);
                Self::default_value()
            }
        }
    }
}

/// Serialize an enum to its serde string representation (without quotes).
pub fn enum_to_str<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_default()
        .trim_matches('"')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "lenient_string", default)]
        share: String,
        #[serde(deserialize_with = "lenient_string_vec", default)]
        tags: Vec<String>,
    }

    #[test]
    fn test_lenient_string_accepts_numbers() {
        let s: Sample = serde_json::from_str(r#"{"share": 35, "tags": ["a", 2, null]}"#).unwrap();
        assert_eq!(s.share, "35");
        assert_eq!(s.tags, vec!["a", "2"]);
    }

    #[test]
    fn test_lenient_string_null_and_single() {
        let s: Sample = serde_json::from_str(r#"{"share": null, "tags": "solo"}"#).unwrap();
        assert_eq!(s.share, "");
        assert_eq!(s.tags, vec!["solo"]);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdefghij", 4), "abcd...");
        assert_eq!(truncate_chars("안녕하세요", 2), "안녕...");
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcdefgh"), 2);
    }
}
