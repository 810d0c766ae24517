//! JSON Extraction and Repair
//!
//! Pulls a JSON object out of free-text LLM output.
//!
//! The first attempt takes the span from the first `{` to the last `}`.
//! When that fails, the repair path handles:
//! - Markdown code fence wrapping (```json ... ```)
//! - Missing closing braces/brackets
//! - Trailing commas
//! - Truncated strings
//! - Control characters in strings
//! - JSON embedded in explanatory text

use serde_json::Value;
use tracing::{debug, warn};

use crate::types::{DeckError, Result};

// =============================================================================
// Convenience Functions
// =============================================================================

/// Extract a JSON object, returning whether repair was needed
///
/// `target` names the expected record in error messages.
pub fn extract_json_with_repair_status(content: &str, target: &str) -> Result<(Value, bool)> {
    JsonRepairer::new()
        .parse_or_repair(content)
        .map_err(|reason| DeckError::malformed(target, reason))
}

// =============================================================================
// JsonRepairer
// =============================================================================

/// JSON repair strategies
pub struct JsonRepairer {
    max_repair_attempts: usize,
}

impl Default for JsonRepairer {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonRepairer {
    pub fn new() -> Self {
        Self {
            max_repair_attempts: 3,
        }
    }

    /// Parse a JSON object, attempting repair if the direct parse fails
    ///
    /// Returns (Value, was_repaired) or a description of why nothing parsed.
    pub fn parse_or_repair(&self, raw: &str) -> std::result::Result<(Value, bool), String> {
        if let Some(span) = Self::outer_object_span(raw)
            && let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(span)
        {
            return Ok((value, false));
        }

        debug!("Direct JSON parse failed, attempting repair");
        let cleaned = self.preprocess(raw);

        for attempt in 1..=self.max_repair_attempts {
            let repaired = self.repair_attempt(&cleaned, attempt);

            if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(&repaired) {
                warn!("JSON repaired on attempt {}", attempt);
                return Ok((value, true));
            }
        }

        if let Some(extracted) = self.extract_json_from_mixed(&cleaned)
            && let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(&extracted)
        {
            warn!("JSON extracted from mixed content");
            return Ok((value, true));
        }

        Err(format!(
            "no JSON object after {} repair attempts. Content preview: {}...",
            self.max_repair_attempts,
            raw.chars().take(200).collect::<String>()
        ))
    }

    /// Span from the first `{` to the last `}` inclusive
    fn outer_object_span(s: &str) -> Option<&str> {
        let start = s.find('{')?;
        let end = s.rfind('}')?;
        (end > start).then(|| &s[start..=end])
    }

    fn preprocess(&self, raw: &str) -> String {
        let s = self.strip_code_fences(raw.trim());
        let s = s.trim_start_matches('\u{feff}').trim();

        // Drop any prose before the first brace; repairs operate on the JSON tail
        match s.find('{') {
            Some(start) => s[start..].to_string(),
            None => s.to_string(),
        }
    }

    fn strip_code_fences(&self, s: &str) -> String {
        let mut result = s.to_string();

        if result.starts_with("```")
            && let Some(first_newline) = result.find('\n')
        {
            result = result[first_newline + 1..].to_string();
        }

        if let Some(fence) = result.rfind("```") {
            result = result[..fence].trim_end().to_string();
        }

        result
    }

    /// Attempt repair with increasing aggressiveness
    fn repair_attempt(&self, s: &str, level: usize) -> String {
        let mut result = self.fix_trailing_commas(s);

        match level {
            1 => {
                result = self.balance_brackets(&result);
            }
            2 => {
                result = self.fix_truncated_strings(&result);
                result = self.balance_brackets(&result);
            }
            _ => {
                result = self.remove_control_chars(&result);
                result = self.fix_truncated_strings(&result);
                result = self.balance_brackets(&result);
                result = self.truncate_to_valid(&result);
            }
        }

        result
    }

    /// Fix trailing commas before ] or }
    fn fix_trailing_commas(&self, s: &str) -> String {
        let chars: Vec<char> = s.chars().collect();
        let mut result = String::with_capacity(s.len());
        let mut in_string = false;
        let mut escape = false;

        for (i, &ch) in chars.iter().enumerate() {
            if escape {
                escape = false;
                result.push(ch);
                continue;
            }
            match ch {
                '\\' if in_string => escape = true,
                '"' => in_string = !in_string,
                ',' if !in_string => {
                    let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                    if matches!(next, Some(']') | Some('}')) {
                        continue;
                    }
                }
                _ => {}
            }
            result.push(ch);
        }

        result
    }

    /// Balance brackets by adding missing closers in nesting order
    fn balance_brackets(&self, s: &str) -> String {
        let mut result = s.to_string();
        let mut stack: Vec<char> = Vec::new();
        let mut in_string = false;
        let mut escape = false;

        for ch in s.chars() {
            if escape {
                escape = false;
                continue;
            }

            match ch {
                '\\' if in_string => escape = true,
                '"' => in_string = !in_string,
                '{' if !in_string => stack.push('}'),
                '[' if !in_string => stack.push(']'),
                '}' | ']' if !in_string => {
                    stack.pop();
                }
                _ => {}
            }
        }

        if in_string {
            result.push('"');
        }

        while let Some(closer) = stack.pop() {
            result.push(closer);
        }

        result
    }

    /// Close strings cut off by a newline or end of input
    fn fix_truncated_strings(&self, s: &str) -> String {
        let mut result = String::with_capacity(s.len() + 10);
        let mut in_string = false;
        let mut escape = false;

        for ch in s.chars() {
            if escape {
                escape = false;
                result.push(ch);
                continue;
            }

            match ch {
                '\\' if in_string => {
                    escape = true;
                    result.push(ch);
                }
                '"' => {
                    in_string = !in_string;
                    result.push(ch);
                }
                '\n' | '\r' if in_string => {
                    result.push('"');
                    in_string = false;
                    result.push(ch);
                }
                _ => result.push(ch),
            }
        }

        if in_string {
            result.push('"');
        }

        result
    }

    fn remove_control_chars(&self, s: &str) -> String {
        s.chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\r' || *c == '\t')
            .collect()
    }

    /// Truncate to the end of the first complete top-level structure
    fn truncate_to_valid(&self, s: &str) -> String {
        let mut depth = 0i32;
        let mut in_string = false;
        let mut escape = false;

        for (i, ch) in s.char_indices() {
            if escape {
                escape = false;
                continue;
            }

            match ch {
                '\\' if in_string => escape = true,
                '"' => in_string = !in_string,
                '{' | '[' if !in_string => depth += 1,
                '}' | ']' if !in_string => {
                    depth -= 1;
                    if depth == 0 {
                        return s[..i + 1].to_string();
                    }
                }
                _ => {}
            }
        }

        s.to_string()
    }

    /// Extract the first balanced object from mixed content
    fn extract_json_from_mixed(&self, s: &str) -> Option<String> {
        let start = s.find('{')?;
        let mut depth = 0i32;
        let mut in_string = false;
        let mut escape = false;

        for (i, ch) in s[start..].char_indices() {
            if escape {
                escape = false;
                continue;
            }

            match ch {
                '\\' if in_string => escape = true,
                '"' => in_string = !in_string,
                '{' if !in_string => depth += 1,
                '}' if !in_string => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(s[start..start + i + 1].to_string());
                    }
                }
                _ => {}
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_json() {
        let repairer = JsonRepairer::new();
        let (_, repaired) = repairer.parse_or_repair(r#"{"key": "value"}"#).unwrap();
        assert!(!repaired);
    }

    #[test]
    fn test_outer_span_ignores_surrounding_prose() {
        let repairer = JsonRepairer::new();
        let input = "Here is the analysis:\n{\"problem_type\": \"market_entry\"}\nLet me know!";
        let (value, repaired) = repairer.parse_or_repair(input).unwrap();
        assert!(!repaired);
        assert_eq!(value["problem_type"], "market_entry");
    }

    #[test]
    fn test_strip_code_fences() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        let (value, _) = extract_json_with_repair_status(input, "test").unwrap();
        assert_eq!(value["key"], "value");
    }

    #[test]
    fn test_fix_trailing_comma() {
        let repairer = JsonRepairer::new();
        let input = r#"{"entries": [{"id": "a"},]}"#;
        let (value, repaired) = repairer.parse_or_repair(input).unwrap();
        assert!(repaired);
        assert!(value["entries"].is_array());
    }

    #[test]
    fn test_trailing_comma_inside_string_kept() {
        let repairer = JsonRepairer::new();
        let fixed = repairer.fix_trailing_commas(r#"{"a": "x,}", "b": [1,],}"#);
        assert_eq!(fixed, r#"{"a": "x,}", "b": [1]}"#);
    }

    #[test]
    fn test_balance_brackets_in_nesting_order() {
        let repairer = JsonRepairer::new();
        let input = r#"{"entries": [{"id": "a"}"#;
        let (value, repaired) = repairer.parse_or_repair(input).unwrap();
        assert!(repaired);
        assert_eq!(value["entries"][0]["id"], "a");
    }

    #[test]
    fn test_truncated_string() {
        let input = r#"{"lead_insight": "Growth is concentrated in"#;
        let (value, repaired) = extract_json_with_repair_status(input, "content").unwrap();
        assert!(repaired);
        assert_eq!(value["lead_insight"], "Growth is concentrated in");
    }

    #[test]
    fn test_first_object_from_mixed_content() {
        let repairer = JsonRepairer::new();
        let input = r#"{"a": 1} and also {"b": 2}"#;
        let (value, repaired) = repairer.parse_or_repair(input).unwrap();
        assert!(repaired);
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_no_json_is_malformed() {
        let err = extract_json_with_repair_status("I cannot help with that.", "analysis").unwrap_err();
        assert!(matches!(err, DeckError::MalformedOutput { ref target, .. } if target == "analysis"));
    }

    #[test]
    fn test_array_is_not_an_object() {
        assert!(extract_json_with_repair_status("[1, 2, 3]", "blueprint").is_err());
    }
}
