//! Prompt building utilities for schema-generation calls.

use serde_json::Value;

/// Append JSON shape instructions to a prompt.
///
/// Returns the original prompt if the shape is null.
pub fn build_schema_prompt(user_prompt: &str, shape: &Value) -> String {
    if shape.is_null() {
        return user_prompt.to_string();
    }

    let shape_str = serde_json::to_string_pretty(shape).unwrap_or_default();
    format!(
        "{}\n\n---\n\nRespond with a single JSON object with exactly this structure:\n```json\n{}\n```\n\nRespond ONLY with valid JSON, no explanation.",
        user_prompt, shape_str
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_shape_keeps_prompt() {
        let prompt = "Classify this problem";
        assert_eq!(build_schema_prompt(prompt, &Value::Null), prompt);
    }

    #[test]
    fn test_shape_is_appended() {
        let prompt = "Classify this problem";
        let shape = json!({"problem_type": "growth_strategy"});
        let result = build_schema_prompt(prompt, &shape);

        assert!(result.starts_with(prompt));
        assert!(result.contains("\"problem_type\""));
        assert!(result.contains("ONLY with valid JSON"));
    }
}
