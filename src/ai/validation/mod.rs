//! AI Response Validation
//!
//! JSON extraction and repair for generation output. Structural errors fail
//! with `MalformedOutput`; format issues are repaired.

mod json_repair;

pub use json_repair::{JsonRepairer, extract_json_with_repair_status};
