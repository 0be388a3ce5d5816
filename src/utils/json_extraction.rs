//! JSON extraction utilities for parsing LLM responses.
//!
//! Models are asked to reply with a bare JSON object but frequently wrap it in
//! prose ("Here is your plan: {...}") or markdown fences. The helpers here
//! locate a brace-delimited candidate in such text and report on structure
//! when no candidate parses, so callers can tell a cut-off reply apart from
//! plain prose.
//!
//! # Example
//!
//! ```
//! use klassiq::utils::json_extraction::extract_greedy_object;
//!
//! let response = "Here is the result: {\"title\": \"Fractions\"} Enjoy!";
//! assert_eq!(extract_greedy_object(response), Some("{\"title\": \"Fractions\"}"));
//! ```

use regex::Regex;
use serde_json::{Map, Value};

/// Analysis result for JSON structure
#[derive(Debug, Clone, PartialEq)]
pub struct JsonStructureAnalysis {
    /// Number of unclosed braces ('{' without matching '}')
    pub unclosed_braces: usize,
    /// Number of unclosed brackets ('[' without matching ']')
    pub unclosed_brackets: usize,
    /// Whether we ended inside a string literal
    pub in_string: bool,
    /// The position where JSON-like content starts (first '{' or '[')
    pub json_start: Option<usize>,
}

impl JsonStructureAnalysis {
    /// Returns true if JSON-like content started but never closed.
    pub fn is_truncated(&self) -> bool {
        self.json_start.is_some()
            && (self.unclosed_braces > 0 || self.unclosed_brackets > 0 || self.in_string)
    }
}

/// Analyzes JSON structure to determine if content is truncated
///
/// This function scans the content and tracks brace/bracket depth to detect
/// incomplete JSON structures, ignoring delimiters inside string literals.
pub fn analyze_json_structure(s: &str) -> JsonStructureAnalysis {
    let mut brace_depth: isize = 0;
    let mut bracket_depth: isize = 0;
    let mut in_string = false;
    let mut escape_next = false;
    let mut json_start: Option<usize> = None;

    for (i, c) in s.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => {
                escape_next = true;
            }
            '"' if json_start.is_some() => {
                in_string = !in_string;
            }
            '{' if !in_string => {
                if json_start.is_none() {
                    json_start = Some(i);
                }
                brace_depth += 1;
            }
            '}' if !in_string => {
                brace_depth -= 1;
            }
            '[' if !in_string => {
                if json_start.is_none() {
                    json_start = Some(i);
                }
                bracket_depth += 1;
            }
            ']' if !in_string => {
                bracket_depth -= 1;
            }
            _ => {}
        }
    }

    JsonStructureAnalysis {
        unclosed_braces: brace_depth.max(0) as usize,
        unclosed_brackets: bracket_depth.max(0) as usize,
        in_string,
        json_start,
    }
}

/// Returns the greedy brace-delimited span of `content`: from the first `{`
/// through the last `}`.
///
/// The span is not validated; callers decide whether it parses.
pub fn extract_greedy_object(content: &str) -> Option<&str> {
    let re = Regex::new(r"\{[\s\S]*\}").ok()?;
    re.find(content).map(|m| m.as_str())
}

/// Parses `content` as a JSON object, returning `None` for invalid JSON or
/// any non-object value.
pub fn parse_json_object(content: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Describes why no JSON object could be recovered from `content`.
///
/// Used for diagnostics only; the description is attached next to the raw
/// model output, never in place of it.
pub fn describe_unparseable(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return "response was empty".to_string();
    }

    let analysis = analyze_json_structure(trimmed);
    if analysis.is_truncated() {
        return format!(
            "JSON appears truncated: {} unclosed braces, {} unclosed brackets{}",
            analysis.unclosed_braces,
            analysis.unclosed_brackets,
            if analysis.in_string {
                ", inside a string"
            } else {
                ""
            }
        );
    }

    if analysis.json_start.is_none() {
        return "no JSON object found in response".to_string();
    }

    "brace-delimited content is not valid JSON".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greedy_spans_first_to_last_brace() {
        let input = r#"Plan: {"a": {"b": 1}} and later {"c": 2} done"#;
        assert_eq!(
            extract_greedy_object(input),
            Some(r#"{"a": {"b": 1}} and later {"c": 2}"#)
        );
    }

    #[test]
    fn test_greedy_across_newlines() {
        let input = "```json\n{\n  \"title\": \"X\"\n}\n```";
        assert_eq!(extract_greedy_object(input), Some("{\n  \"title\": \"X\"\n}"));
    }

    #[test]
    fn test_greedy_none_without_braces() {
        assert_eq!(extract_greedy_object("just some prose"), None);
        assert_eq!(extract_greedy_object("} backwards {"), None);
    }

    #[test]
    fn test_parse_json_object_rejects_non_objects() {
        assert!(parse_json_object(r#"{"k": 1}"#).is_some());
        assert!(parse_json_object("[1, 2]").is_none());
        assert!(parse_json_object("42").is_none());
        assert!(parse_json_object("{not json}").is_none());
    }

    #[test]
    fn test_analyze_detects_truncation() {
        let analysis = analyze_json_structure(r#"{"title": "X", "objectives": ["a", "b"#);
        assert!(analysis.is_truncated());
        assert_eq!(analysis.unclosed_braces, 1);
        assert_eq!(analysis.unclosed_brackets, 1);
        assert!(analysis.in_string);
    }

    #[test]
    fn test_analyze_ignores_braces_in_strings() {
        let analysis = analyze_json_structure(r#"{"note": "use { and } freely"}"#);
        assert!(!analysis.is_truncated());
        assert_eq!(analysis.json_start, Some(0));
    }

    #[test]
    fn test_analyze_ignores_quotes_in_leading_prose() {
        let analysis = analyze_json_structure(r#"The "plan" is: {"a": 1}"#);
        assert!(!analysis.is_truncated());
    }

    #[test]
    fn test_describe_unparseable() {
        assert_eq!(describe_unparseable("   "), "response was empty");
        assert_eq!(
            describe_unparseable("Sorry, I cannot help with that."),
            "no JSON object found in response"
        );
        assert!(describe_unparseable(r#"{"title": "X", "#).starts_with("JSON appears truncated"));
        assert_eq!(
            describe_unparseable("{title: X}"),
            "brace-delimited content is not valid JSON"
        );
    }
}
