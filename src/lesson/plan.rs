//! Lesson plan records and generation outcomes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys the model is asked to produce, in template order.
pub const LESSON_PLAN_KEYS: [&str; 12] = [
    "title",
    "objectives",
    "learning_outcomes",
    "introduction",
    "activities",
    "differentiation",
    "materials",
    "assessment",
    "classroom_management",
    "extension",
    "low_data_version",
    "notes",
];

/// Fixed message for replies that contain no parseable JSON object.
pub const UNPARSEABLE_RESPONSE: &str = "model did not return parseable JSON";

/// A model-authored lesson plan.
///
/// Holds the parsed object as-is: key order, extra keys and value shapes are
/// preserved so the plan serializes back to exactly what the model produced.
/// Typed accessors cover the expected keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LessonPlan {
    fields: Map<String, Value>,
}

impl LessonPlan {
    /// Wraps a parsed JSON object.
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// All fields in the order the model wrote them.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Raw value of one field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The `title` field, when it is a string.
    pub fn title(&self) -> Option<&str> {
        self.get("title").and_then(Value::as_str)
    }

    /// Objectives as text; non-string items are skipped.
    pub fn objectives(&self) -> Vec<&str> {
        self.string_items("objectives")
    }

    /// Materials as text; non-string items are skipped.
    pub fn materials(&self) -> Vec<&str> {
        self.string_items("materials")
    }

    /// The `low_data_version` field, when it is a string.
    pub fn low_data_version(&self) -> Option<&str> {
        self.get("low_data_version").and_then(Value::as_str)
    }

    /// Expected keys the model left out, in template order.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        LESSON_PLAN_KEYS
            .iter()
            .copied()
            .filter(|key| !self.fields.contains_key(*key))
            .collect()
    }

    fn string_items(&self, key: &str) -> Vec<&str> {
        match self.get(key) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(single)) => vec![single.as_str()],
            _ => Vec::new(),
        }
    }
}

/// Pipeline stage an [`ErrorRecord`] originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorStage {
    /// The model call failed or timed out.
    Provider,
    /// The model replied but no JSON object could be recovered.
    Parse,
}

/// A generation failure surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Human-readable failure message.
    pub error: String,
    /// The unparsed model output, when there was one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    /// Extra diagnostic detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub stage: ErrorStage,
}

impl ErrorRecord {
    /// A model-call failure.
    pub fn provider(reason: impl std::fmt::Display) -> Self {
        Self {
            error: format!("LLM request failed: {}", reason),
            raw: None,
            detail: None,
            stage: ErrorStage::Provider,
        }
    }

    /// An unparseable reply, keeping the raw text verbatim.
    pub fn unparseable(raw: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            error: UNPARSEABLE_RESPONSE.to_string(),
            raw: Some(raw.into()),
            detail: Some(detail.into()),
            stage: ErrorStage::Parse,
        }
    }
}

/// Either a plan or an error record.
///
/// Serializes untagged: a plan is its own object, an error is
/// `{"error": ..., "stage": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlanResult {
    // Error first so deserialization does not read an error record as a plan.
    Error(ErrorRecord),
    Plan(LessonPlan),
}

impl PlanResult {
    /// Returns true for a plan.
    pub fn is_plan(&self) -> bool {
        matches!(self, PlanResult::Plan(_))
    }

    /// The plan, if generation succeeded.
    pub fn plan(&self) -> Option<&LessonPlan> {
        match self {
            PlanResult::Plan(plan) => Some(plan),
            PlanResult::Error(_) => None,
        }
    }

    /// The error record, if generation failed.
    pub fn error(&self) -> Option<&ErrorRecord> {
        match self {
            PlanResult::Plan(_) => None,
            PlanResult::Error(err) => Some(err),
        }
    }
}

/// Result of one generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub result: PlanResult,
    /// True only when a cache supplied the plan.
    pub from_cache: bool,
}

impl GenerationOutcome {
    /// An outcome produced by a model call.
    pub fn fresh(result: PlanResult) -> Self {
        Self {
            result,
            from_cache: false,
        }
    }

    /// An outcome served from the plan cache.
    pub fn cached(plan: LessonPlan) -> Self {
        Self {
            result: PlanResult::Plan(plan),
            from_cache: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plan(value: Value) -> LessonPlan {
        match value {
            Value::Object(map) => LessonPlan::from_map(map),
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_plan_serializes_unchanged() {
        let source = r#"{"title":"Fractions","zeta":1,"objectives":["a",{"x":2}],"notes":null}"#;
        let parsed: LessonPlan = serde_json::from_str(source).unwrap();
        assert_eq!(serde_json::to_string(&parsed).unwrap(), source);
    }

    #[test]
    fn test_typed_accessors() {
        let plan = plan(json!({
            "title": "Fractions",
            "objectives": ["Identify halves", 3, "Identify quarters"],
            "materials": "oranges",
            "low_data_version": "Short version"
        }));
        assert_eq!(plan.title(), Some("Fractions"));
        assert_eq!(plan.objectives(), vec!["Identify halves", "Identify quarters"]);
        assert_eq!(plan.materials(), vec!["oranges"]);
        assert_eq!(plan.low_data_version(), Some("Short version"));
    }

    #[test]
    fn test_missing_keys_in_template_order() {
        let plan = plan(json!({"title": "x", "objectives": [], "notes": ""}));
        let missing = plan.missing_keys();
        assert_eq!(missing.len(), 9);
        assert_eq!(missing.first(), Some(&"learning_outcomes"));
        assert_eq!(missing.last(), Some(&"low_data_version"));
    }

    #[test]
    fn test_error_record_shapes() {
        let err = ErrorRecord::provider("Model request timed out after 60000 ms");
        let value = serde_json::to_value(PlanResult::Error(err)).unwrap();
        assert_eq!(
            value,
            json!({
                "error": "LLM request failed: Model request timed out after 60000 ms",
                "stage": "provider"
            })
        );

        let err = ErrorRecord::unparseable("plain prose", "no JSON object found in response");
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["error"], UNPARSEABLE_RESPONSE);
        assert_eq!(value["raw"], "plain prose");
        assert_eq!(value["stage"], "parse");
    }

    #[test]
    fn test_outcome_round_trip_keeps_variant() {
        let outcome = GenerationOutcome::fresh(PlanResult::Error(ErrorRecord::unparseable(
            "x", "y",
        )));
        let text = serde_json::to_string(&outcome).unwrap();
        let back: GenerationOutcome = serde_json::from_str(&text).unwrap();
        assert_eq!(back, outcome);

        let outcome = GenerationOutcome::cached(plan(json!({"title": "t"})));
        let text = serde_json::to_string(&outcome).unwrap();
        assert_eq!(text, r#"{"result":{"title":"t"},"from_cache":true}"#);
        let back: GenerationOutcome = serde_json::from_str(&text).unwrap();
        assert!(back.result.is_plan());
    }
}
