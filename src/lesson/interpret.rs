//! Turns raw model output into a [`PlanResult`].
//!
//! Two attempts, in order: a strict parse of the whole reply, then a parse of
//! the greedy `{ ... }` span (first `{` through last `}`), which recovers
//! replies wrapped in prose or markdown fences. Anything else becomes an
//! [`ErrorRecord`] that keeps the raw text.

use tracing::debug;

use super::plan::{ErrorRecord, LessonPlan, PlanResult};
use crate::utils::json_extraction::{describe_unparseable, extract_greedy_object, parse_json_object};

/// Interprets a model reply. Never fails; every input maps to a plan or an
/// error record.
pub fn interpret(raw: &str) -> PlanResult {
    if let Some(fields) = parse_json_object(raw) {
        return PlanResult::Plan(LessonPlan::from_map(fields));
    }

    if let Some(fields) = extract_greedy_object(raw).and_then(parse_json_object) {
        debug!(raw_len = raw.len(), "Recovered JSON object from surrounding text");
        return PlanResult::Plan(LessonPlan::from_map(fields));
    }

    let detail = describe_unparseable(raw);
    debug!(raw_len = raw.len(), detail = %detail, "Model reply is not parseable");
    PlanResult::Error(ErrorRecord::unparseable(raw, detail))
}
