//! Formatting of lookup results into the bounded curriculum context string
//! injected into the lesson-plan prompt.

use crate::config::{ContextLimits, TRUNCATION_MARKER};
use crate::utils::text::{truncate_chars, truncate_with_marker};

use super::lookup::LookupResult;

/// Separator between context lines.
const LINE_DELIMITER: &str = "\n";

/// Separator between items joined onto one line.
const ITEM_SEPARATOR: &str = "; ";

/// Formats a lookup result as a context string of at most
/// `limits.max_context_chars` characters.
///
/// A successful lookup yields, in order and skipping empty fields: the topic
/// name, the objectives, the content (capped at `limits.content_chars`) and
/// the teacher activities (capped at `limits.teacher_activities_chars`). A
/// failed lookup yields a single line stating the reason, so generation can
/// still proceed.
pub fn format_context(result: &LookupResult, limits: &ContextLimits) -> String {
    let context = match result {
        LookupResult::NotFound(err) => format!("Curriculum lookup failed: {}", err),
        LookupResult::Found(found) => {
            let record = &found.record;
            let mut lines = Vec::with_capacity(4);

            lines.push(format!("Topic: {}", record.topic_name));

            if !record.objectives.is_empty() {
                lines.push(format!(
                    "Objectives: {}",
                    record.objectives.join(ITEM_SEPARATOR)
                ));
            }

            if !record.content.is_empty() {
                lines.push(format!(
                    "Content: {}",
                    truncate_with_marker(
                        &record.content.join(ITEM_SEPARATOR),
                        limits.content_chars,
                        TRUNCATION_MARKER,
                    )
                ));
            }

            if !record.teacher_activities.is_empty() {
                lines.push(format!(
                    "Teacher activities: {}",
                    truncate_with_marker(
                        &record.teacher_activities.join(ITEM_SEPARATOR),
                        limits.teacher_activities_chars,
                        TRUNCATION_MARKER,
                    )
                ));
            }

            lines.join(LINE_DELIMITER)
        }
    };

    cap_context(&context, limits)
}

/// Applies the overall context cap: text longer than
/// `limits.max_context_chars` is cut to `limits.hard_truncate_chars` and the
/// truncation marker is appended.
///
/// The cut shrinks further when the marker would not otherwise fit, so the
/// result never exceeds `max_context_chars` even for unvalidated limits. A
/// cap shorter than the marker itself cuts without one.
/// Also used for caller-supplied context strings.
pub fn cap_context(context: &str, limits: &ContextLimits) -> String {
    if context.chars().count() <= limits.max_context_chars {
        return context.to_string();
    }
    let marker_len = TRUNCATION_MARKER.chars().count();
    if limits.max_context_chars < marker_len {
        return truncate_chars(context, limits.max_context_chars).into_owned();
    }
    let keep = limits
        .hard_truncate_chars
        .min(limits.max_context_chars.saturating_sub(marker_len));
    truncate_with_marker(context, keep, TRUNCATION_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curriculum::document::TopicRecord;
    use crate::curriculum::lookup::TopicMatch;
    use crate::error::LookupError;

    fn found(record: TopicRecord) -> LookupResult {
        LookupResult::Found(TopicMatch {
            grade: "Primary 4–6".to_string(),
            subject: "mathematics".to_string(),
            record,
        })
    }

    #[test]
    fn test_full_record_lines_in_order() {
        let record = TopicRecord {
            topic_name: "Fractions".to_string(),
            objectives: vec!["Identify halves".to_string(), "Identify quarters".to_string()],
            content: vec!["Halves".to_string(), "Quarters".to_string()],
            teacher_activities: vec!["Cut an orange".to_string()],
            student_activities: vec!["Share".to_string()],
            resources: vec!["Oranges".to_string()],
        };
        let context = format_context(&found(record), &ContextLimits::default());
        assert_eq!(
            context,
            "Topic: Fractions\n\
             Objectives: Identify halves; Identify quarters\n\
             Content: Halves; Quarters\n\
             Teacher activities: Cut an orange"
        );
    }

    #[test]
    fn test_empty_fields_are_omitted() {
        let context = format_context(
            &found(TopicRecord::named("Counting")),
            &ContextLimits::default(),
        );
        assert_eq!(context, "Topic: Counting");
    }

    #[test]
    fn test_content_and_activities_are_capped() {
        let record = TopicRecord {
            topic_name: "Long".to_string(),
            content: vec!["c".repeat(800)],
            teacher_activities: vec!["t".repeat(800)],
            ..TopicRecord::default()
        };
        let context = format_context(&found(record), &ContextLimits::default());
        let content_line = context
            .lines()
            .find(|l| l.starts_with("Content: "))
            .unwrap();
        assert_eq!(
            content_line,
            format!("Content: {}{}", "c".repeat(500), TRUNCATION_MARKER)
        );
        let activity_line = context
            .lines()
            .find(|l| l.starts_with("Teacher activities: "))
            .unwrap();
        assert_eq!(
            activity_line,
            format!("Teacher activities: {}{}", "t".repeat(300), TRUNCATION_MARKER)
        );
    }

    #[test]
    fn test_failed_lookup_is_one_line() {
        let result = LookupResult::NotFound(LookupError::TopicNotFound {
            grade: "Primary 4–6".to_string(),
            subject: "mathematics".to_string(),
            topic: "Geometry".to_string(),
        });
        let context = format_context(&result, &ContextLimits::default());
        assert!(context.starts_with("Curriculum lookup failed: "));
        assert!(context.contains("Geometry"));
        assert_eq!(context.lines().count(), 1);
    }

    #[test]
    fn test_never_exceeds_cap() {
        let record = TopicRecord {
            topic_name: "x".repeat(10_000),
            objectives: vec!["o".repeat(10_000); 3],
            ..TopicRecord::default()
        };
        let limits = ContextLimits::default();
        let context = format_context(&found(record), &limits);
        assert!(context.chars().count() <= limits.max_context_chars);
        assert!(context.ends_with(TRUNCATION_MARKER));
        assert_eq!(
            context.chars().count(),
            limits.hard_truncate_chars + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn test_cap_context_leaves_short_text() {
        let limits = ContextLimits::default();
        assert_eq!(cap_context("short", &limits), "short");
        let exact = "a".repeat(limits.max_context_chars);
        assert_eq!(cap_context(&exact, &limits), exact);
    }

    #[test]
    fn test_cap_holds_for_inconsistent_limits() {
        let limits = ContextLimits {
            max_context_chars: 100,
            hard_truncate_chars: 100,
            ..ContextLimits::default()
        };
        let capped = cap_context(&"z".repeat(500), &limits);
        assert_eq!(capped.chars().count(), 100);
        assert!(capped.ends_with(TRUNCATION_MARKER));

        let tiny = ContextLimits {
            max_context_chars: 4,
            hard_truncate_chars: 3900,
            ..ContextLimits::default()
        };
        assert_eq!(cap_context("abcdefgh", &tiny), "abcd");
    }
}
