//! Lesson-plan prompt template and assembly.
//!
//! The template asks the model for a single JSON object with a fixed key set
//! (see [`crate::lesson::LESSON_PLAN_KEYS`]) and shows two structural
//! examples that must not be copied. Assembly is pure string formatting: no
//! retries and no model-specific rewriting happen here.

use serde::{Deserialize, Serialize};

/// Substituted for a missing or empty teacher input.
pub const NO_TEACHER_INPUT: &str = "None provided";

/// System persona sent alongside every lesson-plan prompt.
pub const LESSON_PLAN_SYSTEM_PROMPT: &str = "You are a clear, practical education expert who writes lesson plans for low-resource classrooms in Nigeria.";

/// Prompt template for lesson-plan generation.
///
/// Placeholders: `{curriculum_context}`, `{grade}`, `{subject}`, `{topic}`,
/// `{language}`, `{classroom_context}`, `{teacher_input}`, `{output_mode}`.
pub const LESSON_PLAN_PROMPT: &str = r#"You are an expert curriculum designer and experienced primary/junior secondary teacher. You write short, practical, context-aware lesson plans for low-resource classrooms in Nigeria.
Produce ONE tightly structured lesson plan as JSON for the teacher request below. Be concise and practical.

CURRICULUM CONTEXT (what the national curriculum says about this topic):
{curriculum_context}

TEACHER REQUEST:
- Grade: {grade}
- Subject: {subject}
- Topic: {topic}
- Language: {language}
- Classroom context: {classroom_context}
- Available materials/tools (from the teacher): {teacher_input}
- Output mode: {output_mode}

REQUIREMENTS:
1) Return ONLY a valid JSON object (no explanation, no markdown). It must contain exactly these keys:
   - title (string)
   - objectives (list of short strings, 2-4 items)
   - learning_outcomes (list of short measurable outcomes, 2-4 items)
   - introduction (1-2 short paragraphs on how to hook the pupils)
   - activities (list of step-by-step activities, each with an approximate time)
   - differentiation (short suggestions for low/high ability learners or large classes)
   - materials (list of items the teacher can use; prefer local, low-cost materials)
   - assessment (list of 2-4 quick assessment items or formative tasks)
   - classroom_management (2-3 short practical tips)
   - extension (optional homework or community link)
   - low_data_version (string: one printer-friendly paragraph)
   - notes (short safety, sensitivity or cultural considerations)
2) Make every example and reference realistic for a {classroom_context} Nigerian primary/JSS classroom.
3) Keep the language simple and write in {language}. Use local examples (market, farm, household, local transport, common materials).
4) If the curriculum context is empty or lacks specifics, write a safe generic plan aligned to the subject and grade.
5) If the teacher listed materials, adapt at least one activity to use those materials.
6) If the output mode is "short", keep everything compact: 1-2 objectives and shorter activities. Otherwise use 2-4 objectives.
7) Do NOT include policy prescriptions or clinical advice (no health diagnoses).
8) Keep the whole answer within typical model output limits.

The two examples below show structure only. Do NOT copy their wording or content.

EXAMPLE 1:
{ "title": "Local Fractions (Primary 4)",
  "objectives": ["Understand halves and quarters", "Use everyday objects to show fractions"],
  "learning_outcomes": ["Divide an object into 2 equal parts", "Identify halves in pictures"],
  "introduction": "Ask pupils whether they have ever shared food with a sibling...",
  "activities": [{"step": "Starter", "time": "5 min", "activity": "Cut a mango into halves and discuss."}],
  "differentiation": ["Pair weaker learners with stronger peers", "Use larger objects for low-vision pupils"],
  "materials": ["mango or orange", "paper", "chalk"],
  "assessment": ["Group show-and-tell", "Board exercise: shade half of a shape"],
  "classroom_management": ["Assign roles within groups", "Agree simple hand signals"],
  "extension": "Find three things at home that can be shared in halves",
  "low_data_version": "Starter: show a fruit. Activity: pupils divide a drawing into halves.",
  "notes": "Be sensitive when using food-sharing examples; keep sharing fair." }

EXAMPLE 2:
{ "title": "Soil and Plants (Primary 5)",
  "objectives": ["..."], "learning_outcomes": ["..."], "introduction": "...", "activities": ["..."] }

END OF PROMPT."#;

/// Length of the requested plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum OutputMode {
    /// Compact plan with 1-2 objectives.
    Short,
    /// Complete plan.
    #[default]
    Full,
}

impl OutputMode {
    /// Parses free-text input: exactly "short" is `Short`, every other value
    /// (including "Short" or " short ") is `Full`.
    pub fn from_input(input: &str) -> Self {
        if input == "short" {
            OutputMode::Short
        } else {
            OutputMode::Full
        }
    }

    /// Returns the literal token placed in the prompt.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMode::Short => "short",
            OutputMode::Full => "full",
        }
    }
}

impl From<String> for OutputMode {
    fn from(value: String) -> Self {
        Self::from_input(&value)
    }
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values substituted into a lesson-plan template.
#[derive(Debug, Clone, Copy)]
pub struct LessonPromptInputs<'a> {
    pub grade: &'a str,
    pub subject: &'a str,
    pub topic: &'a str,
    pub language: &'a str,
    pub classroom_context: &'a str,
    pub teacher_input: Option<&'a str>,
    pub output_mode: OutputMode,
    pub curriculum_context: &'a str,
}

/// Builds a lesson-plan prompt by substituting `inputs` into `template`.
///
/// Values are inserted verbatim in a single pass, so placeholder-like text
/// inside a value is never expanded again. An absent or empty teacher input
/// becomes [`NO_TEACHER_INPUT`]. Unknown placeholders are left as written.
pub fn build_prompt(template: &str, inputs: &LessonPromptInputs<'_>) -> String {
    let teacher_input = inputs
        .teacher_input
        .filter(|text| !text.is_empty())
        .unwrap_or(NO_TEACHER_INPUT);

    substitute(template, |name| match name {
        "curriculum_context" => Some(inputs.curriculum_context),
        "grade" => Some(inputs.grade),
        "subject" => Some(inputs.subject),
        "topic" => Some(inputs.topic),
        "language" => Some(inputs.language),
        "classroom_context" => Some(inputs.classroom_context),
        "teacher_input" => Some(teacher_input),
        "output_mode" => Some(inputs.output_mode.as_str()),
        _ => None,
    })
}

/// Replaces `{name}` placeholders (lowercase letters and underscores) using
/// `resolve`; everything else is copied through.
fn substitute<'v>(template: &str, resolve: impl Fn(&str) -> Option<&'v str>) -> String {
    let mut output = String::with_capacity(template.len() + 1024);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];

        let name_len = after_open
            .find(|c: char| !(c.is_ascii_lowercase() || c == '_'))
            .unwrap_or(after_open.len());
        let name = &after_open[..name_len];
        let closes = after_open[name_len..].starts_with('}');

        match resolve(name) {
            Some(value) if closes && !name.is_empty() => {
                output.push_str(value);
                rest = &after_open[name_len + 1..];
            }
            _ => {
                output.push('{');
                rest = after_open;
            }
        }
    }

    output.push_str(rest);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> LessonPromptInputs<'static> {
        LessonPromptInputs {
            grade: "Primary 4",
            subject: "Mathematics",
            topic: "Fractions",
            language: "English",
            classroom_context: "rural",
            teacher_input: Some("I have mangoes and cardboard"),
            output_mode: OutputMode::Full,
            curriculum_context: "Topic: Fractions\nObjectives: Identify halves",
        }
    }

    #[test]
    fn test_all_placeholders_substituted() {
        let prompt = build_prompt(LESSON_PLAN_PROMPT, &inputs());
        for placeholder in [
            "{curriculum_context}",
            "{grade}",
            "{subject}",
            "{topic}",
            "{language}",
            "{classroom_context}",
            "{teacher_input}",
            "{output_mode}",
        ] {
            assert!(!prompt.contains(placeholder), "{placeholder} left in prompt");
        }
        assert!(prompt.contains("- Grade: Primary 4"));
        assert!(prompt.contains("- Topic: Fractions"));
        assert!(prompt.contains("I have mangoes and cardboard"));
        assert!(prompt.contains("Objectives: Identify halves"));
        assert!(prompt.contains("- Output mode: full"));
    }

    #[test]
    fn test_example_json_survives_substitution() {
        let prompt = build_prompt(LESSON_PLAN_PROMPT, &inputs());
        assert!(prompt.contains(r#"{ "title": "Local Fractions (Primary 4)","#));
        assert!(prompt.contains(r#"{"step": "Starter""#));
    }

    #[test]
    fn test_missing_teacher_input_placeholder() {
        let mut values = inputs();
        values.teacher_input = None;
        let prompt = build_prompt(LESSON_PLAN_PROMPT, &values);
        assert!(prompt.contains("(from the teacher): None provided"));

        values.teacher_input = Some("");
        let prompt = build_prompt(LESSON_PLAN_PROMPT, &values);
        assert!(prompt.contains("(from the teacher): None provided"));
    }

    #[test]
    fn test_values_are_not_re_expanded() {
        let mut values = inputs();
        values.topic = "{grade}";
        let prompt = build_prompt("T={topic} G={grade}", &values);
        assert_eq!(prompt, "T={grade} G=Primary 4");
    }

    #[test]
    fn test_unknown_and_malformed_placeholders_kept() {
        let prompt = build_prompt("{unknown} {grade {} {", &inputs());
        assert_eq!(prompt, "{unknown} {grade {} {");
    }

    #[test]
    fn test_output_mode_parsing() {
        assert_eq!(OutputMode::from_input("short"), OutputMode::Short);
        assert_eq!(OutputMode::from_input(" SHORT "), OutputMode::Full);
        assert_eq!(OutputMode::from_input("Short"), OutputMode::Full);
        assert_eq!(OutputMode::from_input("short "), OutputMode::Full);
        assert_eq!(OutputMode::from_input("full"), OutputMode::Full);
        assert_eq!(OutputMode::from_input("summary"), OutputMode::Full);
        assert_eq!(OutputMode::from_input(""), OutputMode::Full);
    }

    #[test]
    fn test_output_mode_serde() {
        let mode: OutputMode = serde_json::from_str(r#""short""#).unwrap();
        assert_eq!(mode, OutputMode::Short);
        let mode: OutputMode = serde_json::from_str(r#""Short""#).unwrap();
        assert_eq!(mode, OutputMode::Full);
        let mode: OutputMode = serde_json::from_str(r#""anything""#).unwrap();
        assert_eq!(mode, OutputMode::Full);
        assert_eq!(serde_json::to_string(&OutputMode::Short).unwrap(), r#""short""#);
    }

    #[test]
    fn test_short_mode_token_in_prompt() {
        let mut values = inputs();
        values.output_mode = OutputMode::Short;
        let prompt = build_prompt(LESSON_PLAN_PROMPT, &values);
        assert!(prompt.contains("- Output mode: short"));
    }
}
