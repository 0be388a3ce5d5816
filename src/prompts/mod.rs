//! LLM prompts for lesson-plan generation.
//!
//! - [`lesson_plan`] - the fixed lesson-plan template, system persona and
//!   prompt assembly
//!
//! # Usage
//!
//! ```
//! use klassiq::prompts::{build_prompt, LessonPromptInputs, OutputMode, LESSON_PLAN_PROMPT};
//!
//! let prompt = build_prompt(
//!     LESSON_PLAN_PROMPT,
//!     &LessonPromptInputs {
//!         grade: "Primary 4",
//!         subject: "Mathematics",
//!         topic: "Fractions",
//!         language: "English",
//!         classroom_context: "rural",
//!         teacher_input: None,
//!         output_mode: OutputMode::Short,
//!         curriculum_context: "Topic: Fractions",
//!     },
//! );
//! assert!(prompt.contains("- Topic: Fractions"));
//! ```

pub mod lesson_plan;

pub use lesson_plan::{
    build_prompt, LessonPromptInputs, OutputMode, LESSON_PLAN_PROMPT, LESSON_PLAN_SYSTEM_PROMPT,
    NO_TEACHER_INPUT,
};
