//! klassiq: curriculum-aligned lesson plan generation for Nigerian classrooms.
//!
//! The library looks up a topic in the national curriculum document, builds
//! a bounded context string from it, assembles a lesson-plan prompt, calls a
//! language model and interprets the reply as a structured plan.

pub mod cli;
pub mod config;
pub mod curriculum;
pub mod error;
pub mod lesson;
pub mod llm;
pub mod prompts;
pub mod utils;

pub use error::{ConfigError, CurriculumError, LlmError, LookupError};
