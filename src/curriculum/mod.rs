//! Curriculum reference data for lesson generation.
//!
//! This module turns free-text (grade, subject, topic) input into curriculum
//! context for the lesson-plan prompt:
//!
//! - [`normalize`] - grade and subject normalization to canonical keys
//! - [`document`] - the nested curriculum document as a tagged-variant tree
//! - [`lookup`] - recursive topic search and browsing projections
//! - [`context`] - bounded-length context string formatting
//!
//! # Usage
//!
//! ```no_run
//! use klassiq::config::ContextLimits;
//! use klassiq::curriculum::{find_topic, format_context, CurriculumDocument};
//!
//! let document = CurriculumDocument::load("data/curriculum_map.json")?;
//! let result = find_topic(&document, "Primary 4", "Math", "Fractions");
//! let context = format_context(&result, &ContextLimits::default());
//! println!("{context}");
//! # Ok::<(), klassiq::error::CurriculumError>(())
//! ```

pub mod context;
pub mod document;
pub mod lookup;
pub mod normalize;

pub use context::{cap_context, format_context};
pub use document::{CurriculumDocument, CurriculumNode, GradeSection, SubjectSection, TopicRecord};
pub use lookup::{find_topic, list_grades, list_subjects, list_topics, LookupResult, TopicMatch};
pub use normalize::{normalize_grade, normalize_subject, GradeBand};
