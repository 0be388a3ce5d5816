//! Lesson-plan generation pipeline.
//!
//! - [`plan`] - lesson plan and error records, generation outcomes
//! - [`interpret`] - recovery of a plan from raw model output
//! - [`generator`] - the request orchestrator
//! - [`cache`] - optional in-memory plan cache
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use klassiq::config::GeneratorConfig;
//! use klassiq::curriculum::CurriculumDocument;
//! use klassiq::lesson::{LessonGenerator, LessonRequest};
//! use klassiq::llm::LiteLlmClient;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = GeneratorConfig::from_env()?;
//! let document = CurriculumDocument::load(&config.curriculum_path)?;
//! let generator = LessonGenerator::new(Arc::new(LiteLlmClient::from_env()?), config)
//!     .with_curriculum(Arc::new(document));
//!
//! let request = LessonRequest::new("Primary 4", "Math", "Fractions").with_teacher_input("mangoes");
//! let outcome = generator.generate_lesson_plan(&request).await;
//! println!("{}", serde_json::to_string_pretty(&outcome)?);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod generator;
pub mod interpret;
pub mod plan;

pub use cache::{CacheKey, PlanCache, PlanCacheConfig, PlanCacheStats};
pub use generator::{LessonGenerator, LessonRequest, NO_CURRICULUM_CONTEXT};
pub use interpret::interpret;
pub use plan::{
    ErrorRecord, ErrorStage, GenerationOutcome, LessonPlan, PlanResult, LESSON_PLAN_KEYS,
    UNPARSEABLE_RESPONSE,
};
