//! Lesson-plan generation.
//!
//! [`LessonGenerator::generate_lesson_plan`] resolves curriculum context,
//! assembles the prompt, calls the model under a timeout and interprets the
//! reply. It always returns a [`GenerationOutcome`]; failures become
//! [`ErrorRecord`]s.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::cache::{CacheKey, PlanCache};
use super::interpret::interpret;
use super::plan::{ErrorRecord, GenerationOutcome, PlanResult};
use crate::config::GeneratorConfig;
use crate::curriculum::{cap_context, find_topic, format_context, CurriculumDocument};
use crate::error::LlmError;
use crate::llm::{generate_text, LlmProvider};
use crate::prompts::{build_prompt, LessonPromptInputs, OutputMode, LESSON_PLAN_PROMPT};

/// Context used when neither the caller nor a curriculum document supplies any.
pub const NO_CURRICULUM_CONTEXT: &str = "(no curriculum context provided)";

fn default_language() -> String {
    "English".to_string()
}

fn default_classroom_context() -> String {
    "rural".to_string()
}

/// One lesson-plan request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonRequest {
    pub subject: String,
    pub grade: String,
    pub topic: String,
    /// Pre-computed context; skips the curriculum lookup when present.
    #[serde(default)]
    pub curriculum_context: Option<String>,
    /// Materials or notes from the teacher.
    #[serde(default)]
    pub teacher_input: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    /// Setting such as "rural" or "urban".
    #[serde(default = "default_classroom_context")]
    pub classroom_context: String,
    #[serde(default)]
    pub output_mode: OutputMode,
}

impl LessonRequest {
    /// Creates a request with English, rural and full-length defaults.
    pub fn new(
        grade: impl Into<String>,
        subject: impl Into<String>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            grade: grade.into(),
            topic: topic.into(),
            curriculum_context: None,
            teacher_input: None,
            language: default_language(),
            classroom_context: default_classroom_context(),
            output_mode: OutputMode::Full,
        }
    }

    pub fn with_curriculum_context(mut self, context: impl Into<String>) -> Self {
        self.curriculum_context = Some(context.into());
        self
    }

    pub fn with_teacher_input(mut self, input: impl Into<String>) -> Self {
        self.teacher_input = Some(input.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_classroom_context(mut self, context: impl Into<String>) -> Self {
        self.classroom_context = context.into();
        self
    }

    pub fn with_output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }
}

/// Generates lesson plans with an injected model provider.
pub struct LessonGenerator {
    llm: Arc<dyn LlmProvider>,
    config: GeneratorConfig,
    curriculum: Option<Arc<CurriculumDocument>>,
    cache: Option<Arc<PlanCache>>,
}

impl std::fmt::Debug for LessonGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LessonGenerator")
            .field("config", &self.config)
            .field("has_curriculum", &self.curriculum.is_some())
            .field("has_cache", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

impl LessonGenerator {
    /// Creates a generator without curriculum data or caching.
    pub fn new(llm: Arc<dyn LlmProvider>, config: GeneratorConfig) -> Self {
        Self {
            llm,
            config,
            curriculum: None,
            cache: None,
        }
    }

    /// Attaches the curriculum document used to derive context.
    pub fn with_curriculum(mut self, document: Arc<CurriculumDocument>) -> Self {
        self.curriculum = Some(document);
        self
    }

    /// Attaches a plan cache.
    pub fn with_cache(mut self, cache: Arc<PlanCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn curriculum(&self) -> Option<&CurriculumDocument> {
        self.curriculum.as_deref()
    }

    /// Resolves the context string for a request.
    ///
    /// A caller-supplied context is capped like a formatted one. Otherwise the
    /// attached document is searched; a failed lookup yields a one-line
    /// explanation rather than an error.
    pub fn resolve_context(&self, request: &LessonRequest) -> String {
        let limits = &self.config.limits;

        let context = match (&request.curriculum_context, &self.curriculum) {
            (Some(supplied), _) => cap_context(supplied, limits),
            (None, Some(document)) => {
                let lookup = find_topic(document, &request.grade, &request.subject, &request.topic);
                if let Some(err) = lookup.error() {
                    info!(error = %err, "Continuing without curriculum match");
                }
                format_context(&lookup, limits)
            }
            (None, None) => String::new(),
        };

        if context.trim().is_empty() {
            NO_CURRICULUM_CONTEXT.to_string()
        } else {
            context
        }
    }

    /// Builds the full prompt for a request.
    pub fn prompt_for(&self, request: &LessonRequest) -> String {
        let context = self.resolve_context(request);
        build_prompt(
            LESSON_PLAN_PROMPT,
            &LessonPromptInputs {
                grade: &request.grade,
                subject: &request.subject,
                topic: &request.topic,
                language: &request.language,
                classroom_context: &request.classroom_context,
                teacher_input: request.teacher_input.as_deref(),
                output_mode: request.output_mode,
                curriculum_context: &context,
            },
        )
    }

    /// Generates a lesson plan. Never fails: provider, timeout and parse
    /// failures come back as an error record with `from_cache: false`.
    #[instrument(
        skip(self, request),
        fields(
            request_id = %Uuid::new_v4(),
            grade = %request.grade,
            subject = %request.subject,
            topic = %request.topic
        )
    )]
    pub async fn generate_lesson_plan(&self, request: &LessonRequest) -> GenerationOutcome {
        let Some(cache) = &self.cache else {
            return self.generate_uncached(request).await;
        };

        let key = CacheKey::for_request(request);
        let _guard = cache.lock_key(&key).await;

        if let Some(plan) = cache.get(&key).await {
            info!(key = %key, "Serving lesson plan from cache");
            return GenerationOutcome::cached(plan);
        }

        let outcome = self.generate_uncached(request).await;
        if let PlanResult::Plan(plan) = &outcome.result {
            cache.insert(key, plan.clone()).await;
        }
        outcome
    }

    async fn generate_uncached(&self, request: &LessonRequest) -> GenerationOutcome {
        let started = Instant::now();
        let prompt = self.prompt_for(request);
        debug!(prompt_chars = prompt.chars().count(), "Prompt assembled");

        let raw = match self.call_model(&prompt).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(
                    error = %err,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Model call failed"
                );
                return GenerationOutcome::fresh(PlanResult::Error(ErrorRecord::provider(err)));
            }
        };

        let result = interpret(&raw);
        match &result {
            PlanResult::Plan(plan) => {
                let missing = plan.missing_keys();
                if !missing.is_empty() {
                    debug!(missing = ?missing, "Lesson plan is missing expected keys");
                }
                info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Lesson plan generated"
                );
            }
            PlanResult::Error(err) => {
                warn!(
                    detail = err.detail.as_deref().unwrap_or_default(),
                    raw_chars = raw.chars().count(),
                    "Model reply could not be parsed"
                );
            }
        }

        GenerationOutcome::fresh(result)
    }

    async fn call_model(&self, prompt: &str) -> Result<String, LlmError> {
        let timeout = self.config.request_timeout;
        let call = generate_text(
            self.llm.as_ref(),
            prompt,
            self.config.max_tokens,
            self.config.temperature,
        );

        match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout {
                millis: timeout.as_millis() as u64,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContextLimits, TRUNCATION_MARKER};
    use crate::llm::{Choice, GenerationRequest, GenerationResponse, Message, Usage};
    use crate::lesson::plan::ErrorStage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Mock LLM provider that records prompts and replies with fixed text.
    struct MockLlmProvider {
        response: Mutex<String>,
        prompts: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl MockLlmProvider {
        fn new(response: impl Into<String>) -> Self {
            Self {
                response: Mutex::new(response.into()),
                prompts: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }

        fn last_prompt(&self) -> String {
            self.prompts
                .lock()
                .expect("lock not poisoned")
                .last()
                .cloned()
                .expect("at least one call")
        }
    }

    #[async_trait]
    impl LlmProvider for MockLlmProvider {
        async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(user) = request.messages.iter().find(|m| m.role == "user") {
                self.prompts
                    .lock()
                    .expect("lock not poisoned")
                    .push(user.content.clone());
            }
            let content = self.response.lock().expect("lock not poisoned").clone();
            Ok(GenerationResponse {
                id: "mock-id".to_string(),
                model: "mock-model".to_string(),
                choices: vec![Choice {
                    index: 0,
                    message: Message::assistant(content),
                    finish_reason: "stop".to_string(),
                }],
                usage: Usage {
                    prompt_tokens: 100,
                    completion_tokens: 100,
                    total_tokens: 200,
                },
            })
        }
    }

    /// Provider that never answers in time.
    struct SlowLlmProvider;

    #[async_trait]
    impl LlmProvider for SlowLlmProvider {
        async fn generate(&self, _request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Err(LlmError::EmptyResponse)
        }
    }

    /// Provider that always fails.
    struct FailingLlmProvider;

    #[async_trait]
    impl LlmProvider for FailingLlmProvider {
        async fn generate(&self, _request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
            Err(LlmError::ApiError {
                code: 401,
                message: "invalid key".to_string(),
            })
        }
    }

    fn document() -> Arc<CurriculumDocument> {
        let doc = CurriculumDocument::from_json_str(
            r#"{
                "Primary 4–6": {
                    "mathematics": {
                        "THEMES": [{"SUB THEMES": [{"TOPICS": [{
                            "TOPIC": "Fractions",
                            "PERFORMANCE OBJECTIVES": ["Identify halves", "Identify quarters"],
                            "CONTENT": ["Halves and quarters"]
                        }]}]}]
                    }
                }
            }"#,
        )
        .expect("fixture should parse");
        Arc::new(doc)
    }

    fn mock_response() -> String {
        r#"{"title": "Sharing Fractions", "objectives": ["Identify halves"], "activities": []}"#
            .to_string()
    }

    #[tokio::test]
    async fn test_generate_with_curriculum_lookup() {
        let llm = Arc::new(MockLlmProvider::new(mock_response()));
        let generator =
            LessonGenerator::new(llm.clone(), GeneratorConfig::default()).with_curriculum(document());

        let outcome = generator
            .generate_lesson_plan(&LessonRequest::new("Primary 4", "Math", "Fractions"))
            .await;

        assert!(!outcome.from_cache);
        assert_eq!(
            outcome.result.plan().and_then(|p| p.title()),
            Some("Sharing Fractions")
        );

        let prompt = llm.last_prompt();
        assert!(prompt.contains("Topic: Fractions"));
        assert!(prompt.contains("Objectives: Identify halves; Identify quarters"));
        assert!(prompt.contains("(from the teacher): None provided"));
        assert!(prompt.contains("- Output mode: full"));
    }

    #[tokio::test]
    async fn test_lookup_failure_degrades_context() {
        let llm = Arc::new(MockLlmProvider::new(mock_response()));
        let generator =
            LessonGenerator::new(llm.clone(), GeneratorConfig::default()).with_curriculum(document());

        let outcome = generator
            .generate_lesson_plan(&LessonRequest::new("JSS 1", "Unknown Subject", "Anything"))
            .await;

        assert!(outcome.result.is_plan());
        let prompt = llm.last_prompt();
        assert!(prompt.contains("Curriculum lookup failed: "));
        assert!(prompt.contains("Junior Secondary 1–3"));
    }

    #[test]
    fn test_resolve_context_variants() {
        let llm: Arc<dyn LlmProvider> = Arc::new(MockLlmProvider::new(mock_response()));
        let generator = LessonGenerator::new(Arc::clone(&llm), GeneratorConfig::default());

        let request = LessonRequest::new("Primary 4", "Math", "Fractions");
        assert_eq!(generator.resolve_context(&request), NO_CURRICULUM_CONTEXT);

        let blank = request.clone().with_curriculum_context("   ");
        assert_eq!(generator.resolve_context(&blank), NO_CURRICULUM_CONTEXT);

        let supplied = request.clone().with_curriculum_context("Teacher notes");
        assert_eq!(generator.resolve_context(&supplied), "Teacher notes");

        let long = request.with_curriculum_context("z".repeat(5000));
        let capped = generator.resolve_context(&long);
        let limits = ContextLimits::default();
        assert_eq!(
            capped.chars().count(),
            limits.hard_truncate_chars + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn test_supplied_context_skips_lookup() {
        let llm: Arc<dyn LlmProvider> = Arc::new(MockLlmProvider::new(mock_response()));
        let generator =
            LessonGenerator::new(llm, GeneratorConfig::default()).with_curriculum(document());
        let request = LessonRequest::new("Primary 4", "Math", "Fractions")
            .with_curriculum_context("Use the school garden");
        assert_eq!(generator.resolve_context(&request), "Use the school garden");
    }

    #[tokio::test]
    async fn test_timeout_returns_error_record() {
        let config = GeneratorConfig::default().with_request_timeout(Duration::from_millis(50));
        let generator = LessonGenerator::new(Arc::new(SlowLlmProvider), config);

        let outcome = generator
            .generate_lesson_plan(&LessonRequest::new("Primary 4", "Math", "Fractions"))
            .await;

        assert!(!outcome.from_cache);
        let err = outcome.result.error().expect("error record");
        assert_eq!(err.stage, ErrorStage::Provider);
        assert!(err.error.contains("timed out after 50 ms"), "{}", err.error);
    }

    #[tokio::test]
    async fn test_provider_error_becomes_record() {
        let generator =
            LessonGenerator::new(Arc::new(FailingLlmProvider), GeneratorConfig::default());

        let outcome = generator
            .generate_lesson_plan(&LessonRequest::new("Primary 4", "Math", "Fractions"))
            .await;

        let err = outcome.result.error().expect("error record");
        assert!(err.error.contains("invalid key"));
        assert!(err.raw.is_none());
    }

    #[tokio::test]
    async fn test_unparseable_reply_keeps_raw() {
        let llm = Arc::new(MockLlmProvider::new("I cannot help with that."));
        let generator = LessonGenerator::new(llm, GeneratorConfig::default());

        let outcome = generator
            .generate_lesson_plan(&LessonRequest::new("Primary 4", "Math", "Fractions"))
            .await;

        let err = outcome.result.error().expect("error record");
        assert_eq!(err.raw.as_deref(), Some("I cannot help with that."));
        assert_eq!(err.stage, ErrorStage::Parse);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_model() {
        let llm = Arc::new(MockLlmProvider::new(mock_response()));
        let cache = Arc::new(PlanCache::new(8));
        let generator = LessonGenerator::new(llm.clone(), GeneratorConfig::default())
            .with_cache(Arc::clone(&cache));
        let request = LessonRequest::new("Primary 4", "Math", "Fractions");

        let first = generator.generate_lesson_plan(&request).await;
        let second = generator.generate_lesson_plan(&request).await;

        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(first.result, second.result);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let llm = Arc::new(MockLlmProvider::new("not json"));
        let cache = Arc::new(PlanCache::new(8));
        let generator = LessonGenerator::new(llm.clone(), GeneratorConfig::default())
            .with_cache(Arc::clone(&cache));
        let request = LessonRequest::new("Primary 4", "Math", "Fractions");

        generator.generate_lesson_plan(&request).await;
        let second = generator.generate_lesson_plan(&request).await;

        assert!(!second.from_cache);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_identical_requests_share_one_call() {
        let llm = Arc::new(MockLlmProvider::new(mock_response()));
        let generator = Arc::new(
            LessonGenerator::new(llm.clone(), GeneratorConfig::default())
                .with_cache(Arc::new(PlanCache::new(8))),
        );
        let request = LessonRequest::new("Primary 4", "Math", "Fractions");

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let generator = Arc::clone(&generator);
                let request = request.clone();
                tokio::spawn(async move { generator.generate_lesson_plan(&request).await })
            })
            .collect();

        let mut cached = 0;
        for handle in handles {
            if handle.await.expect("task completes").from_cache {
                cached += 1;
            }
        }

        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cached, 3);
    }

    #[test]
    fn test_request_deserialize_defaults() {
        let request: LessonRequest = serde_json::from_str(
            r#"{"subject": "Math", "grade": "Primary 4", "topic": "Fractions", "output_mode": "SHORT"}"#,
        )
        .unwrap();
        assert_eq!(request.language, "English");
        assert_eq!(request.classroom_context, "rural");
        assert_eq!(request.output_mode, OutputMode::Full);
        assert!(request.teacher_input.is_none());
    }
}
