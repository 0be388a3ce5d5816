//! Local provider used when no model credentials are configured.
//!
//! Returns a fixed sample lesson plan so the rest of the pipeline can be
//! exercised without network access.

use async_trait::async_trait;
use serde_json::json;

use crate::error::LlmError;
use crate::llm::{Choice, GenerationRequest, GenerationResponse, LlmProvider, Message, Usage};

/// Model name reported by [`OfflineProvider`] responses.
pub const OFFLINE_MODEL: &str = "offline";

/// Provider that answers every request with a sample plan.
#[derive(Debug, Clone, Default)]
pub struct OfflineProvider;

impl OfflineProvider {
    pub fn new() -> Self {
        Self
    }

    /// The JSON text returned for every request.
    pub fn sample_plan() -> String {
        json!({
            "title": "SAMPLE LESSON - offline mode",
            "objectives": [
                "(offline) practice objective 1",
                "(offline) practice objective 2"
            ],
            "introduction": "Introduce the topic briefly (offline mode).",
            "activities": ["Activity 1 (discussion)", "Activity 2 (hands-on)"],
            "assessment": ["Ask pupils to summarize the key points"],
            "materials": ["Local objects, chalk, paper"],
            "notes": "Offline mode: no model credentials are configured."
        })
        .to_string()
    }
}

#[async_trait]
impl LlmProvider for OfflineProvider {
    async fn generate(&self, _request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        tracing::warn!("No model credentials configured, returning offline sample plan");
        Ok(GenerationResponse {
            id: "offline".to_string(),
            model: OFFLINE_MODEL.to_string(),
            choices: vec![Choice {
                index: 0,
                message: Message::assistant(Self::sample_plan()),
                finish_reason: "stop".to_string(),
            }],
            usage: Usage::default(),
        })
    }
}
