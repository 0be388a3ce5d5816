//! LLM integration for lesson-plan generation.
//!
//! Providers implement [`LlmProvider`] and are constructed by the caller,
//! then handed to the generator as `Arc<dyn LlmProvider>`:
//!
//! - [`LiteLlmClient`] - any OpenAI-compatible gateway (`LLM_API_URL`)
//! - [`OpenRouterProvider`] - OpenRouter with retry on transient failures
//! - [`OfflineProvider`] - fixed sample plan when no credentials exist
//!
//! ```no_run
//! use klassiq::llm::{generate_text, LiteLlmClient};
//!
//! # async fn run() -> Result<(), klassiq::error::LlmError> {
//! let client = LiteLlmClient::from_env()?;
//! let text = generate_text(&client, "Write a lesson plan...", 1200, 0.15).await?;
//! println!("{text}");
//! # Ok(())
//! # }
//! ```

pub mod litellm;
pub mod providers;
pub(crate) mod wire;

pub use litellm::{
    Choice, GenerationRequest, GenerationResponse, LiteLlmClient, LlmProvider, Message, Usage,
    DEFAULT_MODEL,
};
pub use providers::{OfflineProvider, OpenRouterProvider};

use crate::error::LlmError;
use crate::prompts::LESSON_PLAN_SYSTEM_PROMPT;

/// Sends `prompt` with the lesson-plan system persona and returns the reply
/// text.
///
/// The provider's default model is used. A missing or blank reply is
/// [`LlmError::EmptyResponse`].
pub async fn generate_text(
    provider: &dyn LlmProvider,
    prompt: &str,
    max_tokens: u32,
    temperature: f64,
) -> Result<String, LlmError> {
    let request = GenerationRequest::new(
        "",
        vec![
            Message::system(LESSON_PLAN_SYSTEM_PROMPT),
            Message::user(prompt),
        ],
    )
    .with_max_tokens(max_tokens)
    .with_temperature(temperature);

    let response = provider.generate(request).await?;
    tracing::debug!(
        model = %response.model,
        prompt_tokens = response.usage.prompt_tokens,
        completion_tokens = response.usage.completion_tokens,
        "Model call completed"
    );

    match response.first_content() {
        Some(content) if !content.trim().is_empty() => Ok(content.to_string()),
        _ => Err(LlmError::EmptyResponse),
    }
}
