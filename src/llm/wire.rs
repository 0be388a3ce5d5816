//! OpenAI-compatible `/chat/completions` wire format shared by the HTTP
//! providers.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::litellm::{Choice, GenerationRequest, GenerationResponse, Message, Usage};
use crate::error::LlmError;

/// Path appended to a base URL to reach the chat endpoint.
pub(crate) const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Value sent in the `X-Title` header.
const CLIENT_TITLE: &str = "klassiq";

/// Builds an HTTP client with the given overall timeout.
///
/// Falls back to a default client if the builder rejects the configuration.
pub(crate) fn build_http_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|err| {
            tracing::warn!(error = %err, "Falling back to default HTTP client");
            Client::new()
        })
}

/// Resolves the chat endpoint for a configured URL.
///
/// A URL already ending in `/chat/completions` is used as-is; anything else is
/// treated as a base URL.
pub(crate) fn chat_endpoint(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    if trimmed.ends_with(CHAT_COMPLETIONS_PATH) {
        trimmed.to_string()
    } else {
        format!("{}{}", trimmed, CHAT_COMPLETIONS_PATH)
    }
}

/// Request body for the chat endpoint.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ApiRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ApiRequest {
    /// Builds a request body, using `default_model` when the request names none.
    pub fn from_generation(request: GenerationRequest, default_model: &str) -> Self {
        let model = if request.model.is_empty() {
            default_model.to_string()
        } else {
            request.model
        };
        Self {
            model,
            messages: request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

/// Response body from the chat endpoint.
///
/// Some gateways answer with a bare `text` field instead of `choices`; that
/// shape is accepted too.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<ApiChoice>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    #[serde(default)]
    index: u32,
    message: ApiMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default = "assistant_role")]
    role: String,
    // null when the provider filtered the completion
    content: Option<String>,
}

fn assistant_role() -> String {
    "assistant".to_string()
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Sends one chat completion request. No retries.
pub(crate) async fn send_chat_completion(
    client: &Client,
    url: &str,
    api_key: Option<&str>,
    request: &ApiRequest,
) -> Result<GenerationResponse, LlmError> {
    let mut http_request = client
        .post(url)
        .header("Content-Type", "application/json")
        .header("X-Title", CLIENT_TITLE);

    if let Some(key) = api_key {
        http_request = http_request.header("Authorization", format!("Bearer {}", key));
    }

    let http_response = http_request.json(request).send().await.map_err(|e| {
        if e.is_timeout() {
            LlmError::RequestFailed(format!("timeout: {}", e))
        } else {
            LlmError::RequestFailed(e.to_string())
        }
    })?;

    let status = http_response.status();

    if !status.is_success() {
        let status_code = status.as_u16();
        let error_text = http_response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error response".to_string());
        return Err(api_error(status_code, error_text));
    }

    let api_response: ApiResponse = http_response
        .json()
        .await
        .map_err(|e| LlmError::ParseError(format!("Failed to parse API response: {}", e)))?;

    Ok(into_generation_response(api_response))
}

/// Maps a non-success status and body to an [`LlmError`].
fn api_error(status_code: u16, body: String) -> LlmError {
    let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body,
    };
    if status_code == 429 {
        LlmError::RateLimited(message)
    } else {
        LlmError::ApiError {
            code: status_code,
            message,
        }
    }
}

fn into_generation_response(api_response: ApiResponse) -> GenerationResponse {
    let mut choices: Vec<Choice> = api_response
        .choices
        .into_iter()
        .map(|choice| Choice {
            index: choice.index,
            message: Message {
                role: choice.message.role,
                content: choice.message.content.unwrap_or_default(),
            },
            finish_reason: choice.finish_reason.unwrap_or_else(|| "stop".to_string()),
        })
        .collect();

    if choices.is_empty() {
        if let Some(text) = api_response.text {
            choices.push(Choice {
                index: 0,
                message: Message::assistant(text),
                finish_reason: "stop".to_string(),
            });
        }
    }

    let usage = api_response
        .usage
        .map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        })
        .unwrap_or_default();

    GenerationResponse {
        id: api_response.id,
        model: api_response.model,
        choices,
        usage,
    }
}
