//! Configuration for the lesson-plan generator.
//!
//! This module provides configuration options for the generation pipeline:
//! model sampling settings, the model request timeout, the context-string
//! truncation limits and the default curriculum document location.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Marker appended whenever text is cut to fit a limit.
pub const TRUNCATION_MARKER: &str = " ... [truncated]";

/// Character limits applied when building the curriculum context string.
///
/// All limits count Unicode scalar values, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextLimits {
    /// Upper bound for the whole context string.
    pub max_context_chars: usize,
    /// Length an over-long context string is cut to before the marker is appended.
    pub hard_truncate_chars: usize,
    /// Cap for the joined content line.
    pub content_chars: usize,
    /// Cap for the joined teacher-activities line.
    pub teacher_activities_chars: usize,
}

impl Default for ContextLimits {
    fn default() -> Self {
        Self {
            max_context_chars: 4000,
            hard_truncate_chars: 3900,
            content_chars: 500,
            teacher_activities_chars: 300,
        }
    }
}

impl ContextLimits {
    /// Validates that the limits are internally consistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.content_chars == 0 || self.teacher_activities_chars == 0 {
            return Err(ConfigError::ValidationFailed(
                "per-field context limits must be greater than 0".to_string(),
            ));
        }

        let marker_len = TRUNCATION_MARKER.chars().count();
        if self.hard_truncate_chars + marker_len > self.max_context_chars {
            return Err(ConfigError::ValidationFailed(format!(
                "hard_truncate_chars ({}) plus the truncation marker must fit within max_context_chars ({})",
                self.hard_truncate_chars, self.max_context_chars
            )));
        }

        Ok(())
    }
}

/// Configuration for [`crate::lesson::LessonGenerator`].
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    // Model settings
    /// Maximum tokens requested from the model.
    pub max_tokens: u32,
    /// Sampling temperature for the model.
    pub temperature: f64,
    /// Upper bound on a single model call.
    pub request_timeout: Duration,

    // Context settings
    /// Truncation limits for the curriculum context string.
    pub limits: ContextLimits,

    // Storage settings
    /// Location of the merged curriculum document.
    pub curriculum_path: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_tokens: 1200,
            temperature: 0.15,
            request_timeout: Duration::from_secs(60),
            limits: ContextLimits::default(),
            curriculum_path: PathBuf::from("data/curriculum_map.json"),
        }
    }
}

impl GeneratorConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `KLASSIQ_MAX_TOKENS`: Maximum model tokens (default: 1200)
    /// - `KLASSIQ_TEMPERATURE`: Sampling temperature (default: 0.15)
    /// - `KLASSIQ_REQUEST_TIMEOUT_SECS`: Model call timeout (default: 60)
    /// - `KLASSIQ_MAX_CONTEXT_CHARS`: Context string cap (default: 4000)
    /// - `KLASSIQ_HARD_TRUNCATE_CHARS`: Cut length for over-long context (default: 3900)
    /// - `KLASSIQ_CONTENT_CHARS`: Content line cap (default: 500)
    /// - `KLASSIQ_TEACHER_ACTIVITIES_CHARS`: Teacher activities line cap (default: 300)
    /// - `KLASSIQ_CURRICULUM_PATH`: Curriculum document path (default: data/curriculum_map.json)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("KLASSIQ_MAX_TOKENS") {
            config.max_tokens = parse_env_value(&val, "KLASSIQ_MAX_TOKENS")?;
        }

        if let Ok(val) = std::env::var("KLASSIQ_TEMPERATURE") {
            config.temperature = parse_env_value(&val, "KLASSIQ_TEMPERATURE")?;
        }

        if let Ok(val) = std::env::var("KLASSIQ_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = parse_env_value(&val, "KLASSIQ_REQUEST_TIMEOUT_SECS")?;
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Ok(val) = std::env::var("KLASSIQ_MAX_CONTEXT_CHARS") {
            config.limits.max_context_chars = parse_env_value(&val, "KLASSIQ_MAX_CONTEXT_CHARS")?;
        }

        if let Ok(val) = std::env::var("KLASSIQ_HARD_TRUNCATE_CHARS") {
            config.limits.hard_truncate_chars =
                parse_env_value(&val, "KLASSIQ_HARD_TRUNCATE_CHARS")?;
        }

        if let Ok(val) = std::env::var("KLASSIQ_CONTENT_CHARS") {
            config.limits.content_chars = parse_env_value(&val, "KLASSIQ_CONTENT_CHARS")?;
        }

        if let Ok(val) = std::env::var("KLASSIQ_TEACHER_ACTIVITIES_CHARS") {
            config.limits.teacher_activities_chars =
                parse_env_value(&val, "KLASSIQ_TEACHER_ACTIVITIES_CHARS")?;
        }

        if let Ok(val) = std::env::var("KLASSIQ_CURRICULUM_PATH") {
            config.curriculum_path = PathBuf::from(val);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` if any values are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationFailed(
                "temperature must be between 0.0 and 2.0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::ValidationFailed(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        self.limits.validate()
    }

    /// Builder method to set max tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Builder method to set temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Builder method to set the model request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Builder method to set the context limits.
    pub fn with_limits(mut self, limits: ContextLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Builder method to set the curriculum document path.
    pub fn with_curriculum_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.curriculum_path = path.into();
        self
    }
}

fn parse_env_value<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("could not parse '{}'", value),
    })
}
