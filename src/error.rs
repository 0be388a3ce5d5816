//! Error types for klassiq operations.
//!
//! Defines error types for each stage of the lesson-plan pipeline:
//! - Curriculum document loading
//! - Curriculum lookup (grade, subject, topic)
//! - LLM API interactions
//! - Configuration parsing and validation
//!
//! Lookup, provider and parse failures are converted into values before they
//! leave the core (see [`crate::lesson::ErrorRecord`]); only loader and
//! configuration faults are meant to reach the host.

use thiserror::Error;

/// Errors that can occur while loading a curriculum document.
#[derive(Debug, Error)]
pub enum CurriculumError {
    #[error("Failed to read curriculum document '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Curriculum document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid curriculum document: {0}")]
    InvalidShape(String),
}

/// Errors produced by a curriculum lookup.
///
/// All variants are recoverable: the orchestrator degrades to a context string
/// describing the failure instead of aborting.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("Grade '{grade}' not found in curriculum. Available grades: {}", .available.join(", "))]
    GradeNotFound {
        grade: String,
        available: Vec<String>,
    },

    #[error("Subject '{subject}' not found for grade '{grade}'. Available subjects: {}", .available.join(", "))]
    SubjectNotFound {
        grade: String,
        subject: String,
        available: Vec<String>,
    },

    #[error("Topic '{topic}' not found in {grade} / {subject}")]
    TopicNotFound {
        grade: String,
        subject: String,
        topic: String,
    },
}

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing API base URL: LLM_API_URL environment variable not set")]
    MissingApiBase,

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse LLM response: {0}")]
    ParseError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },

    #[error("Model returned an empty or blocked response")]
    EmptyResponse,

    #[error("Model request timed out after {millis} ms")]
    Timeout { millis: u64 },
}

/// Errors that can occur while building configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}
