//! Shared utility functions for klassiq.
//!
//! This module provides helpers used across multiple modules: JSON
//! extraction from LLM responses and character-safe truncation.

pub mod json_extraction;
pub mod text;

pub use json_extraction::{
    analyze_json_structure, describe_unparseable, extract_greedy_object, parse_json_object,
    JsonStructureAnalysis,
};
pub use text::{truncate_chars, truncate_with_marker};
