//! Concrete [`LlmProvider`] implementations besides the generic client.

pub mod offline;
pub mod openrouter;

pub use offline::OfflineProvider;
pub use openrouter::OpenRouterProvider;
