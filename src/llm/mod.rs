//! LLM module - Language Model integrations
//!
//! Provides abstractions for different LLM backends with OpenAI as the primary.

pub mod openai;
pub mod traits;

pub use openai::OpenAiClient;
pub use traits::{GenerateOptions, LLMProvider, LLMResponse, TokenUsage};
