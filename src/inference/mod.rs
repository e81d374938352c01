//! Inference Client: OpenAI-compatible chat completions client.
//!
//! This module handles all communication with the model endpoint:
//! - Non-streaming chat completions with native JSON tool calls
//! - OpenAI and Azure OpenAI request shapes
//! - Connection testing with error classification
//!
//! Switching providers or models is a config change, not a code change.

pub mod client;
pub mod config;
pub mod errors;
pub mod response;
pub mod types;

// Re-exports for convenience
pub use client::{ConnectionStatus, InferenceClient};
pub use config::{ModelConfig, Provider};
pub use errors::InferenceError;
pub use types::{ChatMessage, CompletionResponse, Role, ToolCall, ToolDefinition};
