//! Core conversation and generation types.

pub mod generation;
pub mod message;

pub use generation::{FinishReason, GenerationSettings};
pub use message::{AgentToolCall, AgentToolResult, ContentPart, ModelMessage, Role};
