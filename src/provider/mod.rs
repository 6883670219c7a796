//! Language-model providers.
//!
//! The model's tool-selection policy is an opaque external dependency: a
//! provider takes the conversation plus a tool catalog and answers with
//! either final text or a set of structured tool calls. Nothing else about
//! its reasoning is modeled here.

pub mod google;
pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{AgentToolCall, FinishReason, GenerationSettings, ModelMessage};

/// A tool advertised to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's arguments.
    pub parameters: serde_json::Value,
}

/// One request to the model.
#[derive(Debug, Clone, Default)]
pub struct ProviderRequest {
    pub messages: Vec<ModelMessage>,
    pub settings: GenerationSettings,
    pub tools: Option<Vec<ToolDefinition>>,
}

/// The model's answer: final text, or tool calls to execute first.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub text: String,
    pub tool_calls: Vec<AgentToolCall>,
    pub finish_reason: Option<FinishReason>,
}

/// Interface to a language model.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Identifier of the underlying model.
    fn model_id(&self) -> &str;

    /// One request/response round trip (no streaming).
    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderResponse>;
}
