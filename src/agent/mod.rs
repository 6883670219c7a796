//! Reasoning loop.
//!
//! Wraps the model call in an iterative cycle: feed conversation state plus
//! the tool catalog, receive either a final answer or tool calls, execute the
//! calls, append the results, repeat. The model's decision policy is opaque;
//! the loop's only obligations are to never fabricate a tool result and to
//! surface the last assistant message as the user-visible answer.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use crate::error::{BridgeError, Result};
use crate::provider::{ModelProvider, ProviderRequest, ToolDefinition};
use crate::registry::{ToolDescriptor, ToolOutcome, ToolRegistry};
use crate::types::{ContentPart, GenerationSettings, ModelMessage, Role};

/// Cap on model/tool cycles within a single user turn.
pub const MAX_TOOL_ITERATIONS: usize = 10;

/// Seam between the reasoning loop and the tool registry.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    fn catalog(&self) -> &[ToolDescriptor];

    /// Execute a tool. Faults the model should see come back as
    /// [`ToolOutcome::Failure`]; an `Err` means the session cannot continue
    /// (e.g. the endpoint refused the connection).
    async fn invoke(&self, name: &str, arguments: serde_json::Value) -> Result<ToolOutcome>;
}

#[async_trait]
impl ToolExecutor for ToolRegistry {
    fn catalog(&self) -> &[ToolDescriptor] {
        ToolRegistry::catalog(self)
    }

    async fn invoke(&self, name: &str, arguments: serde_json::Value) -> Result<ToolOutcome> {
        ToolRegistry::invoke(self, name, arguments).await
    }
}

/// A conversational agent bound to one provider and one tool executor.
///
/// Conversation state is append-only and lives as long as the agent.
pub struct Agent {
    provider: Arc<dyn ModelProvider>,
    tools: Arc<dyn ToolExecutor>,
    settings: GenerationSettings,
    messages: Vec<ModelMessage>,
}

impl Agent {
    pub fn new(provider: Arc<dyn ModelProvider>, tools: Arc<dyn ToolExecutor>) -> Self {
        Self {
            provider,
            tools,
            settings: GenerationSettings::default(),
            messages: Vec::new(),
        }
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_system_prompt(mut self, text: impl Into<String>) -> Self {
        self.messages.push(ModelMessage::system(text));
        self
    }

    /// The accumulated conversation state.
    pub fn messages(&self) -> &[ModelMessage] {
        &self.messages
    }

    /// Run one user turn to completion and return the final assistant text.
    pub async fn run_turn(&mut self, user_text: impl Into<String>) -> Result<String> {
        self.messages.push(ModelMessage::user(user_text));

        let tool_defs = self.tool_definitions();

        for iteration in 1..=MAX_TOOL_ITERATIONS {
            let request = ProviderRequest {
                messages: self.messages.clone(),
                settings: self.settings.clone(),
                tools: tool_defs.clone(),
            };
            let response = self.provider.generate(&request).await?;

            if response.tool_calls.is_empty() {
                self.messages.push(ModelMessage::assistant(response.text.clone()));
                debug!(iteration, "turn complete");
                return Ok(response.text);
            }

            let mut content = Vec::new();
            if !response.text.is_empty() {
                content.push(ContentPart::Text {
                    text: response.text.clone(),
                });
            }
            for call in &response.tool_calls {
                content.push(ContentPart::ToolCall(call.clone()));
            }
            self.messages.push(ModelMessage {
                role: Role::Assistant,
                content,
                name: None,
                timestamp: Some(Utc::now()),
            });

            for call in response.tool_calls {
                debug!(tool = %call.name, iteration, "invoking tool");
                // The name is taken verbatim from the model; the executor
                // resolves it against the advertised catalog and turns
                // unknown names into Failure text. An Err here means the
                // transport refused — no fabricated result, the turn fails.
                let outcome = self.tools.invoke(&call.name, call.arguments.clone()).await?;
                if outcome.is_failure() {
                    warn!(tool = %call.name, message = outcome.message(), "tool invocation failed");
                }
                self.messages.push(
                    ModelMessage::tool_result(
                        call.id.clone(),
                        serde_json::Value::String(outcome.message().to_string()),
                        outcome.is_failure(),
                    )
                    .with_name(call.name),
                );
            }
        }

        Err(BridgeError::InvalidState(format!(
            "tool loop exceeded {MAX_TOOL_ITERATIONS} iterations without a final answer"
        )))
    }

    fn tool_definitions(&self) -> Option<Vec<ToolDefinition>> {
        let catalog = self.tools.catalog();
        if catalog.is_empty() {
            return None;
        }
        Some(
            catalog
                .iter()
                .map(|tool| ToolDefinition {
                    name: tool.name.clone(),
                    description: tool.description.clone().unwrap_or_default(),
                    parameters: tool.input_schema.clone(),
                })
                .collect(),
        )
    }
}
