//! Tool Registry Client.
//!
//! Connects to one or more MCP endpoints over SSE, fetches each endpoint's
//! tool catalog once per session, and routes invocations to the endpoint that
//! advertised the tool. Transport faults cross the invocation boundary as
//! [`ToolOutcome::Failure`] strings — the reasoning loop only ever sees text
//! from tool execution — except a connection refusal, which escapes as an
//! error so the session can end instead of relaying it to the model.

pub mod schema;

pub use schema::ToolDescriptor;

use std::collections::HashMap;

use async_trait::async_trait;
use rmcp::{
    model::{CallToolRequestParam, CallToolResult, Content, JsonObject, ResourceContents},
    service::{RoleClient, RunningService, ServiceError},
    transport::SseClientTransport,
    ServiceExt,
};
use tracing::info;

use crate::error::{BridgeError, Result};

/// Outcome of one tool invocation. Always a human-readable string; failures
/// are distinguishable only by text content, not by type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    Success(String),
    Failure(String),
}

impl ToolOutcome {
    pub fn message(&self) -> &str {
        match self {
            Self::Success(m) | Self::Failure(m) => m,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

/// One connected endpoint. A trait seam so registry behavior is testable
/// without a live server.
#[async_trait]
trait EndpointSession: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>>;
    async fn call_tool(&self, name: &str, arguments: Option<JsonObject>) -> Result<ToolOutcome>;
    async fn close(self: Box<Self>);
}

/// rmcp-backed session over a long-lived SSE channel.
struct RmcpSession {
    service: RunningService<RoleClient, ()>,
}

#[async_trait]
impl EndpointSession for RmcpSession {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
        let tools = self
            .service
            .list_all_tools()
            .await
            .map_err(|e| map_service_error("list_tools", e))?;
        Ok(tools.into_iter().map(map_tool_descriptor).collect())
    }

    async fn call_tool(&self, name: &str, arguments: Option<JsonObject>) -> Result<ToolOutcome> {
        let result = self
            .service
            .call_tool(CallToolRequestParam {
                name: name.to_owned().into(),
                arguments,
            })
            .await
            .map_err(|e| map_service_error("call_tool", e))?;
        Ok(map_call_result(result))
    }

    async fn close(self: Box<Self>) {
        let _ = self.service.cancel().await;
    }
}

struct Endpoint {
    url: String,
    session: Box<dyn EndpointSession>,
}

/// Union catalog over all connected endpoints, with per-tool routing.
pub struct ToolRegistry {
    endpoints: Vec<Endpoint>,
    catalog: Vec<ToolDescriptor>,
    routes: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Establish one persistent channel per endpoint and fetch each catalog.
    /// Any unreachable endpoint fails the whole operation.
    pub async fn connect(endpoints: &[String]) -> Result<Self> {
        let mut connected = Vec::with_capacity(endpoints.len());
        for url in endpoints {
            let transport = SseClientTransport::start(url.clone()).await.map_err(|e| {
                BridgeError::Transport(format!("could not connect to MCP endpoint {url}: {e}"))
            })?;
            let service = ().serve(transport).await.map_err(|e| {
                BridgeError::Transport(format!("MCP initialize failed for {url}: {e}"))
            })?;
            info!(%url, "connected to MCP endpoint");
            connected.push(Endpoint {
                url: url.clone(),
                session: Box::new(RmcpSession { service }),
            });
        }
        Self::assemble(connected).await
    }

    /// Build the union catalog. A tool name advertised by two endpoints is a
    /// startup error rather than an ambiguous route.
    async fn assemble(endpoints: Vec<Endpoint>) -> Result<Self> {
        let mut catalog = Vec::new();
        let mut routes: HashMap<String, usize> = HashMap::new();

        for (idx, endpoint) in endpoints.iter().enumerate() {
            for tool in endpoint.session.list_tools().await? {
                if let Some(&existing) = routes.get(&tool.name) {
                    return Err(BridgeError::Configuration(format!(
                        "tool '{}' is advertised by both {} and {}",
                        tool.name, endpoints[existing].url, endpoint.url
                    )));
                }
                routes.insert(tool.name.clone(), idx);
                catalog.push(tool);
            }
        }

        Ok(Self {
            endpoints,
            catalog,
            routes,
        })
    }

    /// The union of tool descriptors across all connected endpoints.
    pub fn catalog(&self) -> &[ToolDescriptor] {
        &self.catalog
    }

    /// Invoke a tool by name. Unknown names and transport faults become
    /// `Failure` strings. The one exception is a connection refusal: nobody
    /// is listening anymore, so it propagates as an error for the session
    /// loop to terminate on instead of being fed back to the model.
    pub async fn invoke(&self, name: &str, arguments: serde_json::Value) -> Result<ToolOutcome> {
        let Some(&idx) = self.routes.get(name) else {
            return Ok(ToolOutcome::Failure(format!(
                "Error: tool '{name}' is not advertised by any connected endpoint"
            )));
        };

        let arguments = match coerce_arguments(arguments) {
            Ok(args) => args,
            Err(e) => return Ok(ToolOutcome::Failure(format!("Error: {e}"))),
        };

        match self.endpoints[idx].session.call_tool(name, arguments).await {
            Ok(outcome) => Ok(outcome),
            Err(e) if e.is_connection_refused() => Err(e),
            Err(e) => Ok(ToolOutcome::Failure(format!("Error: {e}"))),
        }
    }

    /// Release every endpoint channel. Called when the session block exits.
    pub async fn close(self) {
        for endpoint in self.endpoints {
            endpoint.session.close().await;
        }
    }
}

fn map_tool_descriptor(tool: rmcp::model::Tool) -> ToolDescriptor {
    ToolDescriptor {
        name: tool.name.to_string(),
        description: tool.description.map(|d| d.to_string()),
        input_schema: serde_json::Value::Object((*tool.input_schema).clone()),
    }
}

fn coerce_arguments(value: serde_json::Value) -> Result<Option<JsonObject>> {
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Object(map) => Ok(Some(map)),
        serde_json::Value::String(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            let parsed: serde_json::Value = serde_json::from_str(trimmed).map_err(|e| {
                BridgeError::InvalidArgument(format!("tool arguments must be valid JSON: {e}"))
            })?;
            coerce_arguments(parsed)
        }
        other => Err(BridgeError::InvalidArgument(format!(
            "tool arguments must be a JSON object; got {other}"
        ))),
    }
}

fn extract_text_content(content: &[Content]) -> Option<String> {
    let mut lines = Vec::new();
    for item in content {
        if let Some(text) = item.as_text() {
            lines.push(text.text.clone());
            continue;
        }
        if let Some(resource) = item.as_resource() {
            if let ResourceContents::TextResourceContents { text, .. } = &resource.resource {
                lines.push(text.clone());
            }
        }
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn map_call_result(result: CallToolResult) -> ToolOutcome {
    let text = extract_text_content(&result.content)
        .or_else(|| result.structured_content.as_ref().map(|v| v.to_string()))
        .unwrap_or_default();

    if result.is_error.unwrap_or(false) {
        if text.is_empty() {
            return ToolOutcome::Failure("tool returned an error result".into());
        }
        return ToolOutcome::Failure(text);
    }
    ToolOutcome::Success(text)
}

fn map_service_error(context: &str, error: ServiceError) -> BridgeError {
    match error {
        ServiceError::McpError(error) => BridgeError::Transport(format!(
            "{context}: MCP error {}: {}",
            error.code.0, error.message
        )),
        ServiceError::TransportSend(error) => {
            BridgeError::Transport(format!("{context}: transport send failed: {error}"))
        }
        ServiceError::TransportClosed => {
            BridgeError::Transport(format!("{context}: transport closed"))
        }
        ServiceError::UnexpectedResponse => {
            BridgeError::Transport(format!("{context}: unexpected MCP response"))
        }
        ServiceError::Timeout { timeout } => BridgeError::Transport(format!(
            "{context}: MCP request timed out after {}ms",
            timeout.as_millis()
        )),
        other => BridgeError::Transport(format!("{context}: MCP service error: {other}")),
    }
}
