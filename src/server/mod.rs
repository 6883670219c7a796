//! Tool Provider Server.
//!
//! One operation over an SSE MCP transport. Two states only: Unstarted →
//! Listening; per-request work is a single synchronous call into the engine.

pub mod convert;
pub mod engine;

pub use convert::{convert_document, ConvertArgs, DocumentConverter};
pub use engine::{ConversionEngine, ConversionJob, EngineError, PandocEngine};

use std::net::SocketAddr;
use std::sync::Arc;

use rmcp::transport::sse_server::SseServer;
use tracing::info;

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};

/// Verify the engine, bind the SSE transport, and serve until interrupted.
pub async fn run(config: &BridgeConfig) -> Result<()> {
    // Missing pandoc is fatal before we accept any request.
    let engine = Arc::new(PandocEngine::discover().await?);

    let addr: SocketAddr = ([0, 0, 0, 0], config.port()).into();
    let server = SseServer::serve(addr).await.map_err(|e| {
        BridgeError::Transport(format!("failed to bind SSE server on {addr}: {e}"))
    })?;

    info!(engine = engine.version(), "Document Converter MCP server listening on http://{addr}/sse");

    let ct = server.with_service(move || DocumentConverter::new(engine.clone()));

    tokio::signal::ctrl_c().await?;
    info!("interrupt received, stopping server");
    ct.cancel();
    info!("MCP server stopped");
    Ok(())
}
