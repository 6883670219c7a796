//! docbridge — document conversion over the Model Context Protocol.
//!
//! One crate, two processes: `docbridge serve` runs an MCP tool server that
//! wraps the external `pandoc` executable behind a single `convert_document`
//! tool, and `docbridge chat` runs an interactive Gemini-driven agent that
//! discovers the server's tools over an SSE channel and invokes them as the
//! model requests.
//!
//! The interesting part is the tool-invocation bridge: the registry client
//! fetches each endpoint's catalog once per session, the reasoning loop feeds
//! the catalog to the model, and every tool result — success or fault —
//! crosses the wire as a plain human-readable string.

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod provider;
pub mod registry;
pub mod server;
pub mod types;
