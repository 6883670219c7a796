//! Interactive chat session.
//!
//! Single cooperative loop: the blocking points are the line read, the model
//! round trips, and the tool invocations. Per-turn errors are printed and the
//! prompt reappears; a transport refusal ends the session with guidance.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use crate::agent::Agent;
use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::provider::google::GoogleProvider;
use crate::registry::ToolRegistry;
use crate::types::GenerationSettings;

use super::ChatArgs;

pub async fn run(config: &BridgeConfig, args: ChatArgs) -> Result<()> {
    let api_key = config.require_google_api_key()?.to_string();

    let mut provider = GoogleProvider::new(args.model.clone(), api_key);
    if let Some(base_url) = config.google_base_url() {
        provider = provider.with_base_url(base_url);
    }

    let endpoints = if args.endpoint.is_empty() {
        config.endpoints().to_vec()
    } else {
        args.endpoint.clone()
    };

    info!(?endpoints, "connecting to MCP endpoints");
    let registry = ToolRegistry::connect(&endpoints)
        .await
        .map_err(|e| with_startup_guidance(e, &endpoints))?;

    if registry.catalog().is_empty() {
        registry.close().await;
        return Err(BridgeError::Configuration(format!(
            "no tools discovered from the MCP server(s) at {}. Ensure `docbridge serve` is running.",
            endpoints.join(", ")
        )));
    }
    let tool_names: Vec<&str> = registry.catalog().iter().map(|t| t.name.as_str()).collect();
    info!(tools = ?tool_names, "available tools");

    let settings = GenerationSettings {
        temperature: Some(args.temperature),
        max_tokens: args.max_tokens,
    };
    let registry = Arc::new(registry);
    let mut agent =
        Agent::new(Arc::new(provider), registry.clone()).with_settings(settings);
    if let Some(system) = args.system {
        agent = agent.with_system_prompt(system);
    }

    println!();
    println!("--- Document Conversion Agent ---");
    println!("Enter a request (e.g. 'convert notes.md to notes.pdf').");
    println!("Type 'quit' or 'exit' to stop.");
    println!("{}", "-".repeat(30));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        // EOF ends the session like an explicit quit.
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("quit") || query.eq_ignore_ascii_case("exit") {
            info!("user requested exit");
            break;
        }

        println!("Agent: Thinking...");
        match agent.run_turn(query).await {
            Ok(answer) => {
                println!("Agent: {answer}");
                println!("{}", "-".repeat(30));
            }
            Err(e) if e.is_connection_refused() => {
                error!(%e, "transport refused mid-session");
                println!();
                println!("Error: could not reach the MCP server at {}.", endpoints.join(", "));
                println!("Ensure `docbridge serve` is running and accessible.");
                break;
            }
            Err(e) => {
                error!(%e, "agent turn failed");
                println!();
                println!("An unexpected error occurred: {e}");
            }
        }
    }

    // Release the endpoint channels before returning.
    drop(agent);
    if let Ok(registry) = Arc::try_unwrap(registry) {
        registry.close().await;
    }
    info!("chat session finished");
    Ok(())
}

/// A refused connection at startup almost always means the server was never
/// started; tell the user what to run instead of printing a bare socket error.
fn with_startup_guidance(err: BridgeError, endpoints: &[String]) -> BridgeError {
    if err.is_connection_refused() {
        BridgeError::Configuration(format!(
            "could not connect to the MCP server at {}: {err}. \
             Ensure `docbridge serve` is running and accessible.",
            endpoints.join(", ")
        ))
    } else {
        err
    }
}
