//! Command-line interface.

pub mod chat;

use clap::{Parser, Subcommand};

/// docbridge CLI.
#[derive(Parser, Debug)]
#[command(name = "docbridge", version, about = "Document conversion agent and MCP tool server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive chat session driving the conversion agent
    Chat(ChatArgs),
    /// Run the document-conversion MCP server
    Serve(ServeArgs),
}

/// Arguments for the `chat` subcommand.
#[derive(Parser, Debug)]
pub struct ChatArgs {
    /// Gemini model to use
    #[arg(short, long, default_value = "gemini-2.0-flash-001")]
    pub model: String,

    /// System prompt prepended to the session
    #[arg(short, long)]
    pub system: Option<String>,

    /// Sampling temperature
    #[arg(short, long, default_value_t = 0.5)]
    pub temperature: f64,

    /// Max output tokens
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// MCP endpoint URL (repeatable; defaults to http://127.0.0.1:8000/sse)
    #[arg(short, long)]
    pub endpoint: Vec<String>,
}

/// Arguments for the `serve` subcommand.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Listening port (overrides the PORT environment variable)
    #[arg(short, long)]
    pub port: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_chat_with_defaults() {
        let cli = Cli::try_parse_from(["docbridge", "chat"]).unwrap();
        match cli.command {
            Commands::Chat(args) => {
                assert_eq!(args.model, "gemini-2.0-flash-001");
                assert!(args.system.is_none());
                assert!((args.temperature - 0.5).abs() < f64::EPSILON);
                assert!(args.max_tokens.is_none());
                assert!(args.endpoint.is_empty());
            }
            other => panic!("expected Chat, got {other:?}"),
        }
    }

    #[test]
    fn parse_chat_with_repeated_endpoints() {
        let cli = Cli::try_parse_from([
            "docbridge",
            "chat",
            "-e",
            "http://127.0.0.1:8000/sse",
            "-e",
            "http://127.0.0.1:9000/sse",
            "--max-tokens",
            "512",
        ])
        .unwrap();
        match cli.command {
            Commands::Chat(args) => {
                assert_eq!(args.endpoint.len(), 2);
                assert_eq!(args.max_tokens, Some(512));
            }
            other => panic!("expected Chat, got {other:?}"),
        }
    }

    #[test]
    fn parse_serve_with_port() {
        let cli = Cli::try_parse_from(["docbridge", "serve", "--port", "9000"]).unwrap();
        match cli.command {
            Commands::Serve(args) => assert_eq!(args.port, Some(9000)),
            other => panic!("expected Serve, got {other:?}"),
        }
    }

    #[test]
    fn parse_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["docbridge"]).is_err());
    }
}
