//! The `convert_document` tool.
//!
//! The one operation this server offers. Every failure mode is converted to a
//! human-readable string before crossing the MCP boundary; the operation
//! never raises to the caller.

use std::path::Path;
use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use serde::Deserialize;
use tracing::{error, info};

use super::engine::{ConversionEngine, ConversionJob, EngineError};

/// Input schema for `convert_document`.
#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct ConvertArgs {
    /// Absolute or relative path to the input document file.
    pub input_file_path: String,
    /// Path where the converted output should be saved. Missing parent
    /// directories are created.
    pub output_file_path: String,
    /// Target format, e.g. 'markdown', 'docx', 'pdf', 'html', 'rst', 'epub'.
    pub to_format: String,
    /// Format of the input file. Pandoc guesses from the extension when
    /// omitted; specify it if the extension is ambiguous.
    pub from_format: Option<String>,
    /// Additional command-line arguments passed verbatim to pandoc,
    /// e.g. ['--toc'] or ['-V', 'geometry:margin=1.5cm'].
    pub extra_args: Option<Vec<String>>,
}

/// Run one conversion and report the outcome as a string.
///
/// Single shot: no retry, and no cleanup of partial output on failure.
pub async fn convert_document(engine: &dyn ConversionEngine, args: ConvertArgs) -> String {
    info!(
        input = %args.input_file_path,
        output = %args.output_file_path,
        to = %args.to_format,
        from = ?args.from_format,
        extra = ?args.extra_args,
        "convert_document called"
    );

    let input = Path::new(&args.input_file_path);
    let output = Path::new(&args.output_file_path);

    // Preconditions first: a rejected request must not touch the filesystem.
    if !input.is_file() {
        error!(path = %args.input_file_path, "input file not found");
        return format!("Error: Input file not found at '{}'", args.input_file_path);
    }
    if args.to_format.is_empty() {
        error!("required argument 'to_format' is missing");
        return "Error: Missing required argument 'to_format'.".to_string();
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), %e, "could not create output directory");
            return format!(
                "Error: Could not create output directory '{}': {e}",
                parent.display()
            );
        }
    }

    let job = ConversionJob {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        to_format: args.to_format.clone(),
        from_format: args.from_format.clone(),
        extra_args: args.extra_args.clone().unwrap_or_default(),
    };

    match engine.convert(&job).await {
        Ok(()) => {
            let resolved = output.canonicalize().unwrap_or_else(|_| output.to_path_buf());
            info!(output = %resolved.display(), "conversion successful");
            format!("Successfully converted document to '{}'", resolved.display())
        }
        Err(e) => {
            error!(%e, "conversion failed");
            format!("Error during conversion: {}", reframe_engine_error(&e))
        }
    }
}

/// When the engine process died, surface its embedded diagnostic; otherwise
/// pass the fault text through unchanged.
fn reframe_engine_error(error: &EngineError) -> String {
    match error {
        EngineError::Died { code, stderr } => {
            let code = code.map_or_else(|| "unknown".to_string(), |c| c.to_string());
            format!("Pandoc execution failed: exit code {code}: {stderr}")
        }
        other => other.to_string(),
    }
}

/// MCP handler exposing exactly one tool.
#[derive(Clone)]
pub struct DocumentConverter {
    engine: Arc<dyn ConversionEngine>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl DocumentConverter {
    pub fn new(engine: Arc<dyn ConversionEngine>) -> Self {
        Self {
            engine,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Converts a document from one format to another using Pandoc.")]
    async fn convert_document(&self, Parameters(args): Parameters<ConvertArgs>) -> String {
        convert_document(self.engine.as_ref(), args).await
    }
}

#[tool_handler]
impl ServerHandler for DocumentConverter {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Document Converter: convert files between formats with pandoc.".into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tempfile::TempDir;

    enum StubBehavior {
        /// Write placeholder output, as the real engine would.
        Succeed,
        Die { code: Option<i32>, stderr: String },
        FailToLaunch,
    }

    struct StubEngine {
        behavior: StubBehavior,
        calls: std::sync::Mutex<usize>,
    }

    impl StubEngine {
        fn new(behavior: StubBehavior) -> Self {
            Self {
                behavior,
                calls: std::sync::Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl ConversionEngine for StubEngine {
        async fn convert(&self, job: &ConversionJob) -> Result<(), EngineError> {
            *self.calls.lock().unwrap() += 1;
            match &self.behavior {
                StubBehavior::Succeed => {
                    tokio::fs::write(&job.output, b"converted").await?;
                    Ok(())
                }
                StubBehavior::Die { code, stderr } => Err(EngineError::Died {
                    code: *code,
                    stderr: stderr.clone(),
                }),
                StubBehavior::FailToLaunch => Err(EngineError::Spawn(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "No such file or directory",
                ))),
            }
        }
    }

    fn args(input: &Path, output: &Path, to_format: &str) -> ConvertArgs {
        ConvertArgs {
            input_file_path: input.to_string_lossy().into_owned(),
            output_file_path: output.to_string_lossy().into_owned(),
            to_format: to_format.to_string(),
            from_format: None,
            extra_args: None,
        }
    }

    #[tokio::test]
    async fn success_reports_the_resolved_output_path() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.md");
        tokio::fs::write(&input, b"# hi").await.unwrap();
        let output = dir.path().join("out.html");

        let engine = StubEngine::new(StubBehavior::Succeed);
        let message = convert_document(&engine, args(&input, &output, "html")).await;

        assert!(message.starts_with("Successfully converted document to '"));
        assert!(output.is_file());
        let resolved = output.canonicalize().unwrap();
        assert!(message.contains(&resolved.to_string_lossy().into_owned()));
    }

    #[tokio::test]
    async fn missing_input_fails_without_filesystem_mutation() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("foo.txt");
        let output = dir.path().join("nested").join("deeper").join("foo.pdf");

        let engine = StubEngine::new(StubBehavior::Succeed);
        let message = convert_document(&engine, args(&input, &output, "pdf")).await;

        assert_eq!(
            message,
            format!("Error: Input file not found at '{}'", input.display())
        );
        assert_eq!(engine.calls(), 0);
        assert!(!output.exists());
        assert!(!dir.path().join("nested").exists());
    }

    #[tokio::test]
    async fn empty_to_format_is_rejected() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.md");
        tokio::fs::write(&input, b"# hi").await.unwrap();
        let output = dir.path().join("out.pdf");

        let engine = StubEngine::new(StubBehavior::Succeed);
        let message = convert_document(&engine, args(&input, &output, "")).await;

        assert_eq!(message, "Error: Missing required argument 'to_format'.");
        assert_eq!(engine.calls(), 0);
    }

    #[tokio::test]
    async fn intermediate_output_directories_are_created() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.md");
        tokio::fs::write(&input, b"# hi").await.unwrap();
        let output = dir.path().join("a").join("b").join("c").join("out.html");

        let engine = StubEngine::new(StubBehavior::Succeed);
        let message = convert_document(&engine, args(&input, &output, "html")).await;

        assert!(message.starts_with("Successfully converted"));
        assert!(output.parent().unwrap().is_dir());
        assert!(output.is_file());
    }

    #[tokio::test]
    async fn engine_death_surfaces_the_embedded_diagnostic() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.md");
        tokio::fs::write(&input, b"# hi").await.unwrap();
        let output = dir.path().join("out.pdf");

        let engine = StubEngine::new(StubBehavior::Die {
            code: Some(43),
            stderr: "Unknown output format zzz".into(),
        });
        let message = convert_document(&engine, args(&input, &output, "zzz")).await;

        assert!(message.starts_with("Error during conversion: Pandoc execution failed:"));
        assert!(message.contains("exit code 43"));
        assert!(message.contains("Unknown output format zzz"));
    }

    #[tokio::test]
    async fn other_engine_faults_pass_through_unchanged() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.md");
        tokio::fs::write(&input, b"# hi").await.unwrap();
        let output = dir.path().join("out.pdf");

        let engine = StubEngine::new(StubBehavior::FailToLaunch);
        let message = convert_document(&engine, args(&input, &output, "pdf")).await;

        assert!(message.starts_with("Error during conversion: failed to launch"));
        assert!(!message.contains("Pandoc execution failed"));
    }

    #[tokio::test]
    async fn identical_calls_are_idempotent() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.md");
        tokio::fs::write(&input, b"# hi").await.unwrap();
        let output = dir.path().join("out.html");

        let engine = StubEngine::new(StubBehavior::Succeed);
        let first = convert_document(&engine, args(&input, &output, "html")).await;
        let bytes_after_first = tokio::fs::read(&output).await.unwrap();
        let second = convert_document(&engine, args(&input, &output, "html")).await;
        let bytes_after_second = tokio::fs::read(&output).await.unwrap();

        assert!(first.starts_with("Successfully converted"));
        assert_eq!(first, second);
        assert_eq!(bytes_after_first, bytes_after_second);
    }
}
