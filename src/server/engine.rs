//! External conversion engine.
//!
//! Pandoc is treated as an opaque black box behind a subprocess boundary. The
//! trait seam exists so the conversion operation can be exercised without a
//! pandoc installation.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::info;

use crate::error::{BridgeError, Result};

/// Arguments for one conversion run, already validated by the caller.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub to_format: String,
    pub from_format: Option<String>,
    /// Passed verbatim to the engine after the standard arguments.
    pub extra_args: Vec<String>,
}

/// Fault raised by the engine. `Died` carries the engine's own diagnostic so
/// the tool can surface it.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to launch conversion engine: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("engine died with exit code {code:?}: {stderr}")]
    Died { code: Option<i32>, stderr: String },
}

/// Interface to a document conversion engine.
#[async_trait]
pub trait ConversionEngine: Send + Sync {
    async fn convert(&self, job: &ConversionJob) -> std::result::Result<(), EngineError>;
}

/// The real engine: shells out to the pandoc executable.
pub struct PandocEngine {
    program: PathBuf,
    version: String,
}

impl PandocEngine {
    /// Locate pandoc (via `PANDOC_PATH` or the system PATH) and probe its
    /// version. The server treats a missing engine as fatal at startup.
    pub async fn discover() -> Result<Self> {
        let program =
            PathBuf::from(std::env::var("PANDOC_PATH").unwrap_or_else(|_| "pandoc".into()));

        let output = Command::new(&program)
            .arg("--version")
            .output()
            .await
            .map_err(|e| {
                BridgeError::Configuration(format!(
                    "Pandoc executable not found ({e}). Install pandoc and ensure it is on your PATH, or set PANDOC_PATH."
                ))
            })?;

        if !output.status.success() {
            return Err(BridgeError::Configuration(format!(
                "pandoc --version exited with {}",
                output.status
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let version = stdout
            .lines()
            .next()
            .unwrap_or("pandoc (unknown version)")
            .to_string();
        info!(program = %program.display(), %version, "conversion engine ready");

        Ok(Self { program, version })
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

#[async_trait]
impl ConversionEngine for PandocEngine {
    async fn convert(&self, job: &ConversionJob) -> std::result::Result<(), EngineError> {
        let mut cmd = Command::new(&self.program);
        cmd.arg(&job.input);
        if let Some(from) = &job.from_format {
            cmd.arg("-f").arg(from);
        }
        cmd.arg("-t").arg(&job.to_format);
        cmd.arg("-o").arg(&job.output);
        cmd.args(&job.extra_args);

        let output = cmd.output().await?;
        if !output.status.success() {
            return Err(EngineError::Died {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}
