//! Error types for tools, configuration and pipeline runs.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::crew::Process;

/// Errors raised at the tool boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    /// Malformed input, unknown tool name, or a value outside the schema
    #[error("validation error: {0}")]
    Validation(String),

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("rate limited{}", .retry_after.map(|d| format!(" (retry after {}ms)", d.as_millis())).unwrap_or_default())]
    RateLimited { retry_after: Option<Duration> },

    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

impl ToolError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether the executor may retry the call that produced this error
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Validation(_))
    }
}

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("no value provided for input `{{{0}}}`")]
    MissingInput(String),
}

/// Opaque failure surfaced by a chat-completion client.
#[derive(Error, Debug, Clone)]
#[error("{0}")]
pub struct LlmError(pub String);

/// Errors that abort a pipeline run.
#[derive(Error, Debug)]
pub enum CrewError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("tool `{tool}` failed: {source}")]
    Tool {
        tool: String,
        #[source]
        source: ToolError,
    },

    #[error("LLM invocation failed ({model}): {message}")]
    LlmInvocation { model: String, message: String },

    #[error("task `{task}` exceeded {limit} tool-use iterations")]
    IterationLimit { task: String, limit: u32 },

    #[error("process `{0}` is not supported")]
    UnsupportedProcess(Process),

    #[error("failed to write output for task `{task}` to {}: {source}", .path.display())]
    Output {
        task: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CrewError>;
