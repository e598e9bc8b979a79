//! Tech Article Generator - a single-agent crew that picks the next tech article topic
//!
//! A strategist agent is given three research tools (paper search, trending
//! repositories, tech news) and asked to select one timely topic. Agents and
//! tasks are declared in TOML and assembled into a sequential pipeline.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use tech_article_generator::{CrewConfig, GenaiClient, Inputs, TopicCrew};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = CrewConfig::load(Path::new("config"))?;
//!     let llm_config = config.llm.resolve(std::env::var("MODEL").ok())?;
//!     let llm = Arc::new(GenaiClient::new(&llm_config));
//!
//!     let crew = TopicCrew::new(config, &llm_config, llm, Inputs::with_defaults())?;
//!     let output = crew.kickoff().await?;
//!     println!("{}", output.raw);
//!     Ok(())
//! }
//! ```

pub mod config;
mod crew;
mod error;
mod llm;
mod prompts;
pub mod tools;

pub use config::{resolve_config_dir, AgentConfig, CrewConfig, LlmConfig, TaskConfig};
pub use crew::{
    CrewOutput, Pipeline, Process, Task, TaskOutput, TopicCrew, CHIEF_TOPIC_STRATEGIST,
    TOPIC_SELECTION_TASK,
};
pub use error::{ConfigError, CrewError, LlmError, Result, ToolError};
pub use llm::{
    Agent, AgentOutput, ChatModel, Completion, CompletionRequest, GenaiClient, Message, Role,
    ToolInvocation,
};
pub use prompts::Inputs;
pub use tools::{Tool, ToolCall, ToolExecutor, ToolRegistry, ToolResult, ToolSpec};
