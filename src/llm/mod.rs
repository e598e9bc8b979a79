//! LLM client and agent loop

mod agent;
mod client;
#[cfg(test)]
pub(crate) mod mock;
mod types;

pub use agent::{Agent, AgentOutput, ToolInvocation};
pub use client::{ChatModel, GenaiClient};
pub use types::{Completion, CompletionRequest, Message, Role};
