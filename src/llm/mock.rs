//! Deterministic chat models for tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use super::client::ChatModel;
use super::types::{Completion, CompletionRequest, Message};
use crate::error::LlmError;
use crate::tools::ToolCall;

/// Calls every offered tool once, then answers with a digest of the results.
///
/// Output depends only on the request, so repeated runs are identical.
pub struct ResearchingModel;

#[async_trait]
impl ChatModel for ResearchingModel {
    fn model(&self) -> &str {
        "mock/researching"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        let results: Vec<&str> = request
            .messages
            .iter()
            .filter_map(|m| match m {
                Message::Tool { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .collect();

        if results.is_empty() && !request.tools.is_empty() {
            let calls = request
                .tools
                .iter()
                .enumerate()
                .map(|(i, spec)| ToolCall {
                    call_id: format!("call_{}", i),
                    name: spec.name.clone(),
                    params: match spec.name.as_str() {
                        "search_arxiv" => json!({ "query": "transformers" }),
                        _ => json!({}),
                    },
                })
                .collect();
            return Ok(Completion::ToolCalls(calls));
        }

        let task = request
            .messages
            .iter()
            .rev()
            .find_map(|m| match m {
                Message::User { content } => content.lines().next(),
                _ => None,
            })
            .unwrap_or_default();

        Ok(Completion::Text(format!(
            "Topic for: {}\nSources consulted: {}",
            task,
            results.len()
        )))
    }
}

/// Replays a fixed script of completions and records every request.
pub struct ScriptedModel {
    script: Mutex<VecDeque<Result<Completion, LlmError>>>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    pub fn new(script: Vec<Result<Completion, LlmError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn model(&self) -> &str {
        "mock/scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError("script exhausted".to_string())))
    }
}
