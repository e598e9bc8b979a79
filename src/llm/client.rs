//! Chat-completion clients
//!
//! [`ChatModel`] is the seam between the agent loop and whatever produces
//! completions. [`GenaiClient`] is the production implementation; provider
//! credentials are resolved by `genai` from the usual environment variables.

use async_trait::async_trait;
use genai::chat::{
    ChatMessage, ChatOptions, ChatRequest, Tool as GenaiTool, ToolCall as GenaiToolCall,
    ToolResponse,
};
use genai::Client;
use tracing::{debug, error};

use super::types::{Completion, CompletionRequest, Message};
use crate::config::LlmConfig;
use crate::error::LlmError;
use crate::tools::{ToolCall, ToolSpec};

/// Anything that can answer a chat-completion request
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier, for logs and errors
    fn model(&self) -> &str;

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError>;
}

impl From<GenaiToolCall> for ToolCall {
    fn from(tc: GenaiToolCall) -> Self {
        Self {
            call_id: tc.call_id,
            name: tc.fn_name,
            params: tc.fn_arguments,
        }
    }
}

impl From<&ToolCall> for GenaiToolCall {
    fn from(tc: &ToolCall) -> Self {
        GenaiToolCall {
            call_id: tc.call_id.clone(),
            fn_name: tc.name.clone(),
            fn_arguments: tc.params.clone(),
        }
    }
}

impl From<&ToolSpec> for GenaiTool {
    fn from(spec: &ToolSpec) -> Self {
        GenaiTool::new(spec.name.clone())
            .with_description(spec.description.clone())
            .with_schema(spec.input_schema.to_json_schema())
    }
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        match message {
            Message::System { content } => ChatMessage::system(content.clone()),
            Message::User { content } => ChatMessage::user(content.clone()),
            Message::Assistant {
                content,
                tool_calls,
            } => {
                if tool_calls.is_empty() {
                    ChatMessage::assistant(content.clone().unwrap_or_default())
                } else {
                    let calls: Vec<GenaiToolCall> = tool_calls.iter().map(GenaiToolCall::from).collect();
                    ChatMessage::from(calls)
                }
            }
            Message::Tool { call_id, content } => {
                ChatMessage::from(ToolResponse::new(call_id.clone(), content.clone()))
            }
        }
    }
}

/// `genai`-backed chat model
pub struct GenaiClient {
    client: Client,
    model: String,
}

impl GenaiClient {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            client: Client::default(),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl ChatModel for GenaiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        let messages: Vec<ChatMessage> = request.messages.iter().map(ChatMessage::from).collect();
        let mut chat_request = ChatRequest::new(messages);
        if !request.tools.is_empty() {
            let tools: Vec<GenaiTool> = request.tools.iter().map(GenaiTool::from).collect();
            chat_request = chat_request.with_tools(tools);
        }

        let options = ChatOptions::default().with_temperature(request.temperature);

        debug!(
            model = %self.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending chat request"
        );

        let response = self
            .client
            .exec_chat(&self.model, chat_request, Some(&options))
            .await
            .map_err(|e| {
                let err = format!("{:#}", e);
                error!("Chat request failed: {}", err);
                LlmError(err)
            })?;

        let text = response.first_text().map(str::to_string);
        into_completion(text, response.into_tool_calls())
    }
}

/// Tool calls take precedence over any accompanying text
fn into_completion(
    text: Option<String>,
    tool_calls: Vec<GenaiToolCall>,
) -> Result<Completion, LlmError> {
    if !tool_calls.is_empty() {
        return Ok(Completion::ToolCalls(
            tool_calls.into_iter().map(ToolCall::from).collect(),
        ));
    }

    text.map(Completion::Text)
        .ok_or_else(|| LlmError("model returned neither text nor tool calls".to_string()))
}
