//! Agent binding and the per-task tool-use loop

use std::sync::Arc;

use tracing::{debug, info, Level};

use super::client::ChatModel;
use super::types::{Completion, CompletionRequest, Message};
use crate::config::{AgentConfig, LlmConfig};
use crate::error::{CrewError, Result};
use crate::prompts;
use crate::tools::{ToolCall, ToolExecutor, ToolRegistry};

/// Emit at info when the agent is verbose, debug otherwise
macro_rules! step {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::event!(Level::INFO, $($arg)+);
        } else {
            tracing::event!(Level::DEBUG, $($arg)+);
        }
    };
}

/// Record of one tool call made while executing a task
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub call: ToolCall,
    pub records: usize,
}

/// Final answer of an agent for one task
#[derive(Debug, Clone, PartialEq)]
pub struct AgentOutput {
    pub raw: String,
    pub tool_invocations: Vec<ToolInvocation>,
    /// Number of model round-trips it took
    pub iterations: u32,
}

/// A role bound to an LLM client and a tool set
///
/// Holds only construction-time values; executing a task does not change it.
pub struct Agent {
    id: String,
    config: AgentConfig,
    llm: Arc<dyn ChatModel>,
    temperature: f64,
    executor: ToolExecutor,
    system_prompt: String,
}

impl Agent {
    pub fn new(
        id: impl Into<String>,
        config: AgentConfig,
        llm: Arc<dyn ChatModel>,
        llm_config: &LlmConfig,
        executor: ToolExecutor,
    ) -> Self {
        let system_prompt = prompts::system_prompt(&config);
        Self {
            id: id.into(),
            config,
            llm,
            temperature: llm_config.temperature,
            executor,
            system_prompt,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> &str {
        &self.config.role
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn verbose(&self) -> bool {
        self.config.verbose
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn tools(&self) -> &ToolRegistry {
        self.executor.registry()
    }

    pub fn model(&self) -> &str {
        self.llm.model()
    }

    /// Run `task_prompt` to a final answer.
    ///
    /// Tool calls are executed in the order the model requested them. Any tool
    /// or LLM failure is returned immediately.
    pub async fn execute(&self, task_id: &str, task_prompt: &str) -> Result<AgentOutput> {
        let verbose = self.config.verbose;
        let mut messages = vec![
            Message::system(self.system_prompt.clone()),
            Message::user(task_prompt),
        ];
        let tools = self.executor.registry().specs();
        let mut tool_invocations = Vec::new();

        for iteration in 1..=self.config.max_iterations {
            let request = CompletionRequest {
                messages: messages.clone(),
                tools: tools.clone(),
                temperature: self.temperature,
            };

            step!(verbose, agent = %self.id, task = %task_id, iteration, "Requesting completion");

            let completion = self.llm.complete(&request).await.map_err(|e| {
                CrewError::LlmInvocation {
                    model: self.llm.model().to_string(),
                    message: e.to_string(),
                }
            })?;

            match completion {
                Completion::Text(raw) => {
                    info!(
                        agent = %self.id,
                        task = %task_id,
                        iterations = iteration,
                        tool_calls = tool_invocations.len(),
                        "Agent finished task"
                    );
                    return Ok(AgentOutput {
                        raw,
                        tool_invocations,
                        iterations: iteration,
                    });
                }
                Completion::ToolCalls(calls) => {
                    debug!(agent = %self.id, count = calls.len(), "Model requested tools");
                    messages.push(Message::tool_calls(calls.clone()));

                    for call in calls {
                        step!(
                            verbose,
                            agent = %self.id,
                            tool = %call.name,
                            params = %call.params,
                            "Using tool"
                        );
                        let result = self.executor.execute(&call).await.map_err(|source| {
                            CrewError::Tool {
                                tool: call.name.clone(),
                                source,
                            }
                        })?;
                        messages.push(Message::tool_result(call.call_id.clone(), result.to_content()));
                        tool_invocations.push(ToolInvocation {
                            records: result.len(),
                            call,
                        });
                    }
                }
            }
        }

        Err(CrewError::IterationLimit {
            task: task_id.to_string(),
            limit: self.config.max_iterations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LlmError, ToolError};
    use crate::llm::mock::{ResearchingModel, ScriptedModel};
    use crate::llm::types::Role;
    use crate::tools::{names, ToolPolicy};
    use serde_json::json;

    fn agent_config() -> AgentConfig {
        AgentConfig {
            role: "Chief Topic Strategist".into(),
            goal: "Pick the best topic".into(),
            backstory: "A veteran tech editor.".into(),
            verbose: false,
            max_iterations: 3,
        }
    }

    fn llm_config() -> LlmConfig {
        LlmConfig {
            model: "mock".into(),
            temperature: 0.7,
        }
    }

    fn agent(llm: Arc<dyn ChatModel>) -> Agent {
        let executor = ToolExecutor::new(Arc::new(ToolRegistry::topic_research()), ToolPolicy::default());
        Agent::new("chief_topic_strategist", agent_config(), llm, &llm_config(), executor)
    }

    fn call(id: &str, name: &str, params: serde_json::Value) -> ToolCall {
        ToolCall {
            call_id: id.into(),
            name: name.into(),
            params,
        }
    }

    #[test]
    fn test_binding_keeps_construction_values() {
        let agent = agent(Arc::new(ResearchingModel));
        assert_eq!(agent.id(), "chief_topic_strategist");
        assert_eq!(agent.role(), "Chief Topic Strategist");
        assert!(!agent.verbose());
        assert_eq!(agent.tools().len(), 3);
        assert!(agent.system_prompt().starts_with("You are Chief Topic Strategist."));
    }

    #[tokio::test]
    async fn test_direct_answer() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(Completion::Text("Rust in AI".into()))]));
        let output = agent(model.clone()).execute("t", "Pick a topic").await.unwrap();

        assert_eq!(output.raw, "Rust in AI");
        assert_eq!(output.iterations, 1);
        assert!(output.tool_invocations.is_empty());

        let requests = model.requests.lock().unwrap();
        assert_eq!(requests[0].messages[0].role(), Role::System);
        assert_eq!(requests[0].messages[1], Message::user("Pick a topic"));
        assert_eq!(requests[0].tools.len(), 3);
        assert_eq!(requests[0].temperature, 0.7);
    }

    #[tokio::test]
    async fn test_tool_results_fed_back() {
        let model = Arc::new(ScriptedModel::new(vec![
            Ok(Completion::ToolCalls(vec![
                call("a", names::SEARCH_ARXIV, json!({ "query": "agents" })),
                call("b", names::GET_TECH_NEWS, json!({})),
            ])),
            Ok(Completion::Text("done".into())),
        ]));
        let output = agent(model.clone()).execute("t", "Pick a topic").await.unwrap();

        assert_eq!(output.iterations, 2);
        let used: Vec<&str> = output.tool_invocations.iter().map(|i| i.call.name.as_str()).collect();
        assert_eq!(used, vec![names::SEARCH_ARXIV, names::GET_TECH_NEWS]);

        let requests = model.requests.lock().unwrap();
        let second = &requests[1].messages;
        assert_eq!(second.len(), 5);
        assert_eq!(second[2].role(), Role::Assistant);
        match &second[3] {
            Message::Tool { call_id, content } => {
                assert_eq!(call_id, "a");
                assert!(content.contains("https://arxiv.org/example"));
            }
            other => panic!("expected tool result, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_tool_error_propagates() {
        let model = Arc::new(ScriptedModel::new(vec![
            Ok(Completion::ToolCalls(vec![call(
                "a",
                names::GET_TECH_NEWS,
                json!({ "category": "bogus" }),
            )])),
            Ok(Completion::Text("unreachable".into())),
        ]));
        let err = agent(model.clone()).execute("t", "Pick").await.unwrap_err();

        match err {
            CrewError::Tool { tool, source } => {
                assert_eq!(tool, names::GET_TECH_NEWS);
                assert!(matches!(source, ToolError::Validation(_)));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(model.request_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_tool_propagates() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(Completion::ToolCalls(vec![call(
            "a",
            "rm_rf",
            json!({}),
        )]))]));
        let err = agent(model).execute("t", "Pick").await.unwrap_err();
        assert!(matches!(
            err,
            CrewError::Tool {
                source: ToolError::Validation(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_llm_error_propagates() {
        let model = Arc::new(ScriptedModel::new(vec![Err(LlmError("503 overloaded".into()))]));
        let err = agent(model).execute("t", "Pick").await.unwrap_err();
        match err {
            CrewError::LlmInvocation { model, message } => {
                assert_eq!(model, "mock/scripted");
                assert_eq!(message, "503 overloaded");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_iteration_limit() {
        let looping = || Ok(Completion::ToolCalls(vec![call("a", names::GET_GITHUB_TRENDS, json!({}))]));
        let model = Arc::new(ScriptedModel::new(vec![looping(), looping(), looping(), looping()]));
        let err = agent(model.clone()).execute("topic_selection_task", "Pick").await.unwrap_err();

        assert!(matches!(err, CrewError::IterationLimit { limit: 3, .. }));
        assert_eq!(model.request_count(), 3);
    }
}
