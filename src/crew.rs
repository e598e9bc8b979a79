//! Task pipeline and the topic-selection crew
//!
//! A [`Pipeline`] is an ordered list of tasks, each bound to an agent. It is
//! consumed by [`Pipeline::kickoff`], so every run builds a fresh one.
//! [`TopicCrew`] wires the configured strategist and its research tools into
//! such a pipeline.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{CrewConfig, LlmConfig, TaskConfig};
use crate::error::{ConfigError, CrewError, Result};
use crate::llm::{Agent, ChatModel, ToolInvocation};
use crate::prompts::{self, Inputs};
use crate::tools::{ToolExecutor, ToolRegistry};

/// How a pipeline orders its tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Process {
    /// One task at a time, in declared order
    #[default]
    Sequential,
    /// Manager-delegated execution. Declared but not implemented.
    Hierarchical,
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Hierarchical => write!(f, "hierarchical"),
        }
    }
}

/// A task bound to the agent that runs it
pub struct Task {
    id: String,
    config: TaskConfig,
    agent: Arc<Agent>,
}

impl Task {
    pub fn new(id: impl Into<String>, config: TaskConfig, agent: Arc<Agent>) -> Self {
        Self {
            id: id.into(),
            config,
            agent,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }
}

/// Output of one completed task
#[derive(Debug, Clone, PartialEq)]
pub struct TaskOutput {
    pub task_id: String,
    pub agent_id: String,
    pub description: String,
    pub raw: String,
    pub tool_invocations: Vec<ToolInvocation>,
}

/// Result of a full pipeline run
#[derive(Debug, Clone)]
pub struct CrewOutput {
    pub run_id: Uuid,
    /// Every task's output, in execution order
    pub tasks: Vec<TaskOutput>,
    /// Raw output of the final task
    pub raw: String,
    pub duration_ms: u64,
}

/// Ordered tasks plus the process that runs them
pub struct Pipeline {
    name: String,
    tasks: Vec<Task>,
    process: Process,
    verbose: bool,
}

impl Pipeline {
    pub fn new(name: impl Into<String>, tasks: Vec<Task>, process: Process) -> Self {
        Self {
            name: name.into(),
            tasks,
            process,
            verbose: false,
        }
    }

    pub fn sequential(name: impl Into<String>, tasks: Vec<Task>) -> Self {
        Self::new(name, tasks, Process::Sequential)
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn process(&self) -> Process {
        self.process
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Run every task and return the final output.
    ///
    /// The first failing task aborts the run; later tasks never start.
    pub async fn kickoff(self) -> Result<CrewOutput> {
        if self.process != Process::Sequential {
            return Err(CrewError::UnsupportedProcess(self.process));
        }
        if self.tasks.is_empty() {
            return Err(ConfigError::Invalid(format!("pipeline `{}` has no tasks", self.name)).into());
        }

        let run_id = Uuid::new_v4();
        let started = Instant::now();
        info!(
            pipeline = %self.name,
            %run_id,
            process = %self.process,
            tasks = self.tasks.len(),
            "Starting pipeline"
        );

        let mut outputs: Vec<TaskOutput> = Vec::with_capacity(self.tasks.len());

        for (i, task) in self.tasks.iter().enumerate() {
            let context: Vec<String> = outputs.iter().map(|o| o.raw.clone()).collect();
            let prompt = prompts::task_prompt(&task.config, &context);

            if self.verbose {
                info!(step = i + 1, task = %task.id, agent = %task.agent.id(), "Executing task");
            } else {
                debug!(step = i + 1, task = %task.id, agent = %task.agent.id(), "Executing task");
            }

            let output = match task.agent.execute(&task.id, &prompt).await {
                Ok(output) => output,
                Err(e) => {
                    warn!(
                        pipeline = %self.name,
                        task = %task.id,
                        remaining = self.tasks.len() - i - 1,
                        error = %e,
                        "Task failed, aborting pipeline"
                    );
                    return Err(e);
                }
            };

            if let Some(path) = &task.config.output_file {
                write_output(&task.id, path, &output.raw).await?;
            }

            outputs.push(TaskOutput {
                task_id: task.id.clone(),
                agent_id: task.agent.id().to_string(),
                description: task.config.description.clone(),
                raw: output.raw,
                tool_invocations: output.tool_invocations,
            });
        }

        let raw = outputs.last().map(|o| o.raw.clone()).unwrap_or_default();
        let duration_ms = started.elapsed().as_millis() as u64;
        info!(pipeline = %self.name, %run_id, duration_ms, "Pipeline finished");

        Ok(CrewOutput {
            run_id,
            tasks: outputs,
            raw,
            duration_ms,
        })
    }
}

async fn write_output(task_id: &str, path: &Path, content: &str) -> Result<()> {
    let to_err = |source| CrewError::Output {
        task: task_id.to_string(),
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(to_err)?;
    }
    tokio::fs::write(path, content).await.map_err(to_err)?;
    debug!(task = %task_id, path = %path.display(), "Wrote task output");
    Ok(())
}

/// Agent id of the topic strategist
pub const CHIEF_TOPIC_STRATEGIST: &str = "chief_topic_strategist";

/// Id of the topic selection task
pub const TOPIC_SELECTION_TASK: &str = "topic_selection_task";

/// The tech-article topic crew: one strategist with research tools, one task
pub struct TopicCrew {
    config: CrewConfig,
    inputs: Inputs,
    agents: BTreeMap<String, Arc<Agent>>,
}

impl TopicCrew {
    pub const NAME: &'static str = "tech_article_generator";

    /// Agent ids this crew binds, in declaration order
    pub const AGENTS: &'static [&'static str] = &[CHIEF_TOPIC_STRATEGIST];

    /// Task ids this crew runs, in execution order
    pub const TASKS: &'static [&'static str] = &[TOPIC_SELECTION_TASK];

    /// Bind every declared agent to the LLM client and its tools
    pub fn new(
        config: CrewConfig,
        llm_config: &LlmConfig,
        llm: Arc<dyn ChatModel>,
        inputs: Inputs,
    ) -> Result<Self> {
        config.require(Self::AGENTS, Self::TASKS)?;

        let mut agents = BTreeMap::new();
        for &id in Self::AGENTS {
            let agent_config = inputs.apply_agent(config.agent(id)?)?;
            let executor = ToolExecutor::new(Arc::new(Self::tools_for(id)), config.tools.clone());
            let agent = Agent::new(id, agent_config, llm.clone(), llm_config, executor);
            debug!(agent = %id, tools = ?agent.tools().names(), "Bound agent");
            agents.insert(id.to_string(), Arc::new(agent));
        }

        Ok(Self {
            config,
            inputs,
            agents,
        })
    }

    /// Tool registry for an agent id
    pub fn tools_for(agent_id: &str) -> ToolRegistry {
        match agent_id {
            CHIEF_TOPIC_STRATEGIST => ToolRegistry::topic_research(),
            _ => ToolRegistry::empty(),
        }
    }

    pub fn agent(&self, id: &str) -> Option<&Arc<Agent>> {
        self.agents.get(id)
    }

    /// Build a fresh pipeline for one run
    pub fn pipeline(&self) -> Result<Pipeline> {
        let tasks = Self::TASKS
            .iter()
            .map(|&id| {
                let task_config = self.inputs.apply_task(self.config.task(id)?)?;
                let agent = self.agents.get(&task_config.agent).cloned().ok_or_else(|| {
                    ConfigError::Invalid(format!(
                        "task `{}` is assigned to `{}`, which this crew does not bind",
                        id, task_config.agent
                    ))
                })?;
                Ok(Task::new(id, task_config, agent))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Pipeline::new(Self::NAME, tasks, self.config.crew.process)
            .with_verbose(self.config.crew.verbose))
    }

    /// Run the crew once
    pub async fn kickoff(&self) -> Result<CrewOutput> {
        self.pipeline()?.kickoff().await
    }
}
