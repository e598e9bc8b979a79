//! Prompt construction and `{placeholder}` interpolation.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::Datelike;
use fancy_regex::Regex;

use crate::config::{AgentConfig, TaskConfig};
use crate::error::ConfigError;

/// Appended to every system prompt
const TOOL_GUIDELINES: &str = r#"## Guidelines
- Use the available tools to gather evidence before answering
- Cite the URL of every source you rely on
- When you have enough information, reply with your final answer only"#;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex"))
}

/// Values substituted into agent and task text at kickoff
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inputs {
    values: BTreeMap<String, String>,
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inputs every run gets: `current_year`
    pub fn with_defaults() -> Self {
        let mut inputs = Self::new();
        inputs.insert("current_year", chrono::Local::now().year().to_string());
        inputs
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Parse a `key=value` pair as given on the command line
    pub fn parse_pair(raw: &str) -> Result<(String, String), ConfigError> {
        match raw.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.to_string()))
            }
            _ => Err(ConfigError::Invalid(format!(
                "input `{}` must have the form key=value",
                raw
            ))),
        }
    }

    /// Replace each `{name}` in `text`. Unknown names are an error.
    pub fn interpolate(&self, text: &str) -> Result<String, ConfigError> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for caps in placeholder_re().captures_iter(text) {
            let caps = caps.map_err(|e| ConfigError::Invalid(format!("bad template: {}", e)))?;
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let value = self
                .get(name.as_str())
                .ok_or_else(|| ConfigError::MissingInput(name.as_str().to_string()))?;
            out.push_str(&text[last..whole.start()]);
            out.push_str(value);
            last = whole.end();
        }

        out.push_str(&text[last..]);
        Ok(out)
    }

    pub fn apply_agent(&self, agent: &AgentConfig) -> Result<AgentConfig, ConfigError> {
        Ok(AgentConfig {
            role: self.interpolate(&agent.role)?,
            goal: self.interpolate(&agent.goal)?,
            backstory: self.interpolate(&agent.backstory)?,
            ..agent.clone()
        })
    }

    pub fn apply_task(&self, task: &TaskConfig) -> Result<TaskConfig, ConfigError> {
        Ok(TaskConfig {
            description: self.interpolate(&task.description)?,
            expected_output: self.interpolate(&task.expected_output)?,
            ..task.clone()
        })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Inputs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut inputs = Self::new();
        for (k, v) in iter {
            inputs.insert(k, v);
        }
        inputs
    }
}

/// System prompt for an agent: who it is, what it wants, how to use tools
pub fn system_prompt(agent: &AgentConfig) -> String {
    format!(
        "You are {}. {}\n\nYour personal goal is: {}\n\n{}",
        agent.role.trim(),
        agent.backstory.trim(),
        agent.goal.trim(),
        TOOL_GUIDELINES
    )
}

/// User prompt for one task, with earlier task outputs as context
pub fn task_prompt(task: &TaskConfig, context: &[String]) -> String {
    let mut prompt = format!(
        "{}\n\nThis is the expected criteria for your final answer: {}",
        task.description.trim(),
        task.expected_output.trim()
    );

    if !context.is_empty() {
        prompt.push_str("\n\nThis is the context you're working with:\n");
        prompt.push_str(&context.join("\n\n---\n\n"));
    }

    prompt
}
