//! Configuration loading and validation
//!
//! A crew is configured from a directory holding:
//! - `agents.toml` - one table per agent id (role, goal, backstory)
//! - `tasks.toml` - one table per task id (description, expected output, agent)
//! - `crew.toml` - optional LLM, process and tool-policy settings
//!
//! Unknown keys are rejected everywhere.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::crew::Process;
use crate::error::ConfigError;
use crate::tools::ToolPolicy;

/// Directory name used under the user config dir (~/.config)
pub const APP_DIR: &str = "tech-article-generator";

pub const AGENTS_FILE: &str = "agents.toml";
pub const TASKS_FILE: &str = "tasks.toml";
pub const CREW_FILE: &str = "crew.toml";

/// Environment variable that overrides the model id
pub const MODEL_ENV: &str = "MODEL";

/// Temperature used when none is configured
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

fn default_max_iterations() -> u32 {
    8
}

/// `[llm]` section as written in crew.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LlmSettings {
    pub model: Option<String>,
    pub temperature: f64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: None,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl LlmSettings {
    /// Resolve against the `MODEL` environment value, which takes precedence.
    ///
    /// There is no fallback model: one of the two must be set.
    pub fn resolve(&self, env_model: Option<String>) -> Result<LlmConfig, ConfigError> {
        let model = env_model
            .filter(|m| !m.trim().is_empty())
            .or_else(|| self.model.clone().filter(|m| !m.trim().is_empty()))
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "no model configured: set {} or [llm].model in {}",
                    MODEL_ENV, CREW_FILE
                ))
            })?;

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid(format!(
                "temperature {} is outside 0.0..=2.0",
                self.temperature
            )));
        }

        Ok(LlmConfig {
            model,
            temperature: self.temperature,
        })
    }
}

/// Resolved LLM client configuration
///
/// # Example
///
/// ```
/// use tech_article_generator::LlmConfig;
///
/// let config = LlmConfig {
///     model: "gpt-4o-mini".to_string(),
///     temperature: 0.7,
/// };
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: f64,
}

/// `[crew]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrewSettings {
    pub process: Process,
    pub verbose: bool,
}

/// Shape of crew.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CrewFile {
    llm: LlmSettings,
    crew: CrewSettings,
    tools: ToolPolicy,
}

/// An agent's identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    #[serde(default)]
    pub verbose: bool,
    /// Upper bound on model round-trips per task
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

/// A unit of pipeline work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskConfig {
    pub description: String,
    pub expected_output: String,
    /// Id of the agent that runs this task
    pub agent: String,
    /// Where to write the task's raw output, if anywhere
    #[serde(default)]
    pub output_file: Option<PathBuf>,
}

/// Everything loaded from a config directory
#[derive(Debug, Clone, PartialEq)]
pub struct CrewConfig {
    pub llm: LlmSettings,
    pub crew: CrewSettings,
    pub tools: ToolPolicy,
    pub agents: BTreeMap<String, AgentConfig>,
    pub tasks: BTreeMap<String, TaskConfig>,
}

impl CrewConfig {
    /// Load and structurally validate the config files in `dir`
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let agents: BTreeMap<String, AgentConfig> = read_toml(&dir.join(AGENTS_FILE))?;
        let tasks: BTreeMap<String, TaskConfig> = read_toml(&dir.join(TASKS_FILE))?;

        let crew_path = dir.join(CREW_FILE);
        let crew: CrewFile = if crew_path.exists() {
            read_toml(&crew_path)?
        } else {
            debug!(path = %crew_path.display(), "No crew settings file, using defaults");
            CrewFile::default()
        };

        let config = Self {
            llm: crew.llm,
            crew: crew.crew,
            tools: crew.tools,
            agents,
            tasks,
        };
        config.check_fields()?;
        Ok(config)
    }

    /// Check that the ids a crew declares are all defined
    pub fn require(&self, agent_ids: &[&str], task_ids: &[&str]) -> Result<(), ConfigError> {
        for id in agent_ids {
            if !self.agents.contains_key(*id) {
                return Err(ConfigError::Invalid(format!(
                    "agent `{}` is not defined in {}",
                    id, AGENTS_FILE
                )));
            }
        }
        for id in task_ids {
            if !self.tasks.contains_key(*id) {
                return Err(ConfigError::Invalid(format!(
                    "task `{}` is not defined in {}",
                    id, TASKS_FILE
                )));
            }
        }
        Ok(())
    }

    pub fn agent(&self, id: &str) -> Result<&AgentConfig, ConfigError> {
        self.agents
            .get(id)
            .ok_or_else(|| ConfigError::Invalid(format!("unknown agent `{}`", id)))
    }

    pub fn task(&self, id: &str) -> Result<&TaskConfig, ConfigError> {
        self.tasks
            .get(id)
            .ok_or_else(|| ConfigError::Invalid(format!("unknown task `{}`", id)))
    }

    fn check_fields(&self) -> Result<(), ConfigError> {
        for (id, agent) in &self.agents {
            non_empty(id, "role", &agent.role)?;
            non_empty(id, "goal", &agent.goal)?;
            non_empty(id, "backstory", &agent.backstory)?;
            if agent.max_iterations == 0 {
                return Err(ConfigError::Invalid(format!(
                    "agent `{}`: max_iterations must be at least 1",
                    id
                )));
            }
        }

        for (id, task) in &self.tasks {
            non_empty(id, "description", &task.description)?;
            non_empty(id, "expected_output", &task.expected_output)?;
            if !self.agents.contains_key(&task.agent) {
                return Err(ConfigError::Invalid(format!(
                    "task `{}` references undefined agent `{}`",
                    id, task.agent
                )));
            }
        }

        Ok(())
    }
}

fn non_empty(id: &str, field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("`{}`: {} must not be empty", id, field)));
    }
    Ok(())
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Pick the config directory: `preferred` if it exists, else ~/.config/tech-article-generator
pub fn resolve_config_dir(preferred: &Path) -> PathBuf {
    if preferred.is_dir() {
        return preferred.to_path_buf();
    }
    match dirs::config_dir().map(|p| p.join(APP_DIR)) {
        Some(fallback) if fallback.is_dir() => {
            debug!(
                preferred = %preferred.display(),
                fallback = %fallback.display(),
                "Config dir not found, using user config dir"
            );
            fallback
        }
        _ => preferred.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    const AGENTS: &str = r#"
[chief_topic_strategist]
role = "Chief Topic Strategist"
goal = "Pick a topic"
backstory = "Seasoned editor"
verbose = true
"#;

    const TASKS: &str = r#"
[topic_selection_task]
description = "Select a topic for {current_year}"
expected_output = "A topic"
agent = "chief_topic_strategist"
"#;

    fn write_dir(agents: &str, tasks: &str, crew: Option<&str>) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(AGENTS_FILE), agents).unwrap();
        fs::write(dir.path().join(TASKS_FILE), tasks).unwrap();
        if let Some(crew) = crew {
            fs::write(dir.path().join(CREW_FILE), crew).unwrap();
        }
        dir
    }

    #[test]
    fn test_load_with_defaults() {
        let dir = write_dir(AGENTS, TASKS, None);
        let config = CrewConfig::load(dir.path()).unwrap();

        let agent = config.agent("chief_topic_strategist").unwrap();
        assert!(agent.verbose);
        assert_eq!(agent.max_iterations, 8);
        assert_eq!(config.task("topic_selection_task").unwrap().output_file, None);
        assert_eq!(config.llm.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(config.crew.process, Process::Sequential);
        assert_eq!(config.tools, ToolPolicy::default());
        config
            .require(&["chief_topic_strategist"], &["topic_selection_task"])
            .unwrap();
    }

    #[test]
    fn test_load_crew_settings() {
        let crew = r#"
[llm]
model = "gpt-4o-mini"
temperature = 0.2

[crew]
process = "hierarchical"
verbose = true

[tools]
timeout_secs = 5
max_retries = 0
"#;
        let dir = write_dir(AGENTS, TASKS, Some(crew));
        let config = CrewConfig::load(dir.path()).unwrap();
        assert_eq!(config.llm.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(config.crew.process, Process::Hierarchical);
        assert_eq!(config.tools.timeout_secs, 5);
        assert_eq!(config.tools.max_retries, 0);
        assert_eq!(config.tools.initial_backoff_ms, 500);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let agents = format!("{}tools = [\"search\"]\n", AGENTS);
        let dir = write_dir(&agents, TASKS, None);
        assert!(matches!(
            CrewConfig::load(dir.path()),
            Err(ConfigError::Parse { .. })
        ));

        let dir = write_dir(AGENTS, TASKS, Some("[crew]\nmode = \"fast\"\n"));
        assert!(matches!(
            CrewConfig::load(dir.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_required_field() {
        let agents = r#"
[chief_topic_strategist]
role = "Chief Topic Strategist"
goal = "Pick a topic"
"#;
        let dir = write_dir(agents, TASKS, None);
        assert!(matches!(
            CrewConfig::load(dir.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_empty_field_rejected() {
        let agents = AGENTS.replace("Pick a topic", " ");
        let dir = write_dir(&agents, TASKS, None);
        assert!(matches!(
            CrewConfig::load(dir.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_dangling_agent_reference() {
        let tasks = TASKS.replace("agent = \"chief_topic_strategist\"", "agent = \"ghost\"");
        let dir = write_dir(AGENTS, &tasks, None);
        let err = CrewConfig::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_require_missing_ids() {
        let dir = write_dir(AGENTS, TASKS, None);
        let config = CrewConfig::load(dir.path()).unwrap();
        assert!(config.require(&["writer"], &[]).is_err());
        assert!(config.require(&[], &["outline_task"]).is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            CrewConfig::load(dir.path()),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_model_resolution() {
        let settings = LlmSettings::default();
        assert!(settings.resolve(None).is_err());
        assert!(settings.resolve(Some("  ".into())).is_err());

        let resolved = settings.resolve(Some("gpt-4o".into())).unwrap();
        assert_eq!(resolved.model, "gpt-4o");
        assert_eq!(resolved.temperature, 0.7);

        let settings = LlmSettings {
            model: Some("claude-sonnet-4-20250514".into()),
            ..Default::default()
        };
        assert_eq!(settings.resolve(None).unwrap().model, "claude-sonnet-4-20250514");
        assert_eq!(settings.resolve(Some("gpt-4o".into())).unwrap().model, "gpt-4o");
    }

    #[test]
    fn test_temperature_range() {
        let settings = LlmSettings {
            model: Some("m".into()),
            temperature: 3.5,
        };
        assert!(settings.resolve(None).is_err());
    }

    #[test]
    fn test_resolve_config_dir_prefers_existing() {
        let dir = TempDir::new().unwrap();
        assert_eq!(resolve_config_dir(dir.path()), dir.path().to_path_buf());
    }

    #[test]
    fn test_bundled_config_loads() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("config");
        let config = CrewConfig::load(&dir).unwrap();
        config
            .require(&["chief_topic_strategist"], &["topic_selection_task"])
            .unwrap();
        assert_eq!(config.crew.process, Process::Sequential);
        assert_eq!(config.tools, ToolPolicy::default());
        assert!(config.llm.model.is_none());
    }
}
