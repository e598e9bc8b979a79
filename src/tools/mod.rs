//! Research tools and the registry that exposes them to an agent
//!
//! Every tool declares an [`InputSchema`]; arguments are validated against it
//! before the tool runs, and the registry is the only place calls are routed
//! by name.

mod exec;
mod impls;
pub mod schema;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ToolError;

pub use exec::{ToolExecutor, ToolPolicy};
pub use impls::{
    ArticleRecord, NewsCategory, NewsLookupTool, PaperRecord, PaperSearchTool, RepoRecord, TimePeriod,
    TrendingReposTool,
};
pub use schema::{FieldKind, FieldSpec, InputSchema};

/// Tool names as the LLM sees them
pub mod names {
    pub const SEARCH_ARXIV: &str = "search_arxiv";
    pub const GET_GITHUB_TRENDS: &str = "get_github_trends";
    pub const GET_TECH_NEWS: &str = "get_tech_news";
}

/// A schema-validated lookup an agent can call
#[async_trait]
pub trait Tool: Send + Sync {
    /// Stable name, used as the dispatch key
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn input_schema(&self) -> &InputSchema;

    /// Run with arguments already normalized by [`InputSchema::validate`]
    async fn run(&self, params: Value) -> Result<ToolResult, ToolError>;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema().clone(),
        }
    }
}

/// Name, description and input shape of a tool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: InputSchema,
}

/// A single result record: field name to value
pub type Record = Map<String, Value>;

/// Ordered records returned by one tool call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolResult {
    records: Vec<Record>,
}

impl ToolResult {
    /// Build from any serializable record type
    pub fn from_records<T: Serialize>(items: impl IntoIterator<Item = T>) -> Result<Self, ToolError> {
        let records = items
            .into_iter()
            .map(|item| match serde_json::to_value(item) {
                Ok(Value::Object(map)) => Ok(map),
                Ok(other) => Err(ToolError::UpstreamUnavailable(format!(
                    "record is not an object: {}",
                    other
                ))),
                Err(e) => Err(ToolError::UpstreamUnavailable(format!(
                    "unserializable record: {}",
                    e
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { records })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Render as the content of a tool response message
    pub fn to_content(&self) -> String {
        serde_json::to_string_pretty(&self.records).unwrap_or_else(|_| "[]".to_string())
    }
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub call_id: String,
    pub name: String,
    pub params: Value,
}

/// Fixed, ordered set of tools owned by one agent
#[derive(Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// The strategist's research tools: papers, repositories, news
    pub fn topic_research() -> Self {
        Self {
            tools: vec![
                Arc::new(PaperSearchTool::new()),
                Arc::new(TrendingReposTool::new()),
                Arc::new(NewsLookupTool::new()),
            ],
        }
    }

    /// Build from an explicit tool list, rejecting duplicate names
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Result<Self, ToolError> {
        let mut seen = HashSet::new();
        for tool in &tools {
            if !seen.insert(tool.name()) {
                return Err(ToolError::validation(format!(
                    "duplicate tool name `{}`",
                    tool.name()
                )));
            }
        }
        Ok(Self { tools })
    }

    pub fn empty() -> Self {
        Self { tools: Vec::new() }
    }

    /// All tools in registration order
    pub fn list(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Validate `input` and run the named tool
    pub async fn dispatch(&self, name: &str, input: Value) -> Result<ToolResult, ToolError> {
        let tool = self.get(name).ok_or_else(|| {
            ToolError::validation(format!(
                "unknown tool `{}` (available: {})",
                name,
                self.names().join(", ")
            ))
        })?;
        let params = tool.input_schema().validate(input)?;
        tool.run(params).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::topic_research()
    }
}
