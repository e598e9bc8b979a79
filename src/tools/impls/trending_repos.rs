//! GitHub trending repositories

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{parse_params, placeholder_url};
use crate::error::ToolError;
use crate::tools::schema::{object_schema, InputSchema};
use crate::tools::{names, Tool, ToolResult};

/// Window over which repositories are ranked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePeriod {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl TimePeriod {
    pub const VALUES: &'static [&'static str] = &["daily", "weekly", "monthly"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

/// A trending repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoRecord {
    pub name: String,
    pub description: String,
    pub url: Url,
    pub stars: u64,
    pub language: String,
}

#[derive(Debug, Deserialize)]
struct TrendingReposParams {
    #[serde(default)]
    time_period: TimePeriod,
}

/// Fetches trending ML/AI repositories from GitHub.
///
/// Placeholder data only; the period is validated but does not change the result.
pub struct TrendingReposTool {
    schema: InputSchema,
}

impl TrendingReposTool {
    pub const NAME: &'static str = names::GET_GITHUB_TRENDS;

    pub fn new() -> Self {
        Self {
            schema: object_schema()
                .enum_with_default(
                    "time_period",
                    TimePeriod::VALUES,
                    TimePeriod::default().as_str(),
                    "Time period for trending repos (daily, weekly, monthly)",
                )
                .build(),
        }
    }
}

impl Default for TrendingReposTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for TrendingReposTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Fetch trending ML/AI repositories from GitHub. \
         Returns a list of repositories with their names, descriptions, and URLs."
    }

    fn input_schema(&self) -> &InputSchema {
        &self.schema
    }

    async fn run(&self, params: Value) -> Result<ToolResult, ToolError> {
        let params: TrendingReposParams = parse_params(params)?;
        debug!(
            time_period = params.time_period.as_str(),
            "get_github_trends returning placeholder repository"
        );

        ToolResult::from_records([RepoRecord {
            name: "Example ML Repo".to_string(),
            description: "This is a placeholder for repo description".to_string(),
            url: placeholder_url("https://github.com/example/repo")?,
            stars: 1000,
            language: "Python".to_string(),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolRegistry;
    use serde_json::json;

    #[test]
    fn test_time_period_defaults_to_daily() {
        let tool = TrendingReposTool::new();
        let params = tool.input_schema().validate(json!({})).unwrap();
        assert_eq!(params["time_period"], "daily");

        let parsed: TrendingReposParams = serde_json::from_value(params).unwrap();
        assert_eq!(parsed.time_period, TimePeriod::Daily);
    }

    #[tokio::test]
    async fn test_stars_is_non_negative_integer() {
        let registry = ToolRegistry::topic_research();
        let result = registry
            .dispatch(TrendingReposTool::NAME, json!({}))
            .await
            .unwrap();

        let stars = &result.first().unwrap()["stars"];
        assert!(stars.is_u64(), "stars should be an integer, got {}", stars);
    }

    #[tokio::test]
    async fn test_unknown_period_rejected() {
        let registry = ToolRegistry::topic_research();
        let err = registry
            .dispatch(TrendingReposTool::NAME, json!({ "time_period": "hourly" }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));
    }
}
