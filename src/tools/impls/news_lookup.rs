//! Tech news lookup

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{parse_params, placeholder_url};
use crate::error::ToolError;
use crate::tools::schema::{object_schema, InputSchema};
use crate::tools::{names, Tool, ToolResult};

/// News category filter. Anything outside this set is a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsCategory {
    #[default]
    All,
    Ai,
    Ml,
    Genai,
    Mlops,
}

impl NewsCategory {
    pub const VALUES: &'static [&'static str] = &["all", "ai", "ml", "genai", "mlops"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Ai => "ai",
            Self::Ml => "ml",
            Self::Genai => "genai",
            Self::Mlops => "mlops",
        }
    }
}

/// A news article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    pub summary: String,
    pub url: Url,
    pub source: String,
    pub published_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct NewsLookupParams {
    #[serde(default)]
    category: NewsCategory,
}

/// Fetches recent ML/AI news. Returns a placeholder article for now.
pub struct NewsLookupTool {
    schema: InputSchema,
}

impl NewsLookupTool {
    pub const NAME: &'static str = names::GET_TECH_NEWS;

    pub fn new() -> Self {
        Self {
            schema: object_schema()
                .enum_with_default(
                    "category",
                    NewsCategory::VALUES,
                    NewsCategory::default().as_str(),
                    "Category of tech news (all, ai, ml, genai, mlops)",
                )
                .build(),
        }
    }
}

impl Default for NewsLookupTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for NewsLookupTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Fetch recent ML/AI news from tech news sources. \
         Returns a list of news articles with titles, summaries, and URLs."
    }

    fn input_schema(&self) -> &InputSchema {
        &self.schema
    }

    async fn run(&self, params: Value) -> Result<ToolResult, ToolError> {
        let params: NewsLookupParams = parse_params(params)?;
        debug!(
            category = params.category.as_str(),
            "get_tech_news returning placeholder article"
        );

        ToolResult::from_records([ArticleRecord {
            title: "Example AI News".to_string(),
            summary: "This is a placeholder for news summary".to_string(),
            url: placeholder_url("https://technews.example/article")?,
            source: "TechNews".to_string(),
            published_date: NaiveDate::from_ymd_opt(2024, 1, 1)
                .ok_or_else(|| ToolError::UpstreamUnavailable("invalid date".into()))?,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolRegistry;
    use serde_json::json;

    #[tokio::test]
    async fn test_bogus_category_is_validation_error() {
        let registry = ToolRegistry::topic_research();
        let err = registry
            .dispatch(NewsLookupTool::NAME, json!({ "category": "bogus" }))
            .await
            .unwrap_err();
        match err {
            ToolError::Validation(msg) => assert!(msg.contains("bogus")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_default_category() {
        let tool = NewsLookupTool::new();
        let params = tool.input_schema().validate(Value::Null).unwrap();
        assert_eq!(params["category"], "all");

        let result = tool.run(params).await.unwrap();
        let article: ArticleRecord =
            serde_json::from_value(json!(result.first().unwrap())).unwrap();
        assert_eq!(article.source, "TechNews");
    }

    #[test]
    fn test_values_match_serde_names() {
        for value in NewsCategory::VALUES {
            let parsed: NewsCategory = serde_json::from_value(json!(value)).unwrap();
            assert_eq!(parsed.as_str(), *value);
        }
    }
}
