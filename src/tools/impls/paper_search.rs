//! arXiv paper search

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

/// A research paper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub title: String,
    pub summary: String,
    pub url: Url,
    pub published_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct PaperSearchParams {
    query: String,
}

/// Searches arXiv for recent ML/AI/GenAI papers.
///
/// Not yet backed by the arXiv API: every query returns one placeholder paper.
pub struct PaperSearchTool {
    schema: InputSchema,
}

impl PaperSearchTool {
    pub const NAME: &'static str = names::SEARCH_ARXIV;

    pub fn new() -> Self {
        Self {
            schema: object_schema()
                .required_string("query", "Search query for arXiv papers in ML/AI/GenAI.")
                .build(),
        }
    }
}

impl Default for PaperSearchTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for PaperSearchTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Search arXiv for recent papers in ML/AI/GenAI. \
         Returns a list of relevant papers with titles, summaries, and URLs."
    }

    fn input_schema(&self) -> &InputSchema {
        &self.schema
    }

    async fn run(&self, params: Value) -> Result<ToolResult, ToolError> {
        let params: PaperSearchParams = parse_params(params)?;
        debug!(query = %params.query, "search_arxiv returning placeholder paper");

        ToolResult::from_records([PaperRecord {
            title: "Example ML Paper".to_string(),
            summary: "This is a placeholder for paper summary".to_string(),
            url: placeholder_url("https://arxiv.org/example")?,
            published_date: NaiveDate::from_ymd_opt(2024, 1, 1)
                .ok_or_else(|| ToolError::UpstreamUnavailable("invalid date".into()))?,
        }])
    }
}
