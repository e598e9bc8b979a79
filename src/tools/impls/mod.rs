mod news_lookup;
mod paper_search;
mod trending_repos;

use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::ToolError;

pub use news_lookup::{ArticleRecord, NewsCategory, NewsLookupTool};
pub use paper_search::{PaperRecord, PaperSearchTool};
pub use trending_repos::{RepoRecord, TimePeriod, TrendingReposTool};

/// Deserialize validated arguments into a tool's typed params
fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, ToolError> {
    serde_json::from_value(params).map_err(|e| ToolError::validation(format!("invalid params: {}", e)))
}

fn placeholder_url(raw: &str) -> Result<Url, ToolError> {
    Url::parse(raw).map_err(|e| ToolError::UpstreamUnavailable(format!("bad url {}: {}", raw, e)))
}
