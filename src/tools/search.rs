//! Search tool implementation
//!
//! Implements the `search(query, sort, time_window, limit)` MCP tool

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cli::SearchArgs;
use crate::error::AppError;
use crate::mcp::{McpResponse, ToolResult};
use crate::reddit::{PostSummary, RedditClient};
use crate::tools::params::SearchRequest;

/// Handle search tool call
pub async fn handle_search(reddit: &RedditClient, id: Option<Value>, args: Value) -> McpResponse {
    let result = handle_search_impl(reddit, args)
        .await
        .and_then(|posts| ToolResult::json_items("posts", &posts));

    match result {
        Ok(tool_result) => tool_result.into_response(id),
        Err(e) => {
            if e.is_rate_limited() {
                warn!("Search rate limited by Reddit");
            }
            ToolResult::failure(&e).into_response(id)
        }
    }
}

async fn handle_search_impl(reddit: &RedditClient, args: Value) -> Result<Vec<PostSummary>, AppError> {
    let search_args: SearchArgs = serde_json::from_value(args)
        .map_err(|e| AppError::InvalidInput(format!("Invalid arguments: {}", e)))?;

    execute_search(reddit, search_args).await
}

/// Execute search tool (shared implementation for MCP and CLI)
pub async fn execute_search(reddit: &RedditClient, args: SearchArgs) -> Result<Vec<PostSummary>, AppError> {
    let request = SearchRequest::from_args(&args, reddit.default_limit())?;

    debug!(
        "Effective search parameters: sort={} t={} limit={}",
        request.sort.as_str(),
        request.time_window.as_str(),
        request.limit
    );
    info!("Search request for: {}", request.query);

    let posts = reddit.search(&request).await?;

    info!("Search for '{}' returned {} posts", request.query, posts.len());

    Ok(posts)
}
