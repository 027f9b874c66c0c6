//! Top comments tool implementation
//!
//! Implements the `get_top_comments(post_url, num_comments)` MCP tool

use serde_json::Value;
use tracing::{debug, info};

use crate::cli::CommentsArgs;
use crate::error::AppError;
use crate::mcp::{McpResponse, ToolResult};
use crate::reddit::{CommentSummary, RedditClient};
use crate::tools::params::CommentRequest;

/// Handle get_top_comments tool call
pub async fn handle_get_top_comments(reddit: &RedditClient, id: Option<Value>, args: Value) -> McpResponse {
    let result = handle_comments_impl(reddit, args)
        .await
        .and_then(|comments| ToolResult::json_items("comments", &comments));

    match result {
        Ok(tool_result) => tool_result.into_response(id),
        Err(e) => ToolResult::failure(&e).into_response(id),
    }
}

async fn handle_comments_impl(reddit: &RedditClient, args: Value) -> Result<Vec<CommentSummary>, AppError> {
    let comments_args: CommentsArgs = serde_json::from_value(args)
        .map_err(|e| AppError::InvalidInput(format!("Invalid arguments: {}", e)))?;

    execute_get_top_comments(reddit, comments_args).await
}

/// Execute get_top_comments tool (shared implementation for MCP and CLI)
///
/// The link is validated before any network traffic.
pub async fn execute_get_top_comments(
    reddit: &RedditClient,
    args: CommentsArgs,
) -> Result<Vec<CommentSummary>, AppError> {
    let request = CommentRequest::from_args(&args)?;

    debug!("Effective num_comments: {}", request.num_comments);
    info!("Comments request for post: {}", request.post_url.id);

    let comments = reddit.top_comments(&request).await?;

    info!("Post {} returned {} comments", request.post_url.id, comments.len());

    Ok(comments)
}
