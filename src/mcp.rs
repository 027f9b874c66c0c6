//! MCP (Model Context Protocol) handling module
//!
//! This module implements the JSON-RPC 2.0 protocol for MCP communication.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader as AsyncBufReader};
use tracing::{debug, error, info};

use crate::error::AppError;
use crate::reddit::RedditClient;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Agent-facing workflow document, served as `instructions` and as a prompt
pub const WORKFLOW_INSTRUCTIONS: &str = include_str!("../prompts/workflow.md");

pub const RESEARCH_PROMPT_NAME: &str = "reddit_research";

// JSON-RPC 2.0 error codes
const PARSE_ERROR: i64 = -32700;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const INTERNAL_ERROR: i64 = -32603;

/// Server context shared by every request on a connection
#[derive(Clone)]
pub struct ServerContext {
    pub reddit: RedditClient,
    pub client_info: Option<ClientInfo>,
}

impl ServerContext {
    pub fn new(reddit: RedditClient) -> Self {
        Self {
            reddit,
            client_info: None,
        }
    }

    pub fn get_client_name(&self) -> String {
        self.client_info
            .as_ref()
            .and_then(|info| info.name.as_ref())
            .cloned()
            .unwrap_or_else(|| "Unknown Client".to_string())
    }
}

/// MCP JSON-RPC 2.0 request structure
#[derive(Debug, Deserialize)]
pub struct McpRequest {
    /// JSON-RPC version field, always "2.0" and never read
    #[allow(dead_code)]
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    pub params: Option<Value>,
}

impl McpRequest {
    /// Notifications carry no id and must never be answered
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Initialize request parameters
#[derive(Debug, Deserialize)]
pub struct InitializeParams {
    #[serde(rename = "clientInfo")]
    pub client_info: Option<ClientInfo>,
}

/// Client information
#[derive(Debug, Deserialize, Clone)]
pub struct ClientInfo {
    pub name: Option<String>,
    #[allow(dead_code)]
    pub version: Option<String>,
}

/// MCP JSON-RPC 2.0 response structure
#[derive(Debug, Serialize)]
pub struct McpResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
}

/// MCP Error structure
#[derive(Debug, Serialize)]
pub struct McpError {
    pub code: i64,
    pub message: String,
}

/// MCP Tool call arguments
#[derive(Debug, Deserialize)]
pub struct ToolCallArgs {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Deserialize)]
struct PromptGetArgs {
    name: String,
}

/// MCP Content item
#[derive(Debug, Serialize)]
pub struct ContentItem {
    pub r#type: String,
    pub text: String,
}

/// MCP Tool result
#[derive(Debug, Serialize)]
pub struct ToolResult {
    pub content: Vec<ContentItem>,
    #[serde(rename = "structuredContent", skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl McpResponse {
    /// Create a successful response
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(id: Option<Value>, code: i64, message: &str) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(McpError {
                code,
                message: message.to_string(),
            }),
        }
    }
}

impl ToolResult {
    /// Successful result carrying `items` as JSON text and as structured content under `key`
    pub fn json_items<T: Serialize>(key: &str, items: &[T]) -> Result<Self, AppError> {
        let text = serde_json::to_string_pretty(items)
            .map_err(|e| AppError::Internal(format!("Failed to serialize result: {}", e)))?;
        let structured = serde_json::to_value(items)
            .map_err(|e| AppError::Internal(format!("Failed to serialize result: {}", e)))?;

        let mut structured_content = serde_json::Map::new();
        structured_content.insert(key.to_string(), structured);

        Ok(Self {
            content: vec![ContentItem::text(text)],
            structured_content: Some(Value::Object(structured_content)),
            is_error: false,
        })
    }

    /// Failed tool execution, reported in-band so the agent can react to it
    pub fn failure(err: &AppError) -> Self {
        Self {
            content: vec![ContentItem::text(err.to_string())],
            structured_content: Some(serde_json::json!({ "error": err.payload() })),
            is_error: true,
        }
    }

    pub fn into_response(self, id: Option<Value>) -> McpResponse {
        match serde_json::to_value(self) {
            Ok(value) => McpResponse::success(id, value),
            Err(e) => McpResponse::error(id, INTERNAL_ERROR, &format!("Failed to encode result: {}", e)),
        }
    }
}

impl ContentItem {
    /// Helper to create plain text content
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            r#type: "text".to_string(),
            text: content.into(),
        }
    }
}

/// Parse MCP request from JSON string
pub fn parse_request(json: &str) -> Result<McpRequest> {
    let request: McpRequest = serde_json::from_str(json)?;
    Ok(request)
}

/// Serialize MCP response to JSON string
pub fn serialize_response(response: &McpResponse) -> Result<String> {
    Ok(serde_json::to_string(response)?)
}

/// Handle stdio MCP communication
pub async fn handle_stdio(reddit: RedditClient) -> Result<()> {
    info!("Starting reddit-toolkit MCP server on stdio");

    let stdin = tokio::io::stdin();
    let mut reader = AsyncBufReader::new(stdin).lines();
    let mut stdout = tokio::io::stdout();

    let mut context = ServerContext::new(reddit);

    while let Some(line) = reader.next_line().await? {
        let Some(response) = handle_line(&line, &mut context).await else {
            continue;
        };

        let response_json = serialize_response(&response)?;
        debug!("Sending response: {}", response_json);

        stdout.write_all(response_json.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    info!("stdin closed, shutting down");
    Ok(())
}

/// Handle one input line; blank lines and notifications produce no reply
async fn handle_line(line: &str, context: &mut ServerContext) -> Option<McpResponse> {
    if line.trim().is_empty() {
        return None;
    }
    debug!("Received request: {}", line);

    match parse_request(line) {
        Ok(request) if request.is_notification() => {
            debug!("Notification '{}' acknowledged", request.method);
            None
        }
        Ok(request) => Some(handle_request(request, context).await),
        Err(e) => {
            error!("Failed to parse request: {}", e);
            Some(McpResponse::error(None, PARSE_ERROR, &format!("Invalid JSON: {}", e)))
        }
    }
}

/// Handle a single MCP request
async fn handle_request(request: McpRequest, context: &mut ServerContext) -> McpResponse {
    match request.method.as_str() {
        "initialize" => handle_initialize(request, context),
        "ping" => McpResponse::success(request.id, serde_json::json!({})),
        "tools/call" => handle_tool_call(request, context).await,
        "tools/list" => McpResponse::success(request.id, serde_json::json!({ "tools": build_tools_array() })),
        "prompts/list" => handle_prompts_list(request),
        "prompts/get" => handle_prompts_get(request),
        _ => McpResponse::error(
            request.id,
            METHOD_NOT_FOUND,
            &format!("Method '{}' not found", request.method),
        ),
    }
}

/// Handle tools/call method
async fn handle_tool_call(request: McpRequest, context: &ServerContext) -> McpResponse {
    let args: ToolCallArgs = match serde_json::from_value(request.params.unwrap_or_default()) {
        Ok(args) => args,
        Err(e) => {
            return McpResponse::error(
                request.id,
                INVALID_PARAMS,
                &format!("Invalid parameters: {}", e),
            )
        }
    };

    debug!("{} called tool '{}'", context.get_client_name(), args.name);

    match args.name.as_str() {
        "search" => crate::tools::search::handle_search(&context.reddit, request.id, args.arguments).await,
        "get_top_comments" => {
            crate::tools::comments::handle_get_top_comments(&context.reddit, request.id, args.arguments).await
        }
        _ => McpResponse::error(
            request.id,
            INVALID_PARAMS,
            &format!("Tool '{}' not found", args.name),
        ),
    }
}

/// Handle initialize method
fn handle_initialize(request: McpRequest, context: &mut ServerContext) -> McpResponse {
    if let Some(params) = request.params {
        if let Ok(init_params) = serde_json::from_value::<InitializeParams>(params) {
            context.client_info = init_params.client_info;
        }
    }
    info!("Initialized by {}", context.get_client_name());

    let result = serde_json::json!({
        "protocolVersion": PROTOCOL_VERSION,
        "serverInfo": {
            "name": "reddit-toolkit",
            "version": env!("CARGO_PKG_VERSION"),
        },
        "capabilities": {
            "tools": { "listChanged": false },
            "prompts": { "listChanged": false }
        },
        "instructions": WORKFLOW_INSTRUCTIONS,
        "tools": build_tools_array()
    });
    McpResponse::success(request.id, result)
}

fn handle_prompts_list(request: McpRequest) -> McpResponse {
    McpResponse::success(
        request.id,
        serde_json::json!({
            "prompts": [{
                "name": RESEARCH_PROMPT_NAME,
                "description": "How to research a question with Reddit search and top comments"
            }]
        }),
    )
}

fn handle_prompts_get(request: McpRequest) -> McpResponse {
    let args: PromptGetArgs = match serde_json::from_value(request.params.unwrap_or_default()) {
        Ok(args) => args,
        Err(e) => {
            return McpResponse::error(request.id, INVALID_PARAMS, &format!("Invalid parameters: {}", e))
        }
    };

    if args.name != RESEARCH_PROMPT_NAME {
        return McpResponse::error(
            request.id,
            INVALID_PARAMS,
            &format!("Prompt '{}' not found", args.name),
        );
    }

    McpResponse::success(
        request.id,
        serde_json::json!({
            "description": "Reddit research workflow",
            "messages": [{
                "role": "user",
                "content": { "type": "text", "text": WORKFLOW_INSTRUCTIONS }
            }]
        }),
    )
}

/// Build the tools array returned from tools/list and initialize
pub fn build_tools_array() -> Value {
    use crate::cli::{CommentsArgs, SearchArgs};
    use schemars::schema_for;

    // Generate JSON schemas from the CLI argument structs
    let search_schema = schema_for!(SearchArgs);
    let comments_schema = schema_for!(CommentsArgs);

    serde_json::json!([
        {
            "name": "search",
            "description": "Search Reddit posts matching a query. Returns a JSON array of \
                {title, subreddit, url, score, num_comments}. An empty array means no posts matched.",
            "inputSchema": search_schema,
            "annotations": { "readOnlyHint": true, "openWorldHint": true }
        },
        {
            "name": "get_top_comments",
            "description": "Fetch the top-level comments of a Reddit post, in Reddit's own ranking. \
                Returns a JSON array of {author, body, score}.",
            "inputSchema": comments_schema,
            "annotations": { "readOnlyHint": true, "openWorldHint": true }
        }
    ])
}

#[cfg(test)]
pub(crate) fn test_context(base_url: &str) -> ServerContext {
    let settings = crate::config::Settings {
        base_url: base_url.to_string(),
        ..crate::config::Settings::default()
    };
    ServerContext::new(RedditClient::new(&settings).expect("client"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(id: i64, method: &str, params: Option<Value>) -> McpRequest {
        McpRequest {
            jsonrpc: "2.0".into(),
            id: Some(json!(id)),
            method: method.into(),
            params,
        }
    }

    #[tokio::test]
    async fn test_initialize_response_contains_fields() {
        let mut context = test_context("http://127.0.0.1:9");
        let params = json!({"clientInfo": {"name": "test-agent", "version": "1"}});
        let resp = handle_request(request(1, "initialize", Some(params)), &mut context).await;
        assert!(resp.error.is_none());
        let result = resp.result.expect("result present");
        assert_eq!(result["serverInfo"]["name"], "reddit-toolkit");
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert!(result["instructions"].as_str().unwrap().contains("get_top_comments"));
        assert_eq!(context.get_client_name(), "test-agent");
    }

    #[tokio::test]
    async fn test_tools_list_contains_both_tools() {
        let mut context = test_context("http://127.0.0.1:9");
        let resp = handle_request(request(2, "tools/list", None), &mut context).await;
        let result = resp.result.expect("result present");
        let names: Vec<&str> = result["tools"]
            .as_array()
            .expect("tools array")
            .iter()
            .filter_map(|t| t["name"].as_str())
            .collect();
        assert_eq!(names, vec!["search", "get_top_comments"]);
    }

    #[tokio::test]
    async fn test_unknown_method_and_tool() {
        let mut context = test_context("http://127.0.0.1:9");
        let resp = handle_request(request(3, "resources/list", None), &mut context).await;
        assert_eq!(resp.error.expect("error").code, METHOD_NOT_FOUND);

        let params = json!({"name": "delete_everything", "arguments": {}});
        let resp = handle_request(request(4, "tools/call", Some(params)), &mut context).await;
        assert_eq!(resp.error.expect("error").code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_prompts_get_returns_workflow() {
        let mut context = test_context("http://127.0.0.1:9");
        let params = json!({"name": RESEARCH_PROMPT_NAME});
        let resp = handle_request(request(5, "prompts/get", Some(params)), &mut context).await;
        let result = resp.result.expect("result");
        assert_eq!(result["messages"][0]["content"]["text"], WORKFLOW_INSTRUCTIONS);

        let params = json!({"name": "other"});
        let resp = handle_request(request(6, "prompts/get", Some(params)), &mut context).await;
        assert!(resp.error.is_some());
    }

    #[tokio::test]
    async fn test_ping_and_prompts_list() {
        let mut context = test_context("http://127.0.0.1:9");
        let resp = handle_request(request(7, "ping", None), &mut context).await;
        assert_eq!(resp.result.expect("result"), json!({}));

        let resp = handle_request(request(8, "prompts/list", None), &mut context).await;
        let result = resp.result.expect("result");
        assert_eq!(result["prompts"][0]["name"], RESEARCH_PROMPT_NAME);
    }

    #[tokio::test]
    async fn test_lines_without_reply() {
        let mut context = test_context("http://127.0.0.1:9");
        let silent = handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#, &mut context).await;
        assert!(silent.is_none());
        assert!(handle_line("   ", &mut context).await.is_none());

        let resp = handle_line(r#"{"jsonrpc":"2.0","id":3,"method":"ping"}"#, &mut context)
            .await
            .expect("ping is answered");
        assert_eq!(resp.id, Some(json!(3)));

        let resp = handle_line("{not json", &mut context).await.expect("parse errors are answered");
        assert_eq!(resp.error.expect("error").code, PARSE_ERROR);
    }

    #[test]
    fn test_notification_detection() {
        let req = parse_request(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).unwrap();
        assert!(req.is_notification());
        let req = parse_request(r#"{"jsonrpc":"2.0","id":0,"method":"ping"}"#).unwrap();
        assert!(!req.is_notification());
    }

    #[test]
    fn test_failure_result_shape() {
        let tr = ToolResult::failure(&AppError::NotFound("post abc does not exist".into()));
        let json = serde_json::to_value(&tr).unwrap();
        assert_eq!(json["isError"], true);
        assert_eq!(json["structuredContent"]["error"]["code"], "not_found");
        assert_eq!(json["structuredContent"]["error"]["retryable"], false);
    }

    #[test]
    fn test_empty_items_result_is_not_error() {
        let tr = ToolResult::json_items::<crate::reddit::PostSummary>("posts", &[]).unwrap();
        let json = serde_json::to_value(&tr).unwrap();
        assert_eq!(json["isError"], false);
        assert_eq!(json["content"][0]["text"], "[]");
        assert_eq!(json["structuredContent"]["posts"], json!([]));
    }
}
