//! CLI mode implementation
//!
//! The argument structs double as MCP tool input schemas via schemars.

use clap::{Args, Parser, Subcommand};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::tools::params::lenient_string;

/// Reddit toolkit CLI
#[derive(Parser)]
#[command(name = "reddit-toolkit")]
#[command(about = "Reddit post search and top comments for LLM agents", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output (no short flag to avoid conflicts)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Settings file (defaults to <config dir>/reddit-toolkit/config.json)
    #[arg(long, global = true, env = "REDDIT_TOOLKIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print JSON instead of Markdown
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search Reddit posts matching a query
    Search(SearchArgs),
    /// Fetch top-level comments for a Reddit post
    Comments(CommentsArgs),
    /// Print the agent workflow instructions
    Instructions,
}

fn default_sort() -> String {
    "relevance".to_string()
}

fn default_time_window() -> String {
    "all".to_string()
}

fn default_limit() -> String {
    "-1".to_string()
}

fn default_num_comments() -> String {
    "10".to_string()
}

/// Search tool arguments
#[derive(Args, JsonSchema, Deserialize, Serialize, Clone, Debug)]
pub struct SearchArgs {
    /// Free-text search query
    #[arg(short = 'q', long)]
    #[schemars(description = "Free-text search query")]
    pub query: String,

    /// Sort order: relevance, hot, top, new or comments
    #[arg(short = 's', long, default_value = "relevance")]
    #[serde(default = "default_sort", deserialize_with = "lenient_string")]
    #[schemars(with = "String", description = "Sort order: one of relevance, hot, top, new, comments (default relevance)")]
    pub sort: String,

    /// Time filter: hour, day, week, month, year or all
    #[arg(short = 't', long, default_value = "all")]
    #[serde(default = "default_time_window", deserialize_with = "lenient_string")]
    #[schemars(with = "String", description = "Time filter: one of hour, day, week, month, year, all (default all)")]
    pub time_window: String,

    /// Maximum number of posts as a string ("-1" for default 80, max 150)
    #[arg(short = 'l', long, default_value = "-1", allow_hyphen_values = true)]
    #[serde(default = "default_limit", deserialize_with = "lenient_string")]
    #[schemars(with = "String", description = "Maximum number of posts, passed as a string. Use \"-1\" for the default (80). Max 150.")]
    pub limit: String,
}

/// Comment tool arguments
#[derive(Args, JsonSchema, Deserialize, Serialize, Clone, Debug)]
pub struct CommentsArgs {
    /// Full URL of the Reddit post
    #[arg(short = 'u', long)]
    #[schemars(description = "Full URL of the Reddit post, as returned by search")]
    pub post_url: String,

    /// Maximum number of comments as a string (default 10)
    #[arg(short = 'n', long, default_value = "10")]
    #[serde(default = "default_num_comments", deserialize_with = "lenient_string")]
    #[schemars(with = "String", description = "Maximum number of top-level comments, passed as a string (default \"10\")")]
    pub num_comments: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_args_defaults_from_json() {
        let args: SearchArgs = serde_json::from_value(json!({"query": "rust"})).unwrap();
        assert_eq!(args.query, "rust");
        assert_eq!(args.sort, "relevance");
        assert_eq!(args.time_window, "all");
        assert_eq!(args.limit, "-1");
    }

    #[test]
    fn test_comments_args_numeric_count() {
        let args: CommentsArgs = serde_json::from_value(json!({
            "post_url": "https://www.reddit.com/r/rust/comments/abc123/x/",
            "num_comments": 5
        }))
        .unwrap();
        assert_eq!(args.num_comments, "5");
    }

    #[test]
    fn test_cli_parses_search() {
        let cli = Cli::try_parse_from([
            "reddit-toolkit", "search", "-q", "best pizza nyc", "-s", "top", "-t", "year", "-l", "7",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Search(args)) => {
                assert_eq!(args.query, "best pizza nyc");
                assert_eq!(args.sort, "top");
                assert_eq!(args.limit, "7");
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn test_cli_accepts_sentinel_limit() {
        let cli = Cli::try_parse_from(["reddit-toolkit", "search", "-q", "x", "-l", "-1"]).unwrap();
        match cli.command {
            Some(Commands::Search(args)) => assert_eq!(args.limit, "-1"),
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn test_cli_parses_comments_with_defaults() {
        let cli = Cli::try_parse_from([
            "reddit-toolkit", "--json", "comments", "-u", "https://redd.it/abc123",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Some(Commands::Comments(args)) => assert_eq!(args.num_comments, "10"),
            _ => panic!("expected comments command"),
        }
    }
}
