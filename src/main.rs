//! reddit-toolkit MCP Server & CLI (Rust)
//!
//! Dual-mode application:
//! - MCP Server Mode (default): Model Context Protocol server using stdio
//! - CLI Mode: Command-line utility for direct tool execution
//!
//! Implements two tools:
//! - `search(query, sort, time_window, limit)` - Search Reddit posts
//! - `get_top_comments(post_url, num_comments)` - Top-level comments of a post

mod cli;
mod config;
mod error;
mod http;
mod mcp;
mod reddit;
mod tools;

#[cfg(test)]
mod tests_mcp_schema;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use config::Settings;
use error::AppError;
use reddit::RedditClient;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Detect mode: CLI if args present, MCP server otherwise
    if std::env::args().len() > 1 {
        run_cli_mode().await
    } else {
        run_mcp_mode().await
    }
}

/// Log to stderr so stdout stays reserved for results and MCP frames
fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_reddit_client(settings: &Settings) -> Result<RedditClient> {
    RedditClient::new(settings).context("Failed to initialize Reddit client")
}

/// Run in CLI mode
async fn run_cli_mode() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    init_logging(log_level);

    let result = match cli.command {
        Some(Commands::Instructions) => Ok(mcp::WORKFLOW_INSTRUCTIONS.to_string()),
        Some(command) => execute_command(command, cli.config.as_deref(), cli.json).await,
        None => {
            eprintln!("Error: No command specified. Use --help for usage information.");
            std::process::exit(1);
        }
    };

    match result {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(get_exit_code(&e));
        }
    }
}

async fn execute_command(command: Commands, config: Option<&std::path::Path>, json: bool) -> Result<String> {
    let settings = Settings::load(config)?;
    let reddit = build_reddit_client(&settings)?;

    match command {
        Commands::Search(args) => {
            let query = args.query.clone();
            let posts = tools::search::execute_search(&reddit, args).await?;
            if json {
                Ok(serde_json::to_string_pretty(&posts)?)
            } else {
                Ok(tools::format::posts_to_markdown(query.trim(), &posts))
            }
        }
        Commands::Comments(args) => {
            let post_url = args.post_url.clone();
            let comments = tools::comments::execute_get_top_comments(&reddit, args).await?;
            if json {
                Ok(serde_json::to_string_pretty(&comments)?)
            } else {
                Ok(tools::format::comments_to_markdown(post_url.trim(), &comments))
            }
        }
        Commands::Instructions => Ok(mcp::WORKFLOW_INSTRUCTIONS.to_string()),
    }
}

/// Map AppError to exit code
fn get_exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<AppError>())
        .map(AppError::exit_code)
        .unwrap_or(5)
}

/// Run in MCP server mode
async fn run_mcp_mode() -> Result<()> {
    init_logging("info");

    let settings = Settings::load(None)?;
    let reddit = build_reddit_client(&settings)?;

    info!(
        "Starting reddit-toolkit MCP Server (base_url={}, max_results={})",
        settings.base_url, settings.max_results
    );

    mcp::handle_stdio(reddit).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_from_app_error() {
        let err = anyhow::Error::new(AppError::NotFound("post x".into()));
        assert_eq!(get_exit_code(&err), 3);

        let err = anyhow::Error::new(AppError::InvalidInput("bad".into())).context("while parsing");
        assert_eq!(get_exit_code(&err), 1);

        let err = anyhow::anyhow!("something else");
        assert_eq!(get_exit_code(&err), 5);
    }
}
