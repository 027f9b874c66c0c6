//! MCP tools implementation

pub mod comments;
pub mod format;
pub mod params;
pub mod search;
