//! Reddit API access

pub mod client;
pub mod models;
pub mod permalink;

pub use client::RedditClient;
pub use models::{CommentSummary, PostSummary};
pub use permalink::PostUrl;
