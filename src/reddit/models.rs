//! Reddit listing envelopes and the summaries handed back to the agent

use serde::{Deserialize, Serialize};

/// Web origin used for post links, independent of the API base
pub const REDDIT_WEB_BASE: &str = "https://www.reddit.com";

#[derive(Debug, Clone, Deserialize)]
pub struct Listing<T> {
    #[allow(dead_code)]
    pub kind: String,
    pub data: ListingData<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingData<T> {
    #[serde(default = "Vec::new")]
    pub children: Vec<Thing<T>>,
}

/// One child of a listing: `t3` for links, `t1` for comments, `more` for stubs
#[derive(Debug, Clone, Deserialize)]
pub struct Thing<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkData {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: i64,
    pub created_utc: Option<f64>,
}

/// Comment payloads; `more` stubs share the envelope but lack these fields
#[derive(Debug, Clone, Deserialize)]
pub struct CommentData {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub score: i64,
}

/// The comments endpoint answers with `[post listing, comment listing]`
pub type CommentsResponse = Vec<Listing<serde_json::Value>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub title: String,
    pub subreddit: String,
    pub url: String,
    pub score: i64,
    pub num_comments: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_utc: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentSummary {
    pub author: String,
    pub body: String,
    pub score: i64,
}

impl From<LinkData> for PostSummary {
    fn from(link: LinkData) -> Self {
        Self {
            title: link.title,
            subreddit: link.subreddit,
            url: format!("{}{}", REDDIT_WEB_BASE, link.permalink),
            score: link.score,
            num_comments: link.num_comments,
            created_utc: link.created_utc,
        }
    }
}

impl From<CommentData> for CommentSummary {
    fn from(comment: CommentData) -> Self {
        Self {
            author: comment.author,
            body: comment.body,
            score: comment.score,
        }
    }
}
