//! Parameter parsing at the tool boundary
//!
//! Tool arguments arrive string-typed from the agent. Everything is turned into
//! a typed request here, with documented defaults substituted for values that
//! cannot be used as given.

use serde::{Deserialize, Deserializer};
use tracing::warn;

use crate::cli::{CommentsArgs, SearchArgs};
use crate::config::MAX_SEARCH_LIMIT;
use crate::error::{validate_query, AppError};
use crate::reddit::PostUrl;

/// Sentinel the calling convention uses for "tool default"
pub const LIMIT_SENTINEL: &str = "-1";
pub const DEFAULT_NUM_COMMENTS: u32 = 10;
pub const MAX_NUM_COMMENTS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sort {
    #[default]
    Relevance,
    Hot,
    Top,
    New,
    Comments,
}

impl Sort {
    pub const ALL: [Sort; 5] = [Sort::Relevance, Sort::Hot, Sort::Top, Sort::New, Sort::Comments];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sort::Relevance => "relevance",
            Sort::Hot => "hot",
            Sort::Top => "top",
            Sort::New => "new",
            Sort::Comments => "comments",
        }
    }

    /// Unknown values fall back to `relevance`
    pub fn parse_lenient(raw: &str) -> Self {
        let wanted = raw.trim().to_ascii_lowercase();
        if wanted.is_empty() {
            return Sort::default();
        }
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == wanted)
            .unwrap_or_else(|| {
                warn!("Unknown sort '{}', using '{}'", raw, Sort::default().as_str());
                Sort::default()
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeWindow {
    Hour,
    Day,
    Week,
    Month,
    Year,
    #[default]
    All,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 6] = [
        TimeWindow::Hour,
        TimeWindow::Day,
        TimeWindow::Week,
        TimeWindow::Month,
        TimeWindow::Year,
        TimeWindow::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Hour => "hour",
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
            TimeWindow::Month => "month",
            TimeWindow::Year => "year",
            TimeWindow::All => "all",
        }
    }

    /// Unknown values fall back to `all`
    pub fn parse_lenient(raw: &str) -> Self {
        let wanted = raw.trim().to_ascii_lowercase();
        if wanted.is_empty() {
            return TimeWindow::default();
        }
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .unwrap_or_else(|| {
                warn!("Unknown time window '{}', using '{}'", raw, TimeWindow::default().as_str());
                TimeWindow::default()
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub sort: Sort,
    pub time_window: TimeWindow,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentRequest {
    pub post_url: PostUrl,
    pub num_comments: u32,
}

impl SearchRequest {
    pub fn from_args(args: &SearchArgs, default_limit: u32) -> Result<Self, AppError> {
        validate_query(&args.query)?;

        Ok(Self {
            query: args.query.trim().to_string(),
            sort: Sort::parse_lenient(&args.sort),
            time_window: TimeWindow::parse_lenient(&args.time_window),
            limit: parse_limit(&args.limit, default_limit),
        })
    }
}

impl CommentRequest {
    pub fn from_args(args: &CommentsArgs) -> Result<Self, AppError> {
        Ok(Self {
            post_url: PostUrl::parse(&args.post_url)?,
            num_comments: parse_num_comments(&args.num_comments),
        })
    }
}

/// Integer parse that tolerates surrounding whitespace and a `.0` suffix
fn parse_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    trimmed.parse::<i64>().ok().or_else(|| {
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64)
    })
}

/// Resolve the search limit: sentinel/empty/garbage → default, otherwise clamp into [1, 150]
pub fn parse_limit(raw: &str, default_limit: u32) -> u32 {
    let default_limit = default_limit.clamp(1, MAX_SEARCH_LIMIT);
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == LIMIT_SENTINEL {
        return default_limit;
    }
    match parse_integer(trimmed) {
        Some(n) => n.clamp(1, MAX_SEARCH_LIMIT as i64) as u32,
        None => {
            warn!("Could not parse limit '{}', using default {}", raw, default_limit);
            default_limit
        }
    }
}

/// Resolve the comment count: empty/garbage/non-positive → 10, otherwise capped at 100
pub fn parse_num_comments(raw: &str) -> u32 {
    match parse_integer(raw) {
        Some(n) if n > 0 => n.min(MAX_NUM_COMMENTS as i64) as u32,
        Some(_) => {
            warn!("num_comments '{}' is not positive, using default {}", raw, DEFAULT_NUM_COMMENTS);
            DEFAULT_NUM_COMMENTS
        }
        None => {
            if !raw.trim().is_empty() {
                warn!("Could not parse num_comments '{}', using default {}", raw, DEFAULT_NUM_COMMENTS);
            }
            DEFAULT_NUM_COMMENTS
        }
    }
}

/// Accept a JSON string, number or null where the calling convention expects a string
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Str(s)) => s,
        Some(Raw::Int(i)) => i.to_string(),
        Some(Raw::Float(f)) => f.to_string(),
        Some(Raw::Bool(b)) => b.to_string(),
        None => String::new(),
    })
}
