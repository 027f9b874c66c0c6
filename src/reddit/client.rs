//! Reddit JSON API client for search and comment operations

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::models::{CommentData, CommentSummary, CommentsResponse, LinkData, Listing, PostSummary};
use crate::config::Settings;
use crate::error::AppError;
use crate::tools::params::{CommentRequest, SearchRequest};

/// Reddit API client
///
/// Immutable after construction; clone it freely to share between calls.
#[derive(Debug, Clone)]
pub struct RedditClient {
    client: Client,
    base_url: String,
    default_limit: u32,
}

impl RedditClient {
    pub fn new(settings: &Settings) -> Result<Self, AppError> {
        let client = crate::http::build_client(settings.timeout(), &settings.user_agent)?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            default_limit: settings.max_results,
        })
    }

    /// Posts returned by search when the caller leaves the limit unset
    pub fn default_limit(&self) -> u32 {
        self.default_limit
    }

    /// Search posts using /search.json
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<PostSummary>, AppError> {
        let url = format!("{}/search.json", self.base_url);
        let limit = request.limit.to_string();
        let params = [
            ("q", request.query.as_str()),
            ("sort", request.sort.as_str()),
            ("t", request.time_window.as_str()),
            ("limit", limit.as_str()),
            ("restrict_sr", "false"),
            ("type", "link"),
            ("raw_json", "1"),
        ];

        debug!("Searching Reddit: {} {:?}", url, params);

        let listing: Listing<LinkData> = self.get_json(&url, &params, "search results").await?;

        let posts: Vec<PostSummary> = listing
            .data
            .children
            .into_iter()
            .filter(|child| child.kind == "t3")
            .map(|child| PostSummary::from(child.data))
            .take(request.limit as usize)
            .collect();

        Ok(posts)
    }

    /// Get top-level comments using /comments/{id}.json
    pub async fn top_comments(&self, request: &CommentRequest) -> Result<Vec<CommentSummary>, AppError> {
        let url = request.post_url.json_endpoint(&self.base_url);
        let limit = request.num_comments.to_string();
        let params = [("limit", limit.as_str()), ("depth", "1"), ("raw_json", "1")];

        debug!("Fetching comments: {} {:?}", url, params);

        let resource = format!("post {}", request.post_url.id);
        let listings: CommentsResponse = self.get_json(&url, &params, &resource).await?;

        let mut listings = listings.into_iter();
        let post_listing = listings
            .next()
            .ok_or_else(|| AppError::upstream(format!("empty response for {}", resource)))?;

        if post_listing.data.children.is_empty() {
            return Err(AppError::NotFound(format!("{} does not exist", resource)));
        }

        let Some(comment_listing) = listings.next() else {
            return Ok(Vec::new());
        };

        let mut comments = Vec::new();
        for child in comment_listing.data.children {
            if child.kind != "t1" {
                continue;
            }
            match serde_json::from_value::<CommentData>(child.data) {
                Ok(data) => comments.push(CommentSummary::from(data)),
                Err(e) => warn!("Skipping malformed comment in {}: {}", resource, e),
            }
            if comments.len() >= request.num_comments as usize {
                break;
            }
        }

        Ok(comments)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
        resource: &str,
    ) -> Result<T, AppError> {
        let response = self.client.get(url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Reddit returned {} for {}", status, resource);
            return Err(AppError::from_status(status, resource));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            debug!("Undecodable body for {}: {}", resource, body.chars().take(200).collect::<String>());
            AppError::upstream(format!("malformed response for {}: {}", resource, e))
        })
    }
}
